//! Card benefit catalog and discount estimation

use serde::Deserialize;

use crate::models::DiscountEstimate;

/// Discount a card gives on one service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceRule {
    pub service: String,
    /// Fraction of the amount refunded, in [0, 1]
    pub discount_rate: f64,
    /// Monthly discount ceiling; 0 means uncapped
    #[serde(default)]
    pub monthly_cap: u64,
    /// Eligibility condition shown to the user
    #[serde(default)]
    pub condition: String,
}

/// A card and its per-service discounts
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardRule {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<ServiceRule>,
}

/// Read-only card benefit catalog
#[derive(Debug, Clone)]
pub struct BenefitRules {
    cards: Vec<CardRule>,
}

impl BenefitRules {
    pub fn new(cards: Vec<CardRule>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[CardRule] {
        &self.cards
    }

    /// Discount for paying `amount` for `service` with `card`.
    ///
    /// Unknown cards and services the card has no rule for produce a
    /// zero-value estimate.
    pub fn estimate_discount(&self, card: &str, service: &str, amount: u64) -> DiscountEstimate {
        let Some(rule) = self
            .cards
            .iter()
            .find(|c| c.name == card)
            .and_then(|c| c.rules.iter().find(|r| r.service == service))
        else {
            return DiscountEstimate::none(card, service);
        };

        let mut discount = (amount as f64 * rule.discount_rate).floor() as u64;
        if rule.monthly_cap > 0 {
            discount = discount.min(rule.monthly_cap);
        }

        DiscountEstimate {
            card: card.to_string(),
            service: service.to_string(),
            discount_amount: discount,
            condition: rule.condition.clone(),
            rate: rule.discount_rate,
            cap: rule.monthly_cap,
        }
    }
}

impl Default for BenefitRules {
    fn default() -> Self {
        crate::config::ReferenceData::builtin().benefit_rules()
    }
}
