//! Domain models for Subwise

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Service category used for value models and persona rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Category {
    Ott,
    Music,
    Delivery,
    Shopping,
    Coffee,
    /// Discount amounts the user received (read by the savings persona rule)
    Discount,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ott => "OTT",
            Self::Music => "MUSIC",
            Self::Delivery => "DELIVERY",
            Self::Shopping => "SHOPPING",
            Self::Coffee => "COFFEE",
            Self::Discount => "DISCOUNT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a category label; anything unrecognised is `Unknown`
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "OTT" => Self::Ott,
            "MUSIC" => Self::Music,
            "DELIVERY" => Self::Delivery,
            "SHOPPING" => Self::Shopping,
            "COFFEE" => Self::Coffee,
            "DISCOUNT" => Self::Discount,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::from_label(&s)
    }
}

impl From<Category> for &'static str {
    fn from(c: Category) -> Self {
        c.as_str()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service identifier -> category lookup handed to the optimizer
pub type ServiceCategoryMap = HashMap<String, Category>;

/// Kind of usage measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Minutes of use
    TimeMinutes,
    /// Number of sessions/orders
    Count,
    /// Currency amount (discounts received)
    Amount,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeMinutes => "time_minutes",
            Self::Count => "count",
            Self::Amount => "amount",
        }
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time_minutes" | "minutes" => Ok(Self::TimeMinutes),
            "count" => Ok(Self::Count),
            "amount" => Ok(Self::Amount),
            _ => Err(format!("Unknown metric type: {}", s)),
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which periodicity rule produced a billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodReason {
    KeywordMonthly,
    KeywordYearly,
    KeywordWeekly,
    AmountRangeTypicalMonthly,
    AmountRangeTypicalYearly,
    Unknown,
}

impl PeriodReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordMonthly => "keyword_monthly",
            Self::KeywordYearly => "keyword_yearly",
            Self::KeywordWeekly => "keyword_weekly",
            Self::AmountRangeTypicalMonthly => "amount_range_typical_monthly",
            Self::AmountRangeTypicalYearly => "amount_range_typical_yearly",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PeriodReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one payment/notification text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub normalized_text: String,
    pub merchant: Option<String>,
    pub service: Option<String>,
    /// Only set when `service` is set and present in the service catalog
    pub category: Option<Category>,
    pub confidence: f64,
    pub period_days: Option<u32>,
    pub period_reason: PeriodReason,
    /// Free-form extras (`amount`, `timestamp`)
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// A subscription the user currently pays for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub service: String,
    pub price: Option<u64>,
}

impl SubscriptionItem {
    pub fn new(service: impl Into<String>, price: Option<u64>) -> Self {
        Self {
            service: service.into(),
            price,
        }
    }
}

/// One usage measurement for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    pub service: String,
    pub metric_type: MetricType,
    pub value: f64,
}

impl UsageLog {
    pub fn new(service: impl Into<String>, metric_type: MetricType, value: f64) -> Self {
        Self {
            service: service.into(),
            metric_type,
            value,
        }
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(Error::InvalidData(format!(
                "usage value for {} must be a non-negative number, got {}",
                self.service, self.value
            )));
        }
        Ok(())
    }
}

/// One payment made for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLog {
    pub service: String,
    pub amount: u64,
}

impl PaymentLog {
    pub fn new(service: impl Into<String>, amount: u64) -> Self {
        Self {
            service: service.into(),
            amount,
        }
    }
}

/// Estimated discount for paying a service with a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountEstimate {
    pub card: String,
    pub service: String,
    pub discount_amount: u64,
    pub condition: String,
    pub rate: f64,
    pub cap: u64,
}

impl DiscountEstimate {
    /// Zero-value estimate for an unknown card or service rule
    pub fn none(card: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            card: card.into(),
            service: service.into(),
            discount_amount: 0,
            condition: String::new(),
            rate: 0.0,
            cap: 0,
        }
    }
}

/// Coarse user archetype derived from aggregated usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "content enthusiast")]
    ContentEnthusiast,
    #[serde(rename = "delivery heavy user")]
    DeliveryHeavy,
    #[serde(rename = "savings-oriented consumer")]
    SavingsOriented,
    #[serde(rename = "light user")]
    Light,
    #[serde(rename = "general user")]
    General,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentEnthusiast => "content enthusiast",
            Self::DeliveryHeavy => "delivery heavy user",
            Self::SavingsOriented => "savings-oriented consumer",
            Self::Light => "light user",
            Self::General => "general user",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of cost-saving recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    CancelOrDowngrade,
    SwitchPaymentMethod,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CancelOrDowngrade => "CANCEL_OR_DOWNGRADE",
            Self::SwitchPaymentMethod => "SWITCH_PAYMENT_METHOD",
        }
    }
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Card benefit detail attached to a payment-method switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchDetails {
    pub rate: f64,
    pub cap: u64,
    pub condition: String,
}

/// A single recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub service: String,
    pub reason: String,
    pub action: String,
    /// Efficiency score behind a cancel recommendation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Card to switch to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SwitchDetails>,
}

impl Recommendation {
    pub fn cancel_or_downgrade(service: impl Into<String>, score: f64) -> Self {
        Self {
            kind: RecommendationKind::CancelOrDowngrade,
            service: service.into(),
            reason: format!(
                "Efficiency score {:.2} (low). Price is high relative to usage.",
                score
            ),
            action: "Cancel or switch to a cheaper plan".to_string(),
            score: Some(score),
            card: None,
            discount_amount: None,
            details: None,
        }
    }

    pub fn switch_payment_method(estimate: &DiscountEstimate) -> Self {
        Self {
            kind: RecommendationKind::SwitchPaymentMethod,
            service: estimate.service.clone(),
            reason: format!(
                "Paying with {} gives an estimated discount of {}",
                estimate.card, estimate.discount_amount
            ),
            action: format!("Change the payment card to {}", estimate.card),
            score: None,
            card: Some(estimate.card.clone()),
            discount_amount: Some(estimate.discount_amount),
            details: Some(SwitchDetails {
                rate: estimate.rate,
                cap: estimate.cap,
                condition: estimate.condition.clone(),
            }),
        }
    }
}

/// Output of one optimization pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub persona: Persona,
    pub efficiency_scores: BTreeMap<String, f64>,
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
}

impl OptimizationResult {
    /// Recommendations of one kind, in output order
    pub fn recommendations_of(&self, kind: RecommendationKind) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter().filter(move |r| r.kind == kind)
    }
}

/// Everything the optimizer consumes, as one serializable bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizationInput {
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default)]
    pub service_categories: ServiceCategoryMap,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionItem>,
    #[serde(default)]
    pub usage: Vec<UsageLog>,
    #[serde(default)]
    pub payments: Vec<PaymentLog>,
}

impl OptimizationInput {
    /// Parse a JSON input bundle and run the boundary checks
    pub fn from_json_str(content: &str) -> Result<Self> {
        let input: OptimizationInput = serde_json::from_str(content)?;
        input.validate()?;
        Ok(input)
    }

    /// Boundary checks for caller-supplied records
    pub fn validate(&self) -> Result<()> {
        for log in &self.usage {
            log.validate()?;
        }
        if let Some(sub) = self.subscriptions.iter().find(|s| s.service.trim().is_empty()) {
            return Err(Error::InvalidData(format!(
                "subscription with empty service (price {:?})",
                sub.price
            )));
        }
        if self.payments.iter().any(|p| p.service.trim().is_empty()) {
            return Err(Error::InvalidData("payment with empty service".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("ott"), Category::Ott);
        assert_eq!(Category::from_label(" DELIVERY "), Category::Delivery);
        assert_eq!(Category::from_label("GAMES"), Category::Unknown);
        assert_eq!(Category::Coffee.to_string(), "COFFEE");
    }

    #[test]
    fn test_category_serde_maps_unknown_labels() {
        let cats: Vec<Category> = serde_json::from_str(r#"["MUSIC", "BOOKS"]"#).unwrap();
        assert_eq!(cats, vec![Category::Music, Category::Unknown]);
        assert_eq!(serde_json::to_string(&Category::Ott).unwrap(), "\"OTT\"");
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&RecommendationKind::SwitchPaymentMethod).unwrap(),
            "\"SWITCH_PAYMENT_METHOD\""
        );
        assert_eq!(
            serde_json::to_string(&Persona::SavingsOriented).unwrap(),
            "\"savings-oriented consumer\""
        );
        assert_eq!(
            serde_json::to_string(&PeriodReason::AmountRangeTypicalYearly).unwrap(),
            "\"amount_range_typical_yearly\""
        );
        assert_eq!("minutes".parse::<MetricType>().unwrap(), MetricType::TimeMinutes);
        assert!("liters".parse::<MetricType>().is_err());
    }

    #[test]
    fn test_usage_validate() {
        assert!(UsageLog::new("NETFLIX", MetricType::TimeMinutes, 30.0)
            .validate()
            .is_ok());
        assert!(UsageLog::new("NETFLIX", MetricType::TimeMinutes, -1.0)
            .validate()
            .is_err());
        assert!(UsageLog::new("NETFLIX", MetricType::Count, f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_negative_payment_rejected_at_parse() {
        let parsed: std::result::Result<PaymentLog, _> =
            serde_json::from_str(r#"{"service": "NETFLIX", "amount": -100}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_input_validate() {
        let mut input = OptimizationInput::default();
        assert!(input.validate().is_ok());

        input.subscriptions.push(SubscriptionItem::new(" ", Some(100)));
        assert!(matches!(input.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_input_from_json_str() {
        let input = OptimizationInput::from_json_str(
            r#"{"cards": ["KB_NORI2"], "subscriptions": [{"service": "NETFLIX", "price": 17000}]}"#,
        )
        .unwrap();
        assert_eq!(input.cards, vec!["KB_NORI2".to_string()]);
        assert!(input.usage.is_empty());

        assert!(matches!(
            OptimizationInput::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            OptimizationInput::from_json_str(
                r#"{"usage": [{"service": "NETFLIX", "metric_type": "count", "value": -1}]}"#
            ),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_switch_recommendation_carries_details() {
        let est = DiscountEstimate {
            card: "KB_NORI2".to_string(),
            service: "NETFLIX".to_string(),
            discount_amount: 3400,
            condition: "min spend".to_string(),
            rate: 0.2,
            cap: 5000,
        };
        let rec = Recommendation::switch_payment_method(&est);
        assert_eq!(rec.kind, RecommendationKind::SwitchPaymentMethod);
        assert_eq!(rec.card.as_deref(), Some("KB_NORI2"));
        assert_eq!(rec.discount_amount, Some(3400));
        assert_eq!(rec.details.unwrap().cap, 5000);
        assert!(rec.reason.contains("3400"));
    }
}
