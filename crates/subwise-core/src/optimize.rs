//! Benefit optimizer
//!
//! Single pass over a user's subscriptions, usage logs and payment logs:
//! 1. Aggregate usage by (category, metric)
//! 2. Infer a persona from the aggregates (first matching rule wins)
//! 3. Score each subscription's cost efficiency
//! 4. Emit recommendations: low-efficiency cancels first, then card switches

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::{debug, info};

use crate::benefits::BenefitRules;
use crate::models::{
    Category, DiscountEstimate, MetricType, OptimizationResult, PaymentLog, Persona,
    Recommendation, RecommendationKind, ServiceCategoryMap, SubscriptionItem, UsageLog,
};

/// What "full usage" means for a category
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ValueTarget {
    pub metric: MetricType,
    pub threshold: f64,
}

/// Per-category value targets used for efficiency scoring
#[derive(Debug, Clone, Default)]
pub struct CategoryValueModel {
    targets: HashMap<Category, ValueTarget>,
}

impl CategoryValueModel {
    pub fn new(targets: HashMap<Category, ValueTarget>) -> Self {
        Self { targets }
    }

    pub fn target(&self, category: Category) -> Option<&ValueTarget> {
        self.targets.get(&category)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Persona rule thresholds, checked in declaration order
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonaThresholds {
    /// OTT minutes for "content enthusiast"
    pub ott_minutes: f64,
    /// Delivery orders for "delivery heavy user"
    pub delivery_count: f64,
    /// Discount amount received for "savings-oriented consumer"
    pub discount_amount: f64,
    /// Total activity below which the user is a "light user"
    pub light_activity: f64,
}

impl Default for PersonaThresholds {
    fn default() -> Self {
        Self {
            ott_minutes: 1200.0,
            delivery_count: 8.0,
            discount_amount: 30000.0,
            light_activity: 200.0,
        }
    }
}

/// Optimizer tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Scores below this produce a cancel/downgrade recommendation
    pub low_efficiency_threshold: f64,
    /// Price at which the price factor halves
    pub price_scale: f64,
    /// Usage threshold for categories without a value target
    pub default_usage_threshold: f64,
    pub persona: PersonaThresholds,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            low_efficiency_threshold: 25.0,
            price_scale: 10000.0,
            default_usage_threshold: 1.0,
            persona: PersonaThresholds::default(),
        }
    }
}

/// Usage totals keyed by (category, metric)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageStats {
    totals: HashMap<(Category, MetricType), f64>,
}

impl UsageStats {
    pub fn get(&self, category: Category, metric: MetricType) -> f64 {
        self.totals.get(&(category, metric)).copied().unwrap_or(0.0)
    }

    /// Sum over every category and metric
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }
}

pub struct BenefitOptimizer {
    rules: BenefitRules,
    value_model: CategoryValueModel,
    config: OptimizerConfig,
}

impl BenefitOptimizer {
    pub fn new(rules: BenefitRules, value_model: CategoryValueModel) -> Self {
        Self::with_config(rules, value_model, OptimizerConfig::default())
    }

    pub fn with_config(
        rules: BenefitRules,
        value_model: CategoryValueModel,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            rules,
            value_model,
            config,
        }
    }

    pub fn rules(&self) -> &BenefitRules {
        &self.rules
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(
        &self,
        cards: &[String],
        service_categories: &ServiceCategoryMap,
        subscriptions: &[SubscriptionItem],
        usage: &[UsageLog],
        payments: &[PaymentLog],
    ) -> OptimizationResult {
        let stats = aggregate_usage(usage, service_categories);
        let persona = self.infer_persona(&stats);

        // One entry per service; a repeated service keeps its last score
        let mut efficiency_scores = BTreeMap::new();
        for sub in subscriptions {
            let score = self.efficiency_score(sub, usage, service_categories);
            efficiency_scores.insert(sub.service.clone(), score);
        }

        let mut recommendations = Vec::new();

        // 1) Low efficiency -> cancel/downgrade, in subscription order, judged
        //    on the per-service score the summary also counts
        for sub in subscriptions {
            let score = efficiency_scores.get(&sub.service).copied().unwrap_or(0.0);
            let price = sub.price.unwrap_or(0);
            if score < self.config.low_efficiency_threshold && price > 0 {
                debug!(service = %sub.service, score, "low efficiency subscription");
                recommendations.push(Recommendation::cancel_or_downgrade(&sub.service, score));
            }
        }

        // 2) Best card per payment, in payment order
        for payment in payments {
            if let Some(best) = self.best_card(cards, payment) {
                if best.discount_amount > 0 {
                    debug!(
                        service = %payment.service,
                        card = %best.card,
                        discount = best.discount_amount,
                        "payment method switch"
                    );
                    recommendations.push(Recommendation::switch_payment_method(&best));
                }
            }
        }

        let low_count = efficiency_scores
            .values()
            .filter(|s| **s < self.config.low_efficiency_threshold)
            .count();
        let switch_count = recommendations
            .iter()
            .filter(|r| r.kind == RecommendationKind::SwitchPaymentMethod)
            .count();
        let summary = format!(
            "Persona: {}. {} inefficient subscriptions detected. {} payment card recommendations.",
            persona, low_count, switch_count
        );

        info!(
            persona = %persona,
            subscriptions = subscriptions.len(),
            recommendations = recommendations.len(),
            "optimization complete"
        );

        OptimizationResult {
            persona,
            efficiency_scores,
            recommendations,
            summary,
        }
    }

    /// First persona rule that matches
    pub fn infer_persona(&self, stats: &UsageStats) -> Persona {
        let t = &self.config.persona;
        let ott = stats.get(Category::Ott, MetricType::TimeMinutes);
        let delivery = stats.get(Category::Delivery, MetricType::Count);
        let discount = stats.get(Category::Discount, MetricType::Amount);

        let persona = if ott >= t.ott_minutes {
            Persona::ContentEnthusiast
        } else if delivery >= t.delivery_count {
            Persona::DeliveryHeavy
        } else if discount >= t.discount_amount {
            Persona::SavingsOriented
        } else if stats.total() < t.light_activity {
            Persona::Light
        } else {
            Persona::General
        };

        debug!(ott, delivery, discount, persona = %persona, "persona inferred");
        persona
    }

    /// Efficiency in [0, 100], truncated (not rounded) to two decimals
    pub fn efficiency_score(
        &self,
        sub: &SubscriptionItem,
        usage: &[UsageLog],
        service_categories: &ServiceCategoryMap,
    ) -> f64 {
        let category = service_categories
            .get(&sub.service)
            .copied()
            .unwrap_or(Category::Unknown);
        let target = self.value_model.target(category);
        let metric = target.map(|t| t.metric);
        let threshold = target
            .map(|t| t.threshold)
            .unwrap_or(self.config.default_usage_threshold);

        let usage_sum: f64 = usage
            .iter()
            .filter(|u| u.service == sub.service && metric.map_or(true, |m| u.metric_type == m))
            .map(|u| u.value)
            .sum();

        let usage_factor = (usage_sum / threshold).min(1.0);
        let price = sub.price.unwrap_or(0);
        let price_factor = if price > 0 {
            1.0 / (1.0 + price as f64 / self.config.price_scale)
        } else {
            1.0
        };

        truncate2(100.0 * usage_factor * price_factor)
    }

    /// Card with the largest discount; ties go to the earliest card
    fn best_card(&self, cards: &[String], payment: &PaymentLog) -> Option<DiscountEstimate> {
        let mut best: Option<DiscountEstimate> = None;
        for card in cards {
            let est = self
                .rules
                .estimate_discount(card, &payment.service, payment.amount);
            if best
                .as_ref()
                .map_or(true, |b| est.discount_amount > b.discount_amount)
            {
                best = Some(est);
            }
        }
        best
    }
}

impl Default for BenefitOptimizer {
    fn default() -> Self {
        let reference = crate::config::ReferenceData::builtin();
        Self::with_config(
            reference.benefit_rules(),
            reference.value_model(),
            reference.optimizer.clone(),
        )
    }
}

/// Sum usage by (category, metric); unmapped services count as UNKNOWN
pub fn aggregate_usage(usage: &[UsageLog], service_categories: &ServiceCategoryMap) -> UsageStats {
    let mut totals = HashMap::new();
    for u in usage {
        let category = service_categories
            .get(&u.service)
            .copied()
            .unwrap_or(Category::Unknown);
        *totals.entry((category, u.metric_type)).or_insert(0.0) += u.value;
    }
    UsageStats { totals }
}

fn truncate2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benefits::{CardRule, ServiceRule};

    fn test_value_model() -> CategoryValueModel {
        let mut targets = HashMap::new();
        for (cat, metric, threshold) in [
            (Category::Ott, MetricType::TimeMinutes, 600.0),
            (Category::Music, MetricType::TimeMinutes, 300.0),
            (Category::Delivery, MetricType::Count, 4.0),
            (Category::Shopping, MetricType::Count, 2.0),
            (Category::Coffee, MetricType::Count, 8.0),
        ] {
            targets.insert(cat, ValueTarget { metric, threshold });
        }
        CategoryValueModel::new(targets)
    }

    fn test_rules() -> BenefitRules {
        let rule = |service: &str, rate: f64, cap: u64| ServiceRule {
            service: service.to_string(),
            discount_rate: rate,
            monthly_cap: cap,
            condition: "min spend".to_string(),
        };
        BenefitRules::new(vec![
            CardRule {
                name: "KB_NORI2".to_string(),
                rules: vec![rule("NETFLIX", 0.2, 5000), rule("YOUTUBE_PREMIUM", 0.1, 3000)],
            },
            CardRule {
                name: "SAME_AS_NORI".to_string(),
                rules: vec![rule("NETFLIX", 0.2, 5000)],
            },
            CardRule {
                name: "BAEMIN_CARD".to_string(),
                rules: vec![rule("BAEMIN", 0.1, 0)],
            },
        ])
    }

    fn test_optimizer() -> BenefitOptimizer {
        BenefitOptimizer::new(test_rules(), test_value_model())
    }

    fn categories() -> ServiceCategoryMap {
        [
            ("NETFLIX", Category::Ott),
            ("YOUTUBE_PREMIUM", Category::Ott),
            ("SPOTIFY", Category::Music),
            ("BAEMIN", Category::Delivery),
            ("CASHBACK", Category::Discount),
        ]
        .into_iter()
        .map(|(s, c)| (s.to_string(), c))
        .collect()
    }

    fn cards(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_aggregate_usage() {
        let usage = vec![
            UsageLog::new("NETFLIX", MetricType::TimeMinutes, 100.0),
            UsageLog::new("YOUTUBE_PREMIUM", MetricType::TimeMinutes, 50.0),
            UsageLog::new("BAEMIN", MetricType::Count, 3.0),
            UsageLog::new("MYSTERY", MetricType::Count, 2.0),
        ];
        let stats = aggregate_usage(&usage, &categories());
        assert_eq!(stats.get(Category::Ott, MetricType::TimeMinutes), 150.0);
        assert_eq!(stats.get(Category::Delivery, MetricType::Count), 3.0);
        assert_eq!(stats.get(Category::Unknown, MetricType::Count), 2.0);
        assert_eq!(stats.get(Category::Music, MetricType::TimeMinutes), 0.0);
        assert_eq!(stats.total(), 155.0);
    }

    #[test]
    fn test_persona_rules() {
        let opt = test_optimizer();
        let cats = categories();
        let persona = |usage: Vec<UsageLog>| opt.infer_persona(&aggregate_usage(&usage, &cats));

        assert_eq!(
            persona(vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 1200.0)]),
            Persona::ContentEnthusiast
        );
        assert_eq!(
            persona(vec![UsageLog::new("BAEMIN", MetricType::Count, 8.0)]),
            Persona::DeliveryHeavy
        );
        assert_eq!(
            persona(vec![UsageLog::new("CASHBACK", MetricType::Amount, 30000.0)]),
            Persona::SavingsOriented
        );
        assert_eq!(
            persona(vec![UsageLog::new("SPOTIFY", MetricType::TimeMinutes, 199.0)]),
            Persona::Light
        );
        assert_eq!(
            persona(vec![UsageLog::new("SPOTIFY", MetricType::TimeMinutes, 200.0)]),
            Persona::General
        );
        assert_eq!(persona(vec![]), Persona::Light);
    }

    #[test]
    fn test_persona_first_rule_wins() {
        let opt = test_optimizer();
        let usage = vec![
            UsageLog::new("NETFLIX", MetricType::TimeMinutes, 1500.0),
            UsageLog::new("BAEMIN", MetricType::Count, 12.0),
            UsageLog::new("CASHBACK", MetricType::Amount, 50000.0),
        ];
        let stats = aggregate_usage(&usage, &categories());
        assert_eq!(opt.infer_persona(&stats), Persona::ContentEnthusiast);
    }

    #[test]
    fn test_persona_custom_thresholds() {
        let config = OptimizerConfig {
            persona: PersonaThresholds {
                ott_minutes: 100.0,
                ..PersonaThresholds::default()
            },
            ..OptimizerConfig::default()
        };
        let opt = BenefitOptimizer::with_config(test_rules(), test_value_model(), config);
        let usage = vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 150.0)];
        let stats = aggregate_usage(&usage, &categories());
        assert_eq!(opt.infer_persona(&stats), Persona::ContentEnthusiast);
    }

    #[test]
    fn test_efficiency_score_formula() {
        let opt = test_optimizer();
        let cats = categories();

        // Full usage, price 17000: 100 / 2.7 = 37.037... -> 37.03
        let usage = vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 600.0)];
        let score = opt.efficiency_score(&SubscriptionItem::new("NETFLIX", Some(17000)), &usage, &cats);
        assert_eq!(score, 37.03);

        // Half usage, price 10000: 100 * 0.5 * 0.5 = 25.0
        let usage = vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 300.0)];
        let score = opt.efficiency_score(&SubscriptionItem::new("NETFLIX", Some(10000)), &usage, &cats);
        assert_eq!(score, 25.0);
    }

    #[test]
    fn test_efficiency_score_truncates() {
        let opt = test_optimizer();
        // 100 * (200/300) = 66.666... -> 66.66, not 66.67
        let usage = vec![UsageLog::new("SPOTIFY", MetricType::TimeMinutes, 200.0)];
        let score = opt.efficiency_score(&SubscriptionItem::new("SPOTIFY", Some(0)), &usage, &categories());
        assert_eq!(score, 66.66);
    }

    #[test]
    fn test_efficiency_score_free_subscription() {
        let opt = test_optimizer();
        let cats = categories();
        let usage = vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 6000.0)];
        assert_eq!(
            opt.efficiency_score(&SubscriptionItem::new("NETFLIX", None), &usage, &cats),
            100.0
        );
        assert_eq!(
            opt.efficiency_score(&SubscriptionItem::new("NETFLIX", Some(0)), &usage, &cats),
            100.0
        );
    }

    #[test]
    fn test_efficiency_score_zero_usage() {
        let opt = test_optimizer();
        let score = opt.efficiency_score(&SubscriptionItem::new("NETFLIX", Some(13500)), &[], &categories());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_efficiency_score_ignores_other_metrics_and_services() {
        let opt = test_optimizer();
        let usage = vec![
            UsageLog::new("NETFLIX", MetricType::Count, 50.0),
            UsageLog::new("YOUTUBE_PREMIUM", MetricType::TimeMinutes, 600.0),
        ];
        let score = opt.efficiency_score(&SubscriptionItem::new("NETFLIX", None), &usage, &categories());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_efficiency_score_unmodeled_category() {
        let opt = test_optimizer();
        // No value target: every metric counts, threshold 1.0
        let usage = vec![UsageLog::new("GYM", MetricType::Count, 1.0)];
        let score = opt.efficiency_score(&SubscriptionItem::new("GYM", Some(10000)), &usage, &categories());
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_recommendation_ordering() {
        let opt = test_optimizer();
        let subs = vec![
            SubscriptionItem::new("NETFLIX", Some(17000)),
            SubscriptionItem::new("SPOTIFY", Some(10900)),
        ];
        let payments = vec![PaymentLog::new("NETFLIX", 17000)];
        let result = opt.optimize(&cards(&["KB_NORI2"]), &categories(), &subs, &[], &payments);

        let kinds: Vec<_> = result
            .recommendations
            .iter()
            .map(|r| (r.kind, r.service.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (RecommendationKind::CancelOrDowngrade, "NETFLIX"),
                (RecommendationKind::CancelOrDowngrade, "SPOTIFY"),
                (RecommendationKind::SwitchPaymentMethod, "NETFLIX"),
            ]
        );
        assert_eq!(result.recommendations[2].discount_amount, Some(3400));
        assert_eq!(
            result.summary,
            "Persona: light user. 2 inefficient subscriptions detected. 1 payment card recommendations."
        );
    }

    #[test]
    fn test_free_low_score_subscription_not_recommended() {
        let opt = test_optimizer();
        let subs = vec![SubscriptionItem::new("SPOTIFY", Some(0))];
        let result = opt.optimize(&[], &categories(), &subs, &[], &[]);
        assert!(result.recommendations.is_empty());
        // Still counted as inefficient in the summary
        assert!(result.summary.contains("1 inefficient"));
        assert_eq!(result.efficiency_scores.get("SPOTIFY"), Some(&0.0));
    }

    #[test]
    fn test_best_card_first_maximizer_wins() {
        let opt = test_optimizer();
        let payments = vec![PaymentLog::new("NETFLIX", 17000)];

        let result = opt.optimize(
            &cards(&["SAME_AS_NORI", "KB_NORI2"]),
            &categories(),
            &[],
            &[],
            &payments,
        );
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].card.as_deref(), Some("SAME_AS_NORI"));

        let result = opt.optimize(
            &cards(&["KB_NORI2", "SAME_AS_NORI"]),
            &categories(),
            &[],
            &[],
            &payments,
        );
        assert_eq!(result.recommendations[0].card.as_deref(), Some("KB_NORI2"));
    }

    #[test]
    fn test_best_card_picks_largest_discount() {
        let opt = test_optimizer();
        let payments = vec![
            PaymentLog::new("BAEMIN", 23500),
            PaymentLog::new("SPOTIFY", 10900),
        ];
        let result = opt.optimize(
            &cards(&["KB_NORI2", "BAEMIN_CARD"]),
            &categories(),
            &[],
            &[],
            &payments,
        );
        // SPOTIFY has no rule on either card
        assert_eq!(result.recommendations.len(), 1);
        let rec = &result.recommendations[0];
        assert_eq!(rec.card.as_deref(), Some("BAEMIN_CARD"));
        assert_eq!(rec.discount_amount, Some(2350));
        let details = rec.details.as_ref().unwrap();
        assert_eq!(details.rate, 0.1);
        assert_eq!(details.cap, 0);
    }

    #[test]
    fn test_no_cards_no_switch() {
        let opt = test_optimizer();
        let payments = vec![PaymentLog::new("NETFLIX", 17000)];
        let result = opt.optimize(&[], &categories(), &[], &[], &payments);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let opt = test_optimizer();
        let result = opt.optimize(&[], &ServiceCategoryMap::new(), &[], &[], &[]);
        assert_eq!(result.persona, Persona::Light);
        assert!(result.efficiency_scores.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(
            result.summary,
            "Persona: light user. 0 inefficient subscriptions detected. 0 payment card recommendations."
        );
    }

    #[test]
    fn test_well_used_subscription_kept() {
        let opt = test_optimizer();
        let subs = vec![SubscriptionItem::new("BAEMIN", Some(3990))];
        let usage = vec![UsageLog::new("BAEMIN", MetricType::Count, 6.0)];
        let result = opt.optimize(&[], &categories(), &subs, &usage, &[]);
        // 100 / (1 + 0.399) = 71.4796... -> 71.47
        assert_eq!(result.efficiency_scores.get("BAEMIN"), Some(&71.47));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_duplicate_service_entries() {
        let opt = test_optimizer();
        let usage = vec![UsageLog::new("NETFLIX", MetricType::TimeMinutes, 600.0)];

        // Last entry is cheap: the service scores 37.03 and nothing is flagged
        let subs = vec![
            SubscriptionItem::new("NETFLIX", Some(1_000_000)),
            SubscriptionItem::new("NETFLIX", Some(17000)),
        ];
        let result = opt.optimize(&[], &categories(), &subs, &usage, &[]);
        assert_eq!(result.efficiency_scores.len(), 1);
        assert_eq!(result.efficiency_scores.get("NETFLIX"), Some(&37.03));
        assert!(result.recommendations.is_empty());
        assert!(result.summary.contains("0 inefficient subscriptions"));

        // Last entry is expensive: 100 / 101 -> 0.99, and every paid entry is flagged
        let subs = vec![
            SubscriptionItem::new("NETFLIX", Some(17000)),
            SubscriptionItem::new("NETFLIX", Some(1_000_000)),
        ];
        let result = opt.optimize(&[], &categories(), &subs, &usage, &[]);
        assert_eq!(result.efficiency_scores.get("NETFLIX"), Some(&0.99));
        assert_eq!(result.recommendations.len(), 2);
        assert!(result
            .recommendations
            .iter()
            .all(|r| r.score == Some(0.99)));
        assert!(result.summary.contains("1 inefficient subscriptions"));
    }
}
