//! Subscription classification for a single transaction text

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::models::ClassificationResult;
use crate::normalize::TextNormalizer;
use crate::periodicity::PeriodicityInferer;

/// Normalize -> match service -> look up category -> infer billing period
#[derive(Debug, Clone, Default)]
pub struct SubscriptionClassifier {
    normalizer: TextNormalizer,
    periodicity: PeriodicityInferer,
}

impl SubscriptionClassifier {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self {
            normalizer,
            periodicity: PeriodicityInferer::new(),
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Classify one transaction text. Never fails; anything that does not
    /// match degrades to `None` fields.
    pub fn classify(
        &self,
        text: &str,
        amount: Option<u64>,
        timestamp: Option<&str>,
    ) -> ClassificationResult {
        let normalized = self.normalizer.normalize(text);
        let merchant = self.normalizer.extract_merchant(&normalized);
        let (service, confidence) = self.normalizer.match_service(&normalized);
        let category = service
            .as_deref()
            .and_then(|s| self.normalizer.catalog().category_of(s));

        // Period keywords are matched against the raw text
        let period = self.periodicity.infer_period_days(text);

        let mut meta = BTreeMap::new();
        meta.insert("amount".to_string(), amount.map_or(Value::Null, Value::from));
        meta.insert(
            "timestamp".to_string(),
            timestamp.map_or(Value::Null, Value::from),
        );

        debug!(
            service = ?service,
            category = ?category,
            confidence,
            period = ?period.days,
            "transaction classified"
        );

        ClassificationResult {
            normalized_text: normalized,
            merchant,
            service,
            category,
            confidence,
            period_days: period.days,
            period_reason: period.reason,
            meta,
        }
    }
}
