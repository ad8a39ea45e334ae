//! Payment notification filtering
//!
//! The OS listener hands over a title and a body for every notification.
//! Only bodies that mention a payment or an approval are worth classifying.

use tracing::debug;

use crate::classify::SubscriptionClassifier;
use crate::models::ClassificationResult;

const PAYMENT_KEYWORDS: &[&str] = &["결제", "승인", "PAYMENT", "APPROVED"];

/// Whether a notification body looks like a payment confirmation
pub fn is_payment_notification(text: &str) -> bool {
    let upper = text.to_uppercase();
    PAYMENT_KEYWORDS.iter().any(|k| upper.contains(k))
}

/// Classify a captured notification, skipping anything that is not a payment
pub fn classify_notification(
    classifier: &SubscriptionClassifier,
    title: &str,
    text: &str,
    amount: Option<u64>,
    timestamp: Option<&str>,
) -> Option<ClassificationResult> {
    if !is_payment_notification(text) {
        debug!(title, "not a payment notification");
        return None;
    }

    let joined = format!("{} {}", title.trim(), text.trim());
    Some(classifier.classify(joined.trim(), amount, timestamp))
}
