//! Log-store rows -> optimizer input
//!
//! The external store keeps one row per captured event, keyed by date,
//! service and type. Usage rows carry minutes of use, payment rows carry the
//! charged amount.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MetricType, PaymentLog, SubscriptionItem, UsageLog};
use crate::normalize::TextNormalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Payment,
    Usage,
}

/// One row from the log store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    /// Display name as captured ("넷플릭스", "배달의민족")
    pub service_name: String,
    /// App package the event came from
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub time_minutes: u64,
    pub log_type: LogType,
}

/// Usage and payment logs built from store rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSplit {
    pub usage: Vec<UsageLog>,
    pub payments: Vec<PaymentLog>,
}

/// Convert store rows into usage and payment logs.
///
/// Display names are resolved to catalog identifiers where possible. Each
/// usage row counts as one session (`count` = 1) and also contributes its
/// minutes when non-zero. Rows dated before `since` are skipped.
pub fn split_logs(
    entries: &[LogEntry],
    since: Option<NaiveDate>,
    normalizer: &TextNormalizer,
) -> LogSplit {
    let mut split = LogSplit::default();

    for entry in entries {
        if since.is_some_and(|s| entry.date < s) {
            continue;
        }

        let service = resolve_service(&entry.service_name, normalizer);
        match entry.log_type {
            LogType::Usage => {
                split
                    .usage
                    .push(UsageLog::new(service.clone(), MetricType::Count, 1.0));
                if entry.time_minutes > 0 {
                    split.usage.push(UsageLog::new(
                        service,
                        MetricType::TimeMinutes,
                        entry.time_minutes as f64,
                    ));
                }
            }
            LogType::Payment => {
                if entry.cost > 0 {
                    split.payments.push(PaymentLog::new(service, entry.cost));
                }
            }
        }
    }

    debug!(
        rows = entries.len(),
        usage = split.usage.len(),
        payments = split.payments.len(),
        "log rows split"
    );
    split
}

fn resolve_service(name: &str, normalizer: &TextNormalizer) -> String {
    let (service, _) = normalizer.match_service(&normalizer.normalize(name));
    service.unwrap_or_else(|| name.trim().to_string())
}

/// One subscription per paid service, in first-payment order, priced at the
/// most recent payment
pub fn subscriptions_from_payments(payments: &[PaymentLog]) -> Vec<SubscriptionItem> {
    let mut subs: Vec<SubscriptionItem> = Vec::new();
    for payment in payments {
        match subs.iter_mut().find(|s| s.service == payment.service) {
            Some(existing) => existing.price = Some(payment.amount),
            None => subs.push(SubscriptionItem::new(&payment.service, Some(payment.amount))),
        }
    }
    subs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::normalize::{ServiceCatalog, ServiceEntry};

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(ServiceCatalog::new(vec![
            ServiceEntry::new("NETFLIX", Category::Ott, &["NETFLIX", "넷플릭스"]),
            ServiceEntry::new("BAEMIN", Category::Delivery, &["배달의민족", "배민"]),
        ]))
    }

    fn entry(date: &str, service: &str, cost: u64, minutes: u64, log_type: LogType) -> LogEntry {
        LogEntry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            service_name: service.to_string(),
            package_name: String::new(),
            cost,
            time_minutes: minutes,
            log_type,
        }
    }

    #[test]
    fn test_split_logs() {
        let entries = vec![
            entry("2024-12-01", "넷플릭스", 0, 95, LogType::Usage),
            entry("2024-12-02", "넷플릭스", 17000, 0, LogType::Payment),
            entry("2024-12-03", "배달의민족", 0, 0, LogType::Usage),
            entry("2024-12-04", "헬스장", 50000, 0, LogType::Payment),
        ];
        let split = split_logs(&entries, None, &normalizer());

        assert_eq!(
            split.usage,
            vec![
                UsageLog::new("NETFLIX", MetricType::Count, 1.0),
                UsageLog::new("NETFLIX", MetricType::TimeMinutes, 95.0),
                UsageLog::new("BAEMIN", MetricType::Count, 1.0),
            ]
        );
        assert_eq!(
            split.payments,
            vec![PaymentLog::new("NETFLIX", 17000), PaymentLog::new("헬스장", 50000)]
        );
    }

    #[test]
    fn test_split_logs_since() {
        let entries = vec![
            entry("2024-11-30", "넷플릭스", 17000, 0, LogType::Payment),
            entry("2024-12-01", "넷플릭스", 17000, 0, LogType::Payment),
        ];
        let since = NaiveDate::from_ymd_opt(2024, 12, 1);
        let split = split_logs(&entries, since, &normalizer());
        assert_eq!(split.payments.len(), 1);
    }

    #[test]
    fn test_zero_cost_payment_skipped() {
        let entries = vec![entry("2024-12-01", "넷플릭스", 0, 0, LogType::Payment)];
        assert!(split_logs(&entries, None, &normalizer()).payments.is_empty());
    }

    #[test]
    fn test_log_entry_wire_format() {
        let json = r#"{"date": "2024-12-14", "service_name": "넷플릭스", "cost": 17000, "log_type": "PAYMENT"}"#;
        let parsed: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.log_type, LogType::Payment);
        assert_eq!(parsed.time_minutes, 0);
        assert_eq!(parsed.cost, 17000);
    }

    #[test]
    fn test_subscriptions_from_payments() {
        let payments = vec![
            PaymentLog::new("NETFLIX", 13500),
            PaymentLog::new("BAEMIN", 3990),
            PaymentLog::new("NETFLIX", 17000),
        ];
        assert_eq!(
            subscriptions_from_payments(&payments),
            vec![
                SubscriptionItem::new("NETFLIX", Some(17000)),
                SubscriptionItem::new("BAEMIN", Some(3990)),
            ]
        );
    }
}
