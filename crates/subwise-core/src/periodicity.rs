//! Billing period inference from raw notification text
//!
//! Rules run in priority order and the first one that fires wins:
//! 1. Period keywords (monthly, yearly, weekly)
//! 2. Typical price ranges for the first amount in the text
//! 3. Unknown

use regex::Regex;
use tracing::debug;

use crate::models::PeriodReason;

const MONTHLY_KEYWORDS: &[&str] = &["매달", "매월", "월간", "1개월", "MONTHLY", "PER MONTH"];
const YEARLY_KEYWORDS: &[&str] = &["매년", "연간", "1년", "YEARLY", "ANNUAL"];
const WEEKLY_KEYWORDS: &[&str] = &["주간", "매주", "WEEKLY", "PER WEEK"];

/// Amounts that usually mean a monthly plan
const TYPICAL_MONTHLY_RANGE: std::ops::RangeInclusive<u64> = 9_000..=25_000;
/// Amounts that usually mean a yearly plan
const TYPICAL_YEARLY_RANGE: std::ops::RangeInclusive<u64> = 80_000..=200_000;

/// Inferred billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodEstimate {
    pub days: Option<u32>,
    pub reason: PeriodReason,
}

impl PeriodEstimate {
    fn new(days: u32, reason: PeriodReason) -> Self {
        Self {
            days: Some(days),
            reason,
        }
    }

    fn unknown() -> Self {
        Self {
            days: None,
            reason: PeriodReason::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeriodicityInferer {
    amount_re: Regex,
}

impl PeriodicityInferer {
    pub fn new() -> Self {
        Self {
            amount_re: Regex::new(r"([0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)\s*(원|KRW)?")
                .expect("valid regex"),
        }
    }

    pub fn infer_period_days(&self, raw_text: &str) -> PeriodEstimate {
        let text = raw_text.to_uppercase();
        let has_any = |keys: &[&str]| keys.iter().any(|k| text.contains(&k.to_uppercase()));

        let estimate = if has_any(MONTHLY_KEYWORDS) {
            PeriodEstimate::new(30, PeriodReason::KeywordMonthly)
        } else if has_any(YEARLY_KEYWORDS) {
            PeriodEstimate::new(365, PeriodReason::KeywordYearly)
        } else if has_any(WEEKLY_KEYWORDS) {
            PeriodEstimate::new(7, PeriodReason::KeywordWeekly)
        } else {
            match self.extract_amount(&text) {
                Some(a) if TYPICAL_MONTHLY_RANGE.contains(&a) => {
                    PeriodEstimate::new(30, PeriodReason::AmountRangeTypicalMonthly)
                }
                Some(a) if TYPICAL_YEARLY_RANGE.contains(&a) => {
                    PeriodEstimate::new(365, PeriodReason::AmountRangeTypicalYearly)
                }
                _ => PeriodEstimate::unknown(),
            }
        };

        debug!(days = ?estimate.days, reason = %estimate.reason, "period inferred");
        estimate
    }

    /// First numeric token only; later amounts in the text are ignored
    fn extract_amount(&self, text: &str) -> Option<u64> {
        let caps = self.amount_re.captures(text)?;
        caps.get(1)?.as_str().replace(',', "").parse().ok()
    }
}

impl Default for PeriodicityInferer {
    fn default() -> Self {
        Self::new()
    }
}
