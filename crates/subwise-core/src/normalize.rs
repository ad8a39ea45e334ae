//! Text normalization and service matching
//!
//! Payment notifications arrive as free text ("[Web발신] KB국민카드 넷플릭스
//! 17,000원 승인"). This module turns them into a canonical uppercase form,
//! picks a candidate merchant token and matches the text against the service
//! catalog.

use serde::Deserialize;
use tracing::debug;

use crate::models::{Category, ServiceCategoryMap};

/// Tokens that carry no merchant information
const NOISE_TOKENS: &[&str] = &[
    "WEB발신",
    "국외발신",
    "국제발신",
    "알림",
    "승인",
    "결제",
    "일시불",
    "누적",
    "PAYMENT",
    "APPROVED",
    "POS",
];

/// Currency markers that may trail an amount token
const CURRENCY_SUFFIXES: &[&str] = &["원", "KRW"];

/// One known service and the brand tokens that identify it
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub id: String,
    pub category: Category,
    pub aliases: Vec<String>,
}

impl ServiceEntry {
    pub fn new(id: impl Into<String>, category: Category, aliases: &[&str]) -> Self {
        Self {
            id: id.into(),
            category,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Known-service vocabulary with each service's category
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<ServiceEntry>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    pub fn get(&self, id: &str) -> Option<&ServiceEntry> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Category of a known service, `None` for anything outside the catalog
    pub fn category_of(&self, id: &str) -> Option<Category> {
        self.get(id).map(|s| s.category)
    }

    /// Service identifier -> category map for the optimizer
    pub fn category_map(&self) -> ServiceCategoryMap {
        self.services
            .iter()
            .map(|s| (s.id.clone(), s.category))
            .collect()
    }
}

/// Confidence assigned to each kind of match
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Alias appears as a whole token (or token sequence)
    pub exact_confidence: f64,
    /// Alias appears only inside a larger token
    pub partial_confidence: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            exact_confidence: 0.9,
            partial_confidence: 0.6,
        }
    }
}

/// Normalizes notification text and matches it against a service catalog
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    catalog: ServiceCatalog,
    config: MatchConfig,
    /// Aliases run through `normalize`, per service in catalog order
    aliases: Vec<(String, Vec<String>)>,
}

impl TextNormalizer {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self::with_config(catalog, MatchConfig::default())
    }

    pub fn with_config(catalog: ServiceCatalog, config: MatchConfig) -> Self {
        let aliases = catalog
            .services()
            .iter()
            .map(|s| {
                let mut normalized: Vec<String> = s
                    .aliases
                    .iter()
                    .map(|a| normalize(a))
                    .filter(|a| !a.is_empty())
                    .collect();
                // Always recognise the identifier itself ("YOUTUBE_PREMIUM")
                let id = normalize(&s.id);
                if !id.is_empty() && !normalized.contains(&id) {
                    normalized.push(id);
                }
                (s.id.clone(), normalized)
            })
            .collect();

        Self {
            catalog,
            config,
            aliases,
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Canonical form of `text`
    pub fn normalize(&self, text: &str) -> String {
        normalize(text)
    }

    /// Candidate merchant token in already-normalized text
    pub fn extract_merchant(&self, normalized: &str) -> Option<String> {
        extract_merchant(normalized)
    }

    /// Match normalized text against the catalog.
    ///
    /// Whole-token matches win over substring matches across the entire
    /// catalog; within a tier the first service in catalog order wins.
    /// Substring matches of Latin aliases must not run into neighbouring
    /// Latin letters.
    pub fn match_service(&self, normalized: &str) -> (Option<String>, f64) {
        if normalized.is_empty() {
            return (None, 0.0);
        }

        let padded = format!(" {} ", normalized);
        for (id, aliases) in &self.aliases {
            if aliases.iter().any(|a| padded.contains(&format!(" {} ", a))) {
                debug!(service = %id, "exact service match");
                return (Some(id.clone()), self.config.exact_confidence);
            }
        }

        let compact = compact(normalized);
        for (id, aliases) in &self.aliases {
            if aliases.iter().any(|a| {
                contains_bounded(normalized, a) || contains_bounded(&compact, &compact_alias(a))
            }) {
                debug!(service = %id, "partial service match");
                return (Some(id.clone()), self.config.partial_confidence);
            }
        }

        (None, 0.0)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(crate::config::ReferenceData::builtin().service_catalog())
    }
}

/// Uppercase, replace punctuation with spaces, drop noise tokens and collapse
/// whitespace. Applying it twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let upper = text.to_uppercase();
    let cleaned: String = upper
        .chars()
        .map(|c| if is_kept_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| !NOISE_TOKENS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_kept_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ',' | '.' | '&' | '+' | '_')
}

/// First token that looks like a merchant name
pub fn extract_merchant(normalized: &str) -> Option<String> {
    normalized
        .split_whitespace()
        .find(|t| is_merchant_token(t))
        .map(|t| t.trim_matches(|c| c == ',' || c == '.').to_string())
}

fn is_merchant_token(token: &str) -> bool {
    let core = token.trim_matches(|c| c == ',' || c == '.');
    core.chars().count() >= 2
        && core.chars().any(char::is_alphabetic)
        && !is_amount_token(core)
        && !is_card_token(core)
        // "홍*동님" style masked customer names
        && !core.ends_with('님')
}

/// "17,000원", "9900", "12000KRW"
fn is_amount_token(token: &str) -> bool {
    let digits = CURRENCY_SUFFIXES
        .iter()
        .find_map(|s| token.strip_suffix(s))
        .unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == ',')
}

/// Card issuer tokens ("KB국민카드", "SHINHANCARD")
fn is_card_token(token: &str) -> bool {
    token.ends_with("카드") || token.contains("CARD")
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn compact_alias(alias: &str) -> String {
    compact(alias).replace('_', "")
}

/// Substring search where an alias edge made of an ASCII letter may not touch
/// another ASCII letter ("MELON" is not found in "WATERMELON")
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let starts_latin = needle.starts_with(|c: char| c.is_ascii_alphabetic());
    let ends_latin = needle.ends_with(|c: char| c.is_ascii_alphabetic());

    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        let touches = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphabetic());
        !(starts_latin && touches(before)) && !(ends_latin && touches(after))
    })
}
