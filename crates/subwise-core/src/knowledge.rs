//! Lookup capabilities used to enrich chat answers
//!
//! - `KnowledgeSearch`: ranked text snippets (terms of service, FAQs)
//! - `DiscountGraph`: direct (card, service) -> discount relations
//!
//! Both are traits so a real search backend or graph store can be swapped in
//! without touching classification or optimization.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub score: f64,
}

/// A (card, service) -> discount relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountEdge {
    pub card: String,
    pub service: String,
    /// Human-readable discount ("20%", "3,000원")
    pub amount: String,
    pub condition: String,
}

/// Ranked snippet search
pub trait KnowledgeSearch: Send + Sync {
    /// Up to `k` snippets, best first
    fn search(&self, query: &str, k: usize) -> Vec<Snippet>;
}

/// Card benefit relations
pub trait DiscountGraph: Send + Sync {
    fn find_discount(&self, card: &str, service: &str) -> Vec<DiscountEdge>;
}

/// In-memory edge list
#[derive(Debug, Clone, Default)]
pub struct StaticDiscountGraph {
    edges: Vec<DiscountEdge>,
}

impl StaticDiscountGraph {
    pub fn new(edges: Vec<DiscountEdge>) -> Self {
        Self { edges }
    }
}

impl DiscountGraph for StaticDiscountGraph {
    fn find_discount(&self, card: &str, service: &str) -> Vec<DiscountEdge> {
        self.edges
            .iter()
            .filter(|e| e.card == card && e.service == service)
            .cloned()
            .collect()
    }
}

/// Token-overlap search over a fixed set of documents
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    documents: Vec<(String, HashSet<String>)>,
}

impl KeywordIndex {
    pub fn new(documents: Vec<String>) -> Self {
        let documents = documents
            .into_iter()
            .map(|d| {
                let tokens = tokenize(&d);
                (d, tokens)
            })
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl KnowledgeSearch for KeywordIndex {
    fn search(&self, query: &str, k: usize) -> Vec<Snippet> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<Snippet> = self
            .documents
            .iter()
            .filter_map(|(text, tokens)| {
                let overlap = query_tokens.intersection(tokens).count();
                (overlap > 0).then(|| Snippet {
                    text: text.clone(),
                    score: overlap as f64 / query_tokens.len() as f64,
                })
            })
            .collect();

        // Stable sort keeps document order among equal scores
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        hits
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
