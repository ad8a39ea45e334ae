//! Entry points composing classification, optimization and chat lookups

use crate::classify::SubscriptionClassifier;
use crate::config::ReferenceData;
use crate::knowledge::{DiscountGraph, KeywordIndex, KnowledgeSearch};
use crate::models::{
    ClassificationResult, OptimizationInput, OptimizationResult, PaymentLog, ServiceCategoryMap,
    SubscriptionItem, UsageLog,
};
use crate::notification;
use crate::optimize::BenefitOptimizer;

/// Number of snippets pulled into a chat answer
pub const CHAT_SEARCH_RESULTS: usize = 2;

/// Snippets are cut to this many characters in chat answers
const SNIPPET_MAX_CHARS: usize = 200;

pub const NO_EVIDENCE_MESSAGE: &str =
    "No supporting evidence was found in the stored knowledge. More data is needed.";

pub struct OptimizationFacade {
    classifier: SubscriptionClassifier,
    optimizer: BenefitOptimizer,
    search: Box<dyn KnowledgeSearch>,
    graph: Box<dyn DiscountGraph>,
}

impl OptimizationFacade {
    pub fn new(classifier: SubscriptionClassifier, optimizer: BenefitOptimizer) -> Self {
        Self {
            classifier,
            optimizer,
            search: Box::new(KeywordIndex::default()),
            graph: Box::new(crate::knowledge::StaticDiscountGraph::default()),
        }
    }

    /// Wire every component from one set of reference data
    pub fn from_reference(reference: &ReferenceData) -> Self {
        let classifier = SubscriptionClassifier::new(reference.normalizer());
        let optimizer = BenefitOptimizer::with_config(
            reference.benefit_rules(),
            reference.value_model(),
            reference.optimizer.clone(),
        );
        Self::new(classifier, optimizer).with_graph(Box::new(reference.discount_graph()))
    }

    pub fn with_search(mut self, search: Box<dyn KnowledgeSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn with_graph(mut self, graph: Box<dyn DiscountGraph>) -> Self {
        self.graph = graph;
        self
    }

    pub fn classifier(&self) -> &SubscriptionClassifier {
        &self.classifier
    }

    pub fn optimizer(&self) -> &BenefitOptimizer {
        &self.optimizer
    }

    pub fn classify(
        &self,
        text: &str,
        amount: Option<u64>,
        timestamp: Option<&str>,
    ) -> ClassificationResult {
        self.classifier.classify(text, amount, timestamp)
    }

    /// Classify a captured notification; `None` unless it is a payment
    pub fn classify_notification(
        &self,
        title: &str,
        text: &str,
        amount: Option<u64>,
        timestamp: Option<&str>,
    ) -> Option<ClassificationResult> {
        notification::classify_notification(&self.classifier, title, text, amount, timestamp)
    }

    pub fn optimize(
        &self,
        cards: &[String],
        service_categories: &ServiceCategoryMap,
        subscriptions: &[SubscriptionItem],
        usage: &[UsageLog],
        payments: &[PaymentLog],
    ) -> OptimizationResult {
        self.optimizer
            .optimize(cards, service_categories, subscriptions, usage, payments)
    }

    pub fn optimize_input(&self, input: &OptimizationInput) -> OptimizationResult {
        self.optimize(
            &input.cards,
            &input.service_categories,
            &input.subscriptions,
            &input.usage,
            &input.payments,
        )
    }

    /// Compose an answer from knowledge snippets and card discount edges.
    ///
    /// The discount lookup only runs when both `card` and `service` are given.
    pub fn chat(&self, question: &str, card: Option<&str>, service: Option<&str>) -> String {
        let hits = self.search.search(question, CHAT_SEARCH_RESULTS);
        let discounts = match (card, service) {
            (Some(c), Some(s)) => self.graph.find_discount(c, s),
            _ => Vec::new(),
        };

        let mut out = format!("Question: {}\n", question);

        if !hits.is_empty() {
            out.push_str("\n[Terms/FAQ evidence]\n");
            for hit in &hits {
                let text: String = hit.text.chars().take(SNIPPET_MAX_CHARS).collect();
                out.push_str(&format!("- {}\n", text));
            }
        }

        if !discounts.is_empty() {
            out.push_str("\n[Card benefits]\n");
            for edge in &discounts {
                out.push_str(&format!(
                    "- Discount: {} / Condition: {}\n",
                    edge.amount, edge.condition
                ));
            }
        }

        if hits.is_empty() && discounts.is_empty() {
            out.push('\n');
            out.push_str(NO_EVIDENCE_MESSAGE);
        }

        out
    }
}

impl Default for OptimizationFacade {
    fn default() -> Self {
        Self::from_reference(&ReferenceData::builtin())
    }
}
