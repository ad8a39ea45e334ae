//! Subwise Core Library
//!
//! Shared functionality for the Subwise subscription optimizer:
//! - Payment text normalization and service matching
//! - Billing period inference from notification text
//! - Card benefit rules and discount estimation
//! - Usage efficiency scoring, persona inference and recommendations
//! - Log-store row conversion for optimizer input
//! - Pluggable knowledge search and discount graph lookups for chat answers
//! - Reference data with embedded defaults and file overrides

pub mod benefits;
pub mod classify;
pub mod config;
pub mod error;
pub mod facade;
pub mod knowledge;
pub mod logs;
pub mod models;
pub mod normalize;
pub mod notification;
pub mod optimize;
pub mod periodicity;

pub use benefits::{BenefitRules, CardRule, ServiceRule};
pub use classify::SubscriptionClassifier;
pub use config::{default_reference_path, ReferenceData, ValueModelEntry};
pub use error::{Error, Result};
pub use facade::OptimizationFacade;
pub use knowledge::{
    DiscountEdge, DiscountGraph, KeywordIndex, KnowledgeSearch, Snippet, StaticDiscountGraph,
};
pub use logs::{split_logs, subscriptions_from_payments, LogEntry, LogSplit, LogType};
pub use models::{
    Category, ClassificationResult, DiscountEstimate, MetricType, OptimizationInput,
    OptimizationResult, PaymentLog, PeriodReason, Persona, Recommendation, RecommendationKind,
    ServiceCategoryMap, SubscriptionItem, SwitchDetails, UsageLog,
};
pub use normalize::{MatchConfig, ServiceCatalog, ServiceEntry, TextNormalizer};
pub use optimize::{
    BenefitOptimizer, CategoryValueModel, OptimizerConfig, PersonaThresholds, UsageStats,
    ValueTarget,
};
pub use periodicity::{PeriodEstimate, PeriodicityInferer};
