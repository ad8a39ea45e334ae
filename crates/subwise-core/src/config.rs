//! Reference data: service catalog, card rules, value model and thresholds
//!
//! ## Configuration Resolution
//!
//! Reference data is loaded with a two-layer resolution:
//! 1. Check for an override (explicit path, or ~/.local/share/subwise/reference.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Loaded data is read-only for the lifetime of the process. Components take
//! the pieces they need by value at construction time.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::benefits::{BenefitRules, CardRule};
use crate::error::{Error, Result};
use crate::knowledge::{DiscountEdge, StaticDiscountGraph};
use crate::models::{Category, MetricType, ServiceCategoryMap};
use crate::normalize::{MatchConfig, ServiceCatalog, ServiceEntry, TextNormalizer};
use crate::optimize::{CategoryValueModel, OptimizerConfig, ValueTarget};

/// Embedded default reference data (compiled into binary)
const DEFAULT_REFERENCE: &str = include_str!("../../../config/reference.toml");

/// One row of the category value model
#[derive(Debug, Clone, Deserialize)]
pub struct ValueModelEntry {
    pub category: Category,
    pub metric: MetricType,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    #[serde(default)]
    pub value_models: Vec<ValueModelEntry>,
    #[serde(default)]
    pub cards: Vec<CardRule>,
    #[serde(default)]
    pub discount_edges: Vec<DiscountEdge>,
}

impl ReferenceData {
    /// Parse and validate TOML reference data
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let data: ReferenceData = toml::from_str(content)?;
        data.validate()?;
        Ok(data)
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_REFERENCE)
    }

    /// Embedded defaults, or empty tables if they somehow fail to parse
    pub fn builtin() -> Self {
        Self::embedded().unwrap_or_else(|e| {
            warn!("Embedded reference data is invalid: {}", e);
            Self::default()
        })
    }

    /// Load reference data (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Reference data file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_reference_path().filter(|p| p.exists()),
        };

        match path {
            Some(p) => {
                debug!(path = %p.display(), "loading reference data override");
                let content = fs::read_to_string(&p)?;
                Self::from_toml_str(&content)
            }
            None => Self::embedded(),
        }
    }

    /// Reject tables that would make matching or scoring meaningless
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if service.id.trim().is_empty() {
                return Err(Error::Config("service with empty id".to_string()));
            }
            if !seen.insert(service.id.as_str()) {
                return Err(Error::Config(format!("duplicate service id: {}", service.id)));
            }
            if service.aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(Error::Config(format!("service {} has no aliases", service.id)));
            }
            if service.category == Category::Unknown {
                warn!(service = %service.id, "service mapped to UNKNOWN category");
            }
        }

        for model in &self.value_models {
            if !is_positive(model.threshold) {
                return Err(Error::Config(format!(
                    "value model threshold for {} must be positive",
                    model.category
                )));
            }
        }

        for card in &self.cards {
            for rule in &card.rules {
                if !(0.0..=1.0).contains(&rule.discount_rate) {
                    return Err(Error::Config(format!(
                        "discount rate for {}/{} must be within [0, 1], got {}",
                        card.name, rule.service, rule.discount_rate
                    )));
                }
                if !seen.contains(rule.service.as_str()) {
                    warn!(card = %card.name, service = %rule.service, "card rule for uncatalogued service");
                }
            }
        }

        if !is_positive(self.optimizer.price_scale)
            || !is_positive(self.optimizer.default_usage_threshold)
        {
            return Err(Error::Config(
                "price_scale and default_usage_threshold must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn service_catalog(&self) -> ServiceCatalog {
        ServiceCatalog::new(self.services.clone())
    }

    pub fn normalizer(&self) -> TextNormalizer {
        TextNormalizer::with_config(self.service_catalog(), self.matching.clone())
    }

    pub fn service_categories(&self) -> ServiceCategoryMap {
        self.service_catalog().category_map()
    }

    pub fn benefit_rules(&self) -> BenefitRules {
        BenefitRules::new(self.cards.clone())
    }

    pub fn value_model(&self) -> CategoryValueModel {
        let targets: HashMap<Category, ValueTarget> = self
            .value_models
            .iter()
            .map(|m| {
                (
                    m.category,
                    ValueTarget {
                        metric: m.metric,
                        threshold: m.threshold,
                    },
                )
            })
            .collect();
        CategoryValueModel::new(targets)
    }

    pub fn discount_graph(&self) -> StaticDiscountGraph {
        StaticDiscountGraph::new(self.discount_edges.clone())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Default reference data override path
pub fn default_reference_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subwise").join("reference.toml"))
}
