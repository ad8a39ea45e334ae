//! Shared command utilities
//!
//! This module contains:
//! - `load_reference` - Resolve reference data from --config or the default locations
//! - `read_json` - Read and parse a JSON input file

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use subwise_core::ReferenceData;

/// Load reference data, preferring an explicit --config path
pub fn load_reference(config: Option<&Path>) -> Result<ReferenceData> {
    ReferenceData::load(config).context("Failed to load reference data")
}

/// Read a JSON file into `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
