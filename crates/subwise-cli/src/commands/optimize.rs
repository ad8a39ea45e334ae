//! Optimization command implementations
//!
//! - `cmd_optimize` - Optimize from a prepared input file
//! - `cmd_optimize_logs` - Optimize from exported log-store rows

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use subwise_core::{
    split_logs, subscriptions_from_payments, LogEntry, OptimizationFacade, OptimizationInput,
    OptimizationResult, RecommendationKind, ReferenceData,
};
use tracing::info;

use super::{format_won, read_json, truncate};

pub fn cmd_optimize(reference: &ReferenceData, input_path: &Path, json: bool) -> Result<()> {
    let input = load_optimization_input(reference, input_path)?;
    let facade = OptimizationFacade::from_reference(reference);
    let result = facade.optimize_input(&input);

    print_result(&result, json)
}

/// Read an input file and fill in the catalog's categories when none are given
pub fn load_optimization_input(
    reference: &ReferenceData,
    input_path: &Path,
) -> Result<OptimizationInput> {
    let content = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let mut input = OptimizationInput::from_json_str(&content)
        .with_context(|| format!("Invalid optimizer input in {}", input_path.display()))?;

    if input.service_categories.is_empty() {
        input.service_categories = reference.service_categories();
    }

    Ok(input)
}

pub fn cmd_optimize_logs(
    reference: &ReferenceData,
    input_path: &Path,
    cards: &[String],
    since: Option<&str>,
    json: bool,
) -> Result<()> {
    let input = load_logs_input(reference, input_path, cards, since)?;
    let facade = OptimizationFacade::from_reference(reference);
    let result = facade.optimize_input(&input);

    print_result(&result, json)
}

/// Turn log-store rows into optimizer input; one subscription per paid service
pub fn load_logs_input(
    reference: &ReferenceData,
    input_path: &Path,
    cards: &[String],
    since: Option<&str>,
) -> Result<OptimizationInput> {
    let since = since
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --since format (use YYYY-MM-DD)")?;

    let rows: Vec<LogEntry> = read_json(input_path)?;
    let split = split_logs(&rows, since, &reference.normalizer());
    let subscriptions = subscriptions_from_payments(&split.payments);

    info!(
        rows = rows.len(),
        subscriptions = subscriptions.len(),
        "log rows loaded"
    );

    let cards = cards
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    Ok(OptimizationInput {
        cards,
        service_categories: reference.service_categories(),
        subscriptions,
        usage: split.usage,
        payments: split.payments,
    })
}

fn print_result(result: &OptimizationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    println!("👤 Persona: {}", result.persona);

    if !result.efficiency_scores.is_empty() {
        println!();
        println!("📊 Efficiency Scores");
        println!("   ─────────────────────────────────────────────");
        for (service, score) in &result.efficiency_scores {
            println!("   {:24} │ {:>6.2}", truncate(service, 24), score);
        }
    }

    println!();
    if result.recommendations.is_empty() {
        println!("✅ No recommendations. Your subscriptions look efficient.");
    } else {
        println!("💡 Recommendations");
        println!("   ─────────────────────────────────────────────");
        for rec in &result.recommendations {
            let icon = match rec.kind {
                RecommendationKind::CancelOrDowngrade => "✂️ ",
                RecommendationKind::SwitchPaymentMethod => "💳",
            };
            println!("   {} {} - {}", icon, rec.service, rec.action);
            match rec.discount_amount {
                Some(discount) => println!(
                    "      {} (save ~{})",
                    rec.reason,
                    format_won(discount)
                ),
                None => println!("      {}", rec.reason),
            }
        }
    }

    println!();
    println!("{}", result.summary);

    Ok(())
}
