//! Classification command implementation

use anyhow::Result;
use subwise_core::{ClassificationResult, OptimizationFacade, ReferenceData};

use super::format_won;

/// Classify one notification.
///
/// With a title the text is treated as a captured notification and skipped
/// unless it looks like a payment.
pub fn cmd_classify(
    reference: &ReferenceData,
    text: &str,
    title: Option<&str>,
    amount: Option<u64>,
    timestamp: Option<&str>,
    json: bool,
) -> Result<()> {
    let facade = OptimizationFacade::from_reference(reference);

    let result = match title {
        Some(title) => match facade.classify_notification(title, text, amount, timestamp) {
            Some(result) => result,
            None => {
                if json {
                    println!("null");
                } else {
                    println!("⏭️  Not a payment notification, skipped");
                }
                return Ok(());
            }
        },
        None => facade.classify(text, amount, timestamp),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_classification(&result, amount);
    }

    Ok(())
}

fn print_classification(result: &ClassificationResult, amount: Option<u64>) {
    println!();
    println!("🔎 Classification");
    println!("   ─────────────────────────────────────────────");
    println!("   Normalized: {}", result.normalized_text);
    println!(
        "   Merchant:   {}",
        result.merchant.as_deref().unwrap_or("?")
    );

    match (&result.service, result.category) {
        (Some(service), Some(category)) => println!(
            "   Service:    {} ({}, confidence {:.2})",
            service, category, result.confidence
        ),
        (Some(service), None) => println!(
            "   Service:    {} (confidence {:.2})",
            service, result.confidence
        ),
        _ => println!("   Service:    ❓ no catalog match"),
    }

    match result.period_days {
        Some(days) => println!("   Period:     every {} days ({})", days, result.period_reason),
        None => println!("   Period:     unknown"),
    }

    if let Some(amount) = amount {
        println!("   Amount:     {}", format_won(amount));
    }
}
