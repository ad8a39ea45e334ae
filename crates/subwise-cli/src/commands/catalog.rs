//! Catalog command implementation

use anyhow::Result;
use subwise_core::ReferenceData;

use super::{format_won, truncate};

pub fn cmd_catalog(reference: &ReferenceData) -> Result<()> {
    println!();
    println!("📚 Services ({})", reference.services.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for service in &reference.services {
        println!(
            "   {:18} │ {:9} │ {}",
            truncate(&service.id, 18),
            service.category.as_str(),
            service.aliases.join(", ")
        );
    }

    println!();
    println!("🎯 Value Targets");
    println!("   ─────────────────────────────────────────────────────────────");
    for model in &reference.value_models {
        println!(
            "   {:9} │ {:>8} {}",
            model.category.as_str(),
            model.threshold,
            model.metric
        );
    }

    println!();
    println!("💳 Card Rules");
    println!("   ─────────────────────────────────────────────────────────────");
    if reference.cards.is_empty() {
        println!("   (none)");
    }
    for card in &reference.cards {
        println!("   {}", card.name);
        for rule in &card.rules {
            let cap = if rule.monthly_cap > 0 {
                format!("cap {}", format_won(rule.monthly_cap))
            } else {
                "no cap".to_string()
            };
            let condition = if rule.condition.is_empty() {
                String::new()
            } else {
                format!(" │ {}", rule.condition)
            };
            println!(
                "      {:18} │ {:>4.0}% │ {}{}",
                truncate(&rule.service, 18),
                rule.discount_rate * 100.0,
                cap,
                condition
            );
        }
    }

    Ok(())
}
