//! Subwise CLI - Subscription classifier and cost optimizer
//!
//! Usage:
//!   subwise classify --text "넷플릭스 17,000원 승인"    Classify a notification
//!   subwise optimize --input input.json                 Recommend savings
//!   subwise optimize-logs --input rows.json --cards A   Recommend from log rows
//!   subwise chat --question "..." --card A --service B  Answer from stored knowledge

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let reference = commands::load_reference(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            text,
            title,
            amount,
            timestamp,
            json,
        } => commands::cmd_classify(
            &reference,
            &text,
            title.as_deref(),
            amount,
            timestamp.as_deref(),
            json,
        ),
        Commands::Optimize { input, json } => commands::cmd_optimize(&reference, &input, json),
        Commands::OptimizeLogs {
            input,
            cards,
            since,
            json,
        } => commands::cmd_optimize_logs(&reference, &input, &cards, since.as_deref(), json),
        Commands::Chat {
            question,
            card,
            service,
            docs,
        } => commands::cmd_chat(
            &reference,
            &question,
            card.as_deref(),
            service.as_deref(),
            docs.as_deref(),
        ),
        Commands::Catalog => commands::cmd_catalog(&reference),
    }
}
