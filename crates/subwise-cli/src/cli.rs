//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subwise - Classify subscription payments and find savings
#[derive(Parser)]
#[command(name = "subwise")]
#[command(about = "Subscription classifier and cost optimizer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Reference data file (service catalog, card rules, thresholds)
    ///
    /// Defaults to ~/.local/share/subwise/reference.toml when present,
    /// otherwise the built-in tables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one payment notification
    Classify {
        /// Notification body
        #[arg(short, long)]
        text: String,

        /// Notification title (enables the payment-notification filter)
        #[arg(long)]
        title: Option<String>,

        /// Charged amount
        #[arg(short, long)]
        amount: Option<u64>,

        /// Event timestamp, passed through as metadata
        #[arg(long)]
        timestamp: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Optimize subscriptions from a JSON input file
    Optimize {
        /// JSON file with cards, subscriptions, usage and payments
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Optimize from exported log-store rows
    OptimizeLogs {
        /// JSON array of log rows
        #[arg(short, long)]
        input: PathBuf,

        /// Cards the user holds (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        cards: Vec<String>,

        /// Ignore rows before this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from stored documents and card benefits
    Chat {
        /// The question
        #[arg(short, long)]
        question: String,

        /// Card to look up discounts for
        #[arg(long)]
        card: Option<String>,

        /// Service to look up discounts for
        #[arg(long)]
        service: Option<String>,

        /// JSON array of document strings to search
        #[arg(long)]
        docs: Option<PathBuf>,
    },

    /// Show services, categories and card rules
    Catalog,
}
