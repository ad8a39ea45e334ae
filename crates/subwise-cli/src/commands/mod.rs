//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_reference, read_json)
//! - `classify` - Single notification classification
//! - `optimize` - Optimization from input files and log-store rows
//! - `chat` - Question answering over documents and card benefits
//! - `catalog` - Reference data listing

pub mod catalog;
pub mod chat;
pub mod classify;
pub mod core;
pub mod optimize;

// Re-export command functions for main.rs
pub use catalog::*;
pub use chat::*;
pub use classify::*;
pub use core::*;
pub use optimize::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a won amount with thousands separators ("17,000원")
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('원');
    out
}
