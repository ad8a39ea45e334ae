//! Chat command implementation

use std::path::Path;

use anyhow::Result;
use subwise_core::{KeywordIndex, OptimizationFacade, ReferenceData};

use super::read_json;

pub fn cmd_chat(
    reference: &ReferenceData,
    question: &str,
    card: Option<&str>,
    service: Option<&str>,
    docs: Option<&Path>,
) -> Result<()> {
    let answer = chat_answer(reference, question, card, service, docs)?;
    println!("{}", answer);
    Ok(())
}

/// Build the facade (with a keyword index when documents are given) and answer
pub fn chat_answer(
    reference: &ReferenceData,
    question: &str,
    card: Option<&str>,
    service: Option<&str>,
    docs: Option<&Path>,
) -> Result<String> {
    let mut facade = OptimizationFacade::from_reference(reference);

    if let Some(path) = docs {
        let documents: Vec<String> = read_json(path)?;
        tracing::debug!(documents = documents.len(), "keyword index built");
        facade = facade.with_search(Box::new(KeywordIndex::new(documents)));
    }

    Ok(facade.chat(question, card, service))
}
