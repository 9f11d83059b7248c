//! Prompt augmentation
//!
//! Turns ranked search results into a single prompt that presents each excerpt under a
//! numbered source tag and instructs the model to cite those tags. The output depends
//! only on its inputs, so identical searches produce identical prompts.


use std::fmt::Write as _;

use crate::knowledge::SearchResult;

/// Label used for excerpts whose metadata has no document name
pub const DEFAULT_DOCUMENT_NAME: &str = "Document";

/// Build a citation-oriented prompt from `query` and its search results.
///
/// Results are assumed to be ordered best-first and are numbered from 1 in that order.
/// Returns `None` when there are no results, in which case the caller should send the
/// query unchanged.
#[inline]
pub fn build_prompt(query: &str, results: &[SearchResult]) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    let last_tag = source_tag(results.len());

    let mut excerpts = String::new();
    let mut source_listing = String::from("\nAvailable sources for citation:");

    for (i, result) in results.iter().enumerate() {
        let tag = source_tag(i + 1);
        let label = source_label(result);

        let _ = write!(
            excerpts,
            "--- Begin Content from {tag} ({label}) ---\n{text}\n--- End Content from {tag} ({label}) ---\n\n",
            text = result.text,
        );
        let _ = write!(
            source_listing,
            "\n{tag}: refers to content from '{name}'{location}.",
            name = document_name(result),
            location = location(result),
        );
    }

    let mut prompt = String::new();
    prompt.push_str(
        "You are a helpful assistant. Please answer the user's question based on the provided document excerpts. \
         The document excerpts are clearly marked with source tags (e.g., 'Source Document 1', 'Source Document 2', etc.).\n",
    );
    prompt.push_str(&source_listing);
    prompt.push_str("\n\n");
    let _ = writeln!(
        prompt,
        "When you use information from these excerpts, you MUST cite the source using its tag, \
         for example: 'According to {last_tag}, ...' or 'As stated in {last_tag}, ...'."
    );
    prompt.push_str(
        "If the provided excerpts do not contain the answer, or if you are using your general knowledge, \
         explicitly state that the information is from your general knowledge and not from the provided documents.\n\n",
    );
    let _ = write!(
        prompt,
        "Here are the document excerpts:\n{excerpts}\nUser's question: {query}\nYour answer:"
    );

    Some(prompt)
}

fn source_tag(number: usize) -> String {
    format!("Source Document {}", number)
}

fn document_name(result: &SearchResult) -> &str {
    result.metadata.name().unwrap_or(DEFAULT_DOCUMENT_NAME)
}

/// `" (Page N)"` when a page is known, otherwise `" (Chunk N)"` when the chunk
/// position is known, otherwise empty
fn location(result: &SearchResult) -> String {
    if let Some(page) = result.metadata.page().filter(|page| !page.is_blank()) {
        format!(" (Page {})", page)
    } else if let Some(chunk_id) = result.metadata.chunk_id() {
        format!(" (Chunk {})", chunk_id)
    } else {
        String::new()
    }
}

fn source_label(result: &SearchResult) -> String {
    format!("{}{}", document_name(result), location(result))
}
