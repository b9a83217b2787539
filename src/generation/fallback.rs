//! Deterministic excerpt fallback when generation is unavailable

use regex::Regex;
use std::sync::OnceLock;

use crate::providers::VectorSearchResult;
use crate::types::AnswerLength;

/// Fixed response when retrieval finds nothing
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found. The uploaded document \
does not appear to contain information about your question. Try rephrasing the question or \
uploading a document that covers this topic.";

fn excess_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

fn excess_spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").expect("valid regex"))
}

fn hyphen_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\s*\n\s*").expect("valid regex"))
}

/// Clean retrieved text for display: collapse whitespace and rejoin words
/// hyphenated across line breaks
pub fn clean_excerpt_text(text: &str) -> String {
    let text = excess_newlines().replace_all(text, "\n\n");
    let text = excess_spaces().replace_all(&text, " ");
    let text = hyphen_breaks().replace_all(&text, "");
    text.trim().to_string()
}

/// Format a curated excerpt answer from retrieved chunks
///
/// Used when generation fails after retries. Sections are ordered by
/// relevance; how many appear and the total character budget follow the
/// requested length preference.
pub fn format_excerpt_answer(
    results: &[VectorSearchResult],
    question: &str,
    length: AnswerLength,
) -> String {
    if results.is_empty() {
        return NO_RELEVANT_INFORMATION.to_string();
    }

    let mut sorted: Vec<&VectorSearchResult> = results.iter().collect();
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let max_sections = length.max_sections();
    let max_chars = length.max_chars();

    let mut parts = Vec::new();
    parts.push(format!("## Research findings: {}\n", question));

    let mut total_chars = 0usize;
    for (i, result) in sorted.iter().take(max_sections).enumerate() {
        if total_chars >= max_chars {
            break;
        }

        let relevance = (result.score.max(0.0) * 100.0).round() as u32;
        parts.push(format!("### Section {} (relevance: {}%)\n", i + 1, relevance));

        let mut content = clean_excerpt_text(&result.chunk.content);
        let section_budget = max_chars - total_chars;
        if content.chars().count() > section_budget {
            content = content.chars().take(section_budget).collect::<String>() + "...";
        }

        total_chars += content.chars().count();
        parts.push(format!("{}\n", content));
    }

    parts.push("---".to_string());
    parts.push(format!(
        "Retrieved {} relevant sections from your document.",
        sorted.len()
    ));
    if let Some(top) = sorted.first() {
        if !top.chunk.filename.is_empty() {
            parts.push(format!("Source: {}", top.chunk.filename));
        }
    }
    parts.push(
        "Note: this response shows direct excerpts from the document. Generated summaries are \
         temporarily unavailable."
            .to_string(),
    );

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, FileType};
    use uuid::Uuid;

    fn result(content: &str, score: f32) -> VectorSearchResult {
        VectorSearchResult {
            chunk: Chunk::new(
                Uuid::new_v4(),
                content.to_string(),
                "attention.pdf".to_string(),
                FileType::Pdf,
                0,
            ),
            score,
        }
    }

    #[test]
    fn test_clean_excerpt_text() {
        let raw = "multi-\nhead attention  uses\n\n\n\nparallel heads";
        let cleaned = clean_excerpt_text(raw);
        assert_eq!(cleaned, "multihead attention uses\n\nparallel heads");
    }

    #[test]
    fn test_empty_results_fixed_message() {
        let answer = format_excerpt_answer(&[], "what is attention?", AnswerLength::Medium);
        assert_eq!(answer, NO_RELEVANT_INFORMATION);
    }

    #[test]
    fn test_sections_ordered_by_relevance() {
        let results = vec![
            result("weak match content", 0.2),
            result("strong match content", 0.9),
        ];
        let answer = format_excerpt_answer(&results, "attention?", AnswerLength::Medium);

        let strong_pos = answer.find("strong match content").unwrap();
        let weak_pos = answer.find("weak match content").unwrap();
        assert!(strong_pos < weak_pos);
        assert!(answer.contains("relevance: 90%"));
        assert!(answer.contains("Source: attention.pdf"));
    }

    #[test]
    fn test_short_length_shows_one_section() {
        let results = vec![
            result("first section", 0.9),
            result("second section", 0.8),
            result("third section", 0.7),
        ];
        let answer = format_excerpt_answer(&results, "q", AnswerLength::Short);

        assert!(answer.contains("first section"));
        assert!(!answer.contains("second section"));
        assert!(answer.contains("Retrieved 3 relevant sections"));
    }

    #[test]
    fn test_char_budget_truncates() {
        let long = "x".repeat(5000);
        let results = vec![result(&long, 0.9)];
        let answer = format_excerpt_answer(&results, "q", AnswerLength::Short);

        // 800-char budget plus ellipsis, never the full 5000
        assert!(answer.matches('x').count() <= 800 + 3);
        assert!(answer.contains("..."));
    }
}
