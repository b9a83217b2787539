//! Prompt templates for grounded answer generation

use crate::providers::VectorSearchResult;
use crate::types::{AnswerLength, AnswerStyle};

/// Number of retrieved chunks included in the generation context
pub const CONTEXT_CHUNKS: usize = 5;

/// Prompt builder for document-grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from the top retrieved chunks
    pub fn build_context(results: &[VectorSearchResult]) -> String {
        let mut context = String::new();

        for result in results.iter().take(CONTEXT_CHUNKS) {
            context.push_str("---\n");
            context.push_str(&result.chunk.content);
            context.push_str("\n---\n");
        }

        context
    }

    /// Build the full answer prompt with grounding rules and the requested
    /// style and length preferences
    pub fn build_answer_prompt(
        question: &str,
        results: &[VectorSearchResult],
        style: AnswerStyle,
        length: AnswerLength,
    ) -> String {
        format!(
            r#"You are an expert research assistant helping users understand academic papers. Provide clear, well-structured answers based ONLY on the provided context.

Context from the document:
{context}

Question: {question}

Style: {style} | Length: {length}

Response guidelines:
- Answer ONLY using information from the context above
- Quote or reference specific parts when relevant
- Use markdown formatting (headers, bullets, code blocks)
- Include mathematical formulas if present in context
- Do not use external knowledge, make assumptions beyond what is stated, or fabricate information

If the information is missing, state: "This specific information is not available in the provided document sections."

Your well-structured answer:"#,
            context = Self::build_context(results),
            question = question,
            style = style.label(),
            length = length.label(),
        )
    }
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
                "paper.pdf".to_string(),
                FileType::Pdf,
                0,
            ),
            score,
        }
    }

    #[test]
    fn test_context_limited_to_top_chunks() {
        let results: Vec<_> = (0..8).map(|i| result(&format!("chunk {}", i), 0.9)).collect();
        let context = PromptBuilder::build_context(&results);

        assert!(context.contains("chunk 0"));
        assert!(context.contains("chunk 4"));
        assert!(!context.contains("chunk 5"));
    }

    #[test]
    fn test_prompt_includes_preferences() {
        let results = vec![result("the encoder stacks six identical layers", 0.8)];
        let prompt = PromptBuilder::build_answer_prompt(
            "How many layers does the encoder have?",
            &results,
            AnswerStyle::Technical,
            AnswerLength::Short,
        );

        assert!(prompt.contains("How many layers does the encoder have?"));
        assert!(prompt.contains("the encoder stacks six identical layers"));
        assert!(prompt.contains("Detailed and Technical"));
        assert!(prompt.contains("Short (1 paragraph)"));
    }
}
