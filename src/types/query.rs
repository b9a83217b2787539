//! Question request types

use serde::{Deserialize, Serialize};

/// Request to answer a question about the active document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The question to answer
    pub question: String,

    /// Explanation style
    #[serde(default)]
    pub style: AnswerStyle,

    /// Response length preference
    #[serde(default)]
    pub length: AnswerLength,
}

/// Explanation style requested by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStyle {
    /// Simple and intuitive explanations
    Simple,
    /// Balance of intuition and precision
    #[default]
    Balanced,
    /// Detailed and technical
    Technical,
}

impl AnswerStyle {
    /// Human-readable label used in the generation prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::Simple => "Simple and Intuitive",
            Self::Balanced => "Balanced",
            Self::Technical => "Detailed and Technical",
        }
    }
}

/// Response length preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerLength {
    /// One paragraph
    Short,
    /// Two to three paragraphs
    #[default]
    Medium,
    /// As thorough as the sources allow
    Comprehensive,
}

impl AnswerLength {
    /// Human-readable label used in the generation prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "Short (1 paragraph)",
            Self::Medium => "Medium (2-3 paragraphs)",
            Self::Comprehensive => "Comprehensive",
        }
    }

    /// Number of excerpt sections shown by the fallback formatter
    pub fn max_sections(&self) -> usize {
        match self {
            Self::Short => 1,
            Self::Medium => 2,
            Self::Comprehensive => 4,
        }
    }

    /// Total character budget for fallback excerpts
    pub fn max_chars(&self) -> usize {
        match self {
            Self::Short => 800,
            Self::Medium => 1500,
            Self::Comprehensive => 2500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: AnswerRequest =
            serde_json::from_str(r#"{"question": "What is multi-head attention?"}"#).unwrap();
        assert_eq!(req.style, AnswerStyle::Balanced);
        assert_eq!(req.length, AnswerLength::Medium);
    }

    #[test]
    fn test_length_budgets() {
        assert_eq!(AnswerLength::Short.max_sections(), 1);
        assert_eq!(AnswerLength::Short.max_chars(), 800);
        assert_eq!(AnswerLength::Comprehensive.max_sections(), 4);
        assert_eq!(AnswerLength::Comprehensive.max_chars(), 2500);
    }
}
