//! Answer generation: prompt building, retry handling, and excerpt fallback

pub mod answer;
pub mod fallback;
pub mod prompt;

pub use answer::AnswerPipeline;
pub use fallback::{format_excerpt_answer, NO_RELEVANT_INFORMATION};
pub use prompt::PromptBuilder;
