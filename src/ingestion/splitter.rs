//! Text chunking: overlapping word windows with a hard per-chunk size cap

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Chunk, Document};

/// Splits document text into overlapping word-count windows and enforces the
/// index metadata size limit
pub struct ChunkSplitter {
    /// Window size in words
    split_length: usize,
    /// Overlap between consecutive windows in words
    split_overlap: usize,
    /// Hard per-chunk character limit
    max_chars: usize,
}

impl ChunkSplitter {
    /// Create a new splitter
    pub fn new(split_length: usize, split_overlap: usize, max_chars: usize) -> Self {
        Self {
            split_length: split_length.max(1),
            split_overlap: split_overlap.min(split_length.saturating_sub(1)),
            max_chars: max_chars.max(1),
        }
    }

    /// Split document text into chunks respecting the character cap
    pub fn split(&self, doc: &Document, text: &str) -> Vec<Chunk> {
        let chunks = self
            .word_windows(text)
            .into_iter()
            .enumerate()
            .map(|(i, window)| {
                Chunk::new(
                    doc.id,
                    window,
                    doc.filename.clone(),
                    doc.file_type,
                    i as u32,
                )
            })
            .collect();

        self.enforce_max_chars(chunks)
    }

    /// Produce ordered overlapping windows of `split_length` words
    ///
    /// Word boundaries come from unicode segmentation; punctuation and
    /// whitespace between words stay attached to the window text.
    fn word_windows(&self, text: &str) -> Vec<String> {
        let segments: Vec<&str> = text.split_word_bounds().collect();
        let word_positions: Vec<usize> = segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.chars().any(|c| c.is_alphanumeric()))
            .map(|(i, _)| i)
            .collect();

        if word_positions.is_empty() {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        let step = (self.split_length - self.split_overlap).max(1);
        let mut windows = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.split_length).min(word_positions.len());
            let seg_start = word_positions[start];
            let seg_end = if end == word_positions.len() {
                segments.len()
            } else {
                word_positions[end]
            };

            let window = segments[seg_start..seg_end].concat().trim().to_string();
            if !window.is_empty() {
                windows.push(window);
            }

            if end == word_positions.len() {
                break;
            }
            start += step;
        }

        windows
    }

    /// Slice oversized chunks into consecutive pieces of at most `max_chars`
    /// characters, tagging each piece with its sub-chunk ordinal and dropping
    /// pieces that are empty after trimming
    pub fn enforce_max_chars(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let mut valid = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let char_count = chunk.content.chars().count();
            if char_count <= self.max_chars {
                valid.push(chunk);
                continue;
            }

            tracing::warn!("Chunk too large ({} chars), splitting", char_count);
            let chars: Vec<char> = chunk.content.chars().collect();
            for (ordinal, piece) in chars.chunks(self.max_chars).enumerate() {
                let content: String = piece.iter().collect();
                if content.trim().is_empty() {
                    continue;
                }
                let mut sub = Chunk::new(
                    chunk.document_id,
                    content,
                    chunk.filename.clone(),
                    chunk.file_type,
                    chunk.chunk_index,
                );
                sub.sub_chunk = Some(ordinal as u32);
                valid.push(sub);
            }
        }

        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;

    fn test_doc() -> Document {
        Document::new(
            "paper.pdf".to_string(),
            FileType::Pdf,
            "hash".to_string(),
            1024,
        )
    }

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_windows_overlap_and_cover() {
        let splitter = ChunkSplitter::new(4, 2, 10_000);
        let chunks = splitter.split(&test_doc(), &numbered_words(10));

        assert!(chunks.len() > 1);
        assert!(chunks[0].content.starts_with("w0"));
        assert!(chunks.last().unwrap().content.ends_with("w9"));

        // Consecutive windows share split_overlap words
        assert!(chunks[0].content.contains("w2") && chunks[0].content.contains("w3"));
        assert!(chunks[1].content.starts_with("w2"));
    }

    #[test]
    fn test_short_text_single_window() {
        let splitter = ChunkSplitter::new(300, 15, 10_000);
        let chunks = splitter.split(&test_doc(), "just a few words here");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "just a few words here");
        assert_eq!(chunks[0].sub_chunk, None);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let splitter = ChunkSplitter::new(300, 15, 10_000);
        assert!(splitter.split(&test_doc(), "   \n  ").is_empty());
    }

    #[test]
    fn test_all_chunks_within_max_chars() {
        let max_chars = 40;
        let splitter = ChunkSplitter::new(50, 5, max_chars);
        let chunks = splitter.split(&test_doc(), &numbered_words(400));

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= max_chars);
        }
    }

    #[test]
    fn test_oversized_chunk_splits_into_three() {
        let max_chars = 100;
        let splitter = ChunkSplitter::new(300, 15, max_chars);
        let doc = test_doc();

        let oversized = Chunk::new(
            doc.id,
            "a".repeat(2 * max_chars + 1),
            doc.filename.clone(),
            doc.file_type,
            0,
        );

        let pieces = splitter.enforce_max_chars(vec![oversized]);
        assert_eq!(pieces.len(), 3);
        for (i, piece) in pieces.iter().enumerate() {
            assert!(piece.content.chars().count() <= max_chars);
            assert!(!piece.content.trim().is_empty());
            assert_eq!(piece.sub_chunk, Some(i as u32));
        }
        assert_eq!(pieces[2].content.chars().count(), 1);
    }

    #[test]
    fn test_blank_sub_chunks_dropped() {
        let max_chars = 10;
        let splitter = ChunkSplitter::new(300, 15, max_chars);
        let doc = test_doc();

        // Middle slice is all spaces and must not survive
        let content = format!("{}{}{}", "x".repeat(10), " ".repeat(10), "y");
        let oversized = Chunk::new(doc.id, content, doc.filename.clone(), doc.file_type, 0);

        let pieces = splitter.enforce_max_chars(vec![oversized]);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].sub_chunk, Some(0));
        assert_eq!(pieces[1].sub_chunk, Some(2));
        assert_eq!(pieces[1].content, "y");
    }

    #[test]
    fn test_within_limit_chunk_untouched() {
        let splitter = ChunkSplitter::new(300, 15, 100);
        let doc = test_doc();
        let chunk = Chunk::new(
            doc.id,
            "short".to_string(),
            doc.filename.clone(),
            doc.file_type,
            0,
        );
        let id = chunk.id;

        let out = splitter.enforce_max_chars(vec![chunk]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, id);
        assert_eq!(out[0].sub_chunk, None);
    }
}
