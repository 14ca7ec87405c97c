//! Document chunking.
//!
//! [`SlidingWindowChunker`] slides a fixed-size window over the document and
//! advances it so that neighbouring chunks share exactly `chunk_overlap`
//! bytes. When boundary preference is on, a window that would cut through
//! the middle of a paragraph or sentence is shortened to end right after the
//! nearest separator in its second half.

use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Separators tried in order when looking for a natural place to end a chunk.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyInput`] if the document has no text.
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

/// Splits text into overlapping windows of at most `chunk_size` bytes.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus a `chunk_index` field.
///
/// Window edges always fall on `char` boundaries, so for multi-byte text a
/// window may be a few bytes shorter and an overlap a few bytes longer than
/// configured.
///
/// # Example
///
/// ```rust,ignore
/// use faqbot_rag::SlidingWindowChunker;
///
/// let chunker = SlidingWindowChunker::new(1000, 200)?;
/// let chunks = chunker.chunk(&document)?;
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    prefer_boundaries: bool,
}

impl SlidingWindowChunker {
    /// Create a chunker with boundary preference enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap, prefer_boundaries: true })
    }

    /// Create a chunker from a validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Ok(Self::new(config.chunk_size, config.chunk_overlap)?
            .with_boundaries(config.prefer_boundaries))
    }

    /// Enable or disable shortening windows to end at paragraph or sentence breaks.
    pub fn with_boundaries(mut self, prefer_boundaries: bool) -> Self {
        self.prefer_boundaries = prefer_boundaries;
        self
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Compute `(start, end)` byte spans for `text`.
    fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let len = text.len();
        let mut spans = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = floor_char_boundary(text, start + self.chunk_size);
            if end <= start {
                // Window narrower than the character at `start`.
                end = ceil_char_boundary(text, start + 1);
            }

            if end >= len {
                spans.push((start, len));
                // Final partial window, advanced by the regular step.
                let tail = ceil_char_boundary(text, start + self.step());
                if tail < len {
                    spans.push((tail, len));
                }
                break;
            }

            if self.prefer_boundaries {
                if let Some(brk) = self.natural_break(text, start, end) {
                    end = brk;
                }
            }
            spans.push((start, end));

            let next = floor_char_boundary(text, end.saturating_sub(self.chunk_overlap));
            start = if next > start { next } else { end };
        }

        spans
    }

    /// Find the last separator in the second half of the window `[start, end)`
    /// and return the offset just past it.
    fn natural_break(&self, text: &str, start: usize, end: usize) -> Option<usize> {
        let lower = (start + self.chunk_overlap + 1).max(start + self.chunk_size / 2);
        let lower = ceil_char_boundary(text, lower);
        if lower >= end {
            return None;
        }

        let window = &text[lower..end];
        SEPARATORS
            .iter()
            .find_map(|sep| window.rfind(sep).map(|pos| lower + pos + sep.len()))
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        if document.text.trim().is_empty() {
            return Err(RagError::EmptyInput);
        }

        let text = &document.text;
        let chunks = self
            .spans(text)
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), index.to_string());
                Chunk {
                    id: format!("{}_{index}", document.id),
                    document_id: document.id.clone(),
                    index,
                    text: text[start..end].to_string(),
                    start,
                    end,
                    metadata,
                }
            })
            .collect();

        Ok(chunks)
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(chunks: &[Chunk]) -> Vec<(usize, usize)> {
        chunks.iter().map(|c| (c.start, c.end)).collect()
    }

    #[test]
    fn splits_2500_bytes_into_four_windows() {
        let doc = Document::new("faq", "a".repeat(2500));
        let chunks = SlidingWindowChunker::new(1000, 200).unwrap().chunk(&doc).unwrap();

        assert_eq!(offsets(&chunks), vec![(0, 1000), (800, 1800), (1600, 2500), (2400, 2500)]);
        assert_eq!(chunks[3].text.len(), 100);
        assert_eq!(chunks[0].id, "faq_0");
        assert_eq!(chunks[3].metadata.get("chunk_index").map(String::as_str), Some("3"));
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let doc = Document::new("d", "We are open 9-5 Mon-Fri.");
        let chunks = SlidingWindowChunker::new(1000, 200).unwrap().chunk(&doc).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, doc.text);
    }

    #[test]
    fn empty_and_blank_documents_are_rejected() {
        let chunker = SlidingWindowChunker::new(100, 10).unwrap();
        assert!(matches!(chunker.chunk(&Document::new("d", "")), Err(RagError::EmptyInput)));
        assert!(matches!(chunker.chunk(&Document::new("d", " \n\t ")), Err(RagError::EmptyInput)));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(SlidingWindowChunker::new(0, 0).is_err());
        assert!(SlidingWindowChunker::new(100, 100).is_err());
        assert!(SlidingWindowChunker::new(100, 150).is_err());
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let first = "x".repeat(70);
        let second = "y".repeat(70);
        let doc = Document::new("d", format!("{first}\n\n{second}"));
        let chunks = SlidingWindowChunker::new(100, 10).unwrap().chunk(&doc).unwrap();

        assert_eq!(chunks[0].text, format!("{first}\n\n"));
        assert_eq!(chunks[1].start, chunks[0].end - 10);
    }

    #[test]
    fn prefers_sentence_breaks_over_hard_cuts() {
        let text = format!("{}. {}", "a".repeat(60), "b".repeat(80));
        let doc = Document::new("d", text);
        let chunks = SlidingWindowChunker::new(100, 20).unwrap().chunk(&doc).unwrap();
        assert!(chunks[0].text.ends_with(". "));
    }

    #[test]
    fn boundaries_can_be_disabled() {
        let text = format!("{}. {}", "a".repeat(60), "b".repeat(80));
        let doc = Document::new("d", text);
        let chunks =
            SlidingWindowChunker::new(100, 20).unwrap().with_boundaries(false).chunk(&doc).unwrap();
        assert_eq!(offsets(&chunks)[0], (0, 100));
        assert_eq!(chunks[1].start, 80);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let doc = Document::new("d", "¿Cuál es el horario de atención? ".repeat(40));
        let chunks = SlidingWindowChunker::new(50, 10).unwrap().chunk(&doc).unwrap();
        for chunk in &chunks {
            assert_eq!(chunk.text, &doc.text[chunk.start..chunk.end]);
        }
        assert_eq!(chunks.last().unwrap().end, doc.text.len());
    }

    #[test]
    fn chunking_is_deterministic() {
        let doc = Document::new("d", "One. Two! Three? Four\n\nFive six seven. ".repeat(30));
        let chunker = SlidingWindowChunker::new(120, 30).unwrap();
        assert_eq!(chunker.chunk(&doc).unwrap(), chunker.chunk(&doc).unwrap());
    }
}
