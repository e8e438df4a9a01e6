// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text chunker for embedding generation.
//!
//! Splits a letter body into fixed-size character windows where each window
//! overlaps its predecessor by a fixed number of characters. Positions are
//! counted in `char`s so multi-byte text is never split inside a code point.

use crate::errors::{RagError, Result};

/// Default number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Configuration for the text chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Number of characters per chunk.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkConfig {
    /// Creates a new ChunkConfig with the specified parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidChunkConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::InvalidChunkConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// A window of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Starting character offset (inclusive).
    pub start: usize,
    /// Ending character offset (exclusive).
    pub end: usize,
    /// The chunk text content.
    pub text: String,
}

/// Splits text into overlapping character windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    /// Creates a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Creates a chunker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ChunkConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Returns a lazy iterator over the windows of `content`.
    ///
    /// Algorithm:
    /// ```text
    /// start = 0
    /// step = chunk_size - chunk_overlap
    /// loop:
    ///   end = min(start + chunk_size, total_chars)
    ///   emit chars[start..end]
    ///   if end == total_chars: stop
    ///   start += step
    /// ```
    ///
    /// The iterator is `Clone`, so a sequence can be restarted from any point.
    pub fn chunks<'a>(&self, content: &'a str) -> Chunks<'a> {
        // Byte offset of every char boundary, including the end of the string.
        let boundaries: Vec<usize> = content
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(content.len()))
            .collect();
        Chunks {
            content,
            boundaries,
            config: self.config,
            next_start: 0,
            done: content.is_empty(),
        }
    }

    /// Splits text into overlapping chunks.
    pub fn chunk_text(&self, content: &str) -> Vec<TextChunk> {
        self.chunks(content).collect()
    }

    /// Number of chunks `chunk_text` yields for a text of `total_chars` characters.
    pub fn expected_chunks(&self, total_chars: usize) -> usize {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        match total_chars {
            0 => 0,
            n if n <= size => 1,
            n => (n - overlap).div_ceil(self.config.step()),
        }
    }
}

/// Iterator returned by [`TextChunker::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    content: &'a str,
    boundaries: Vec<usize>,
    config: ChunkConfig,
    next_start: usize,
    done: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = TextChunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let total_chars = self.boundaries.len() - 1;
        let start = self.next_start;
        let end = (start + self.config.chunk_size).min(total_chars);
        let text = &self.content[self.boundaries[start]..self.boundaries[end]];

        if end == total_chars {
            self.done = true;
        } else {
            self.next_start = start + self.config.step();
        }

        Some(TextChunk {
            start,
            end,
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkConfig::new(size, overlap).unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
    }

    #[test]
    fn test_config_validation() {
        assert!(ChunkConfig::new(500, 50).is_ok());

        // Invalid: overlap >= size
        assert!(ChunkConfig::new(20, 20).is_err());
        assert!(ChunkConfig::new(20, 30).is_err());

        // Invalid: zero size
        assert!(ChunkConfig::new(0, 0).is_err());
    }

    #[test]
    fn test_empty_content() {
        let chunker = TextChunker::with_defaults();
        assert!(chunker.chunk_text("").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunker(5, 2).chunk_text("abc");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 3));
    }

    #[test]
    fn test_exact_window_is_single_chunk() {
        let chunks = chunker(5, 2).chunk_text("abcde");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abcde");
    }

    #[test]
    fn test_multiple_chunks() {
        // 10 chars, size 4, overlap 1, step 3: [0-4], [3-7], [6-10]
        let chunks = chunker(4, 1).chunk_text("0123456789");
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["0123", "3456", "6789"]);
    }

    #[test]
    fn test_short_final_chunk() {
        // 11 chars, size 4, overlap 1: [0-4], [3-7], [6-10], [9-11]
        let chunks = chunker(4, 1).chunk_text("0123456789a");
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].text, "9a");
    }

    #[test]
    fn test_chunk_count_formula() {
        for (size, overlap) in [(4, 1), (5, 0), (7, 3), (500, 50)] {
            let chunker = chunker(size, overlap);
            for len in 0..60 {
                let text = "x".repeat(len);
                let count = chunker.chunk_text(&text).len();
                let expected = if len == 0 {
                    0
                } else if len <= size {
                    1
                } else {
                    (len - overlap).div_ceil(size - overlap)
                };
                assert_eq!(count, expected, "len={len} size={size} overlap={overlap}");
                assert_eq!(chunker.expected_chunks(len), expected);
            }
        }
    }

    #[test]
    fn test_overlapping_content() {
        let text: String = ('a'..='z').collect();
        let chunks = chunker(6, 2).chunk_text(&text);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert_eq!(&prev[prev.len() - 2..], &next[..2]);
        }
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
        assert_eq!(chunks.last().unwrap().end, 26);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "éééééééééé";
        let chunks = chunker(4, 1).chunk_text(text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 4));
        assert_eq!(chunks[0].text, "éééé");
    }

    #[test]
    fn test_iterator_is_restartable() {
        let chunker = chunker(4, 1);
        let mut iter = chunker.chunks("0123456789");
        iter.next();
        let snapshot = iter.clone();
        let rest: Vec<TextChunk> = iter.collect();
        let replay: Vec<TextChunk> = snapshot.collect();
        assert_eq!(rest, replay);
        assert_eq!(rest.len(), 2);
    }
}
