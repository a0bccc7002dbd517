//! Separator-aware text chunking.
//!
//! Text is split on a separator into atomic units, which are greedily packed
//! into segments of at most `chunk_size` characters. Consecutive segments share
//! up to `chunk_overlap` characters' worth of trailing units. A unit is never
//! split, so a unit longer than `chunk_size` becomes an oversized segment.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::defaults::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATOR,
};
use crate::core::errors::ApiError;

/// Configuration for the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum segment size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive segments
    pub chunk_overlap: usize,
    /// Boundary between atomic units
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.chunk_size == 0 {
            return Err(ApiError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ApiError::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A contiguous slice of ingested text, the unit that gets embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Byte offset of the first character within the ingested text.
    pub source_offset: Option<usize>,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_offset: None,
        }
    }

    pub fn with_offset(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            source_offset: Some(offset),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Unit<'a> {
    text: &'a str,
    offset: usize,
    chars: usize,
}

/// Splits text into overlapping segments.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a chunker, rejecting `chunk_overlap >= chunk_size`.
    pub fn new(config: ChunkingConfig) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn chunk(&self, text: &str) -> Vec<Segment> {
        let units = split_units(text, &self.config.separator);
        self.merge_units(units)
    }

    fn merge_units(&self, units: Vec<Unit<'_>>) -> Vec<Segment> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = self.config.separator.chars().count();

        let mut segments = Vec::new();
        let mut current: VecDeque<Unit<'_>> = VecDeque::new();
        let mut total = 0usize;

        for unit in units {
            let joiner = if current.is_empty() { 0 } else { sep_len };
            if total + unit.chars + joiner > size && !current.is_empty() {
                segments.extend(self.emit(&current));

                // Keep only as much trailing context as the overlap allows.
                loop {
                    let joiner = if current.is_empty() { 0 } else { sep_len };
                    let must_shrink =
                        total > overlap || (total > 0 && total + unit.chars + joiner > size);
                    if !must_shrink {
                        break;
                    }
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    let dropped_joiner = if current.is_empty() { 0 } else { sep_len };
                    total -= front.chars + dropped_joiner;
                }
            }

            current.push_back(unit);
            total += unit.chars + if current.len() > 1 { sep_len } else { 0 };
        }

        segments.extend(self.emit(&current));
        segments
    }

    fn emit(&self, units: &VecDeque<Unit<'_>>) -> Option<Segment> {
        let first = units.front()?;
        let joined = units
            .iter()
            .map(|unit| unit.text)
            .collect::<Vec<_>>()
            .join(&self.config.separator);

        let trimmed = joined.trim();
        if trimmed.is_empty() {
            return None;
        }

        let leading = joined.len() - joined.trim_start().len();
        let segment = Segment::with_offset(trimmed, first.offset + leading);
        let chars = segment.char_count();
        if chars > self.config.chunk_size {
            tracing::warn!(
                "Created a segment of {} characters, longer than the configured {}",
                chars,
                self.config.chunk_size
            );
        }
        Some(segment)
    }
}

/// Chunk `text` with explicit parameters.
pub fn chunk(
    text: &str,
    size: usize,
    overlap: usize,
    separator: &str,
) -> Result<Vec<Segment>, ApiError> {
    let chunker = TextChunker::new(ChunkingConfig {
        chunk_size: size,
        chunk_overlap: overlap,
        separator: separator.to_string(),
    })?;
    Ok(chunker.chunk(text))
}

fn split_units<'a>(text: &'a str, separator: &str) -> Vec<Unit<'a>> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(offset, c)| Unit {
                text: &text[offset..offset + c.len_utf8()],
                offset,
                chars: 1,
            })
            .collect();
    }

    let mut units = Vec::new();
    let mut offset = 0;
    for piece in text.split(separator) {
        if !piece.is_empty() {
            units.push(Unit {
                text: piece,
                offset,
                chars: piece.chars().count(),
            });
        }
        offset += piece.len() + separator.len();
    }
    units
}
