//! RAG Context Builder.
//!
//! Formats retrieved segments into the grounding block of a prompt:
//! numbered passages, optionally tagged with their source offset and score.

use super::chunker::Segment;
use super::index::ScoredSegment;

/// RAG Context Builder.
#[derive(Debug, Clone)]
pub struct RAGContextBuilder {
    include_citations: bool,
}

impl Default for RAGContextBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RAGContextBuilder {
    pub fn new(include_citations: bool) -> Self {
        Self { include_citations }
    }

    /// Format scored segments, keeping retrieval order.
    pub fn build_context(&self, hits: &[ScoredSegment]) -> String {
        let mut context = String::new();

        for (i, hit) in hits.iter().enumerate() {
            self.push_passage(&mut context, i, &hit.segment, hit.score);
        }

        context.trim().to_string()
    }

    fn push_passage(&self, context: &mut String, i: usize, segment: &Segment, score: f32) {
        if !self.include_citations {
            context.push_str(&segment.text);
            context.push_str("\n\n");
            return;
        }

        let header = match segment.source_offset {
            Some(offset) => format!("[{}] (offset: {}, relevance: {:.2})", i + 1, offset, score),
            None => format!("[{}] (relevance: {:.2})", i + 1, score),
        };

        context.push_str(&header);
        context.push('\n');
        context.push_str(&segment.text);
        context.push_str("\n\n");
    }
}
