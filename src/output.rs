//! Result types returned by the parse entry points.
//!
//! Everything here is a plain value: created fresh per call, never shared
//! between calls, and serialisable so the CLI can emit it as JSON.

use crate::error::ChunkError;
use crate::slots::TableSink;
use serde::{Deserialize, Serialize};

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Label taken from the option marker (`A`, `b`, `1`), or the 1-based
    /// position when the line carried no recognisable marker.
    pub label: String,
    /// Option text with the marker decoration removed.
    pub text: String,
    /// True for the first option of the group carrying the answer marker.
    pub is_correct: bool,
}

/// One parsed question: the stem plus its option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question text, numbering stripped, lines joined with `\n`. May be empty.
    pub stem: String,
    /// Options in input order.
    pub options: Vec<OptionEntry>,
    /// 0-based index of the correct option, if a marker was found.
    pub correct_option_index: Option<usize>,
}

impl QuestionRecord {
    /// The correct option, if any.
    pub fn correct_option(&self) -> Option<&OptionEntry> {
        self.correct_option_index.and_then(|i| self.options.get(i))
    }

    /// 1-based answer number as written into a template slot (`""` when unresolved).
    pub fn answer_number(&self) -> String {
        self.correct_option_index
            .map(|i| (i + 1).to_string())
            .unwrap_or_default()
    }

    /// Text of the option at `index`, or `""` when the group is shorter.
    pub fn option_text(&self, index: usize) -> &str {
        self.options.get(index).map(|o| o.text.as_str()).unwrap_or("")
    }
}

/// Output of one parse: records in input order plus advisory diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Emitted records, in input order.
    pub questions: Vec<QuestionRecord>,
    /// 0-based input line index of each emitted block with no answer marker.
    pub unresolved_indices: Vec<usize>,
    /// Blocks detected but not emitted because the record limit was reached.
    pub unconsumed_blocks: usize,
}

impl ParseResult {
    /// Total question blocks detected in the input, emitted or not.
    pub fn total_blocks(&self) -> usize {
        self.questions.len() + self.unconsumed_blocks
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.unconsumed_blocks == 0
    }
}

/// Outcome of processing one chunk.
///
/// Parsing itself cannot fail, so `result` is always there; `error` is set
/// when a later step for this chunk failed, e.g. filling its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Chunk name from its delimiter, or the positional default.
    pub name: String,
    /// Whether `name` came from a delimiter line.
    pub named: bool,
    /// 1-indexed position among the chunks of the input.
    pub index: usize,
    /// 0-based line index of the chunk's first content line in the input.
    pub first_line: usize,
    pub result: ParseResult,
    pub error: Option<ChunkError>,
    /// Slots written by the per-chunk step (0 when no sink was involved).
    pub slots_filled: usize,
}

impl ChunkResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts over every chunk of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_chunks: usize,
    pub failed_chunks: usize,
    pub total_questions: usize,
    pub resolved_questions: usize,
    pub unresolved_questions: usize,
    pub unconsumed_blocks: usize,
    pub slots_filled: usize,
}

impl ParseStats {
    pub fn from_chunks(chunks: &[ChunkResult]) -> Self {
        let mut stats = ParseStats {
            total_chunks: chunks.len(),
            ..Default::default()
        };
        for chunk in chunks {
            if chunk.error.is_some() {
                stats.failed_chunks += 1;
            }
            stats.slots_filled += chunk.slots_filled;
            stats.total_questions += chunk.result.questions.len();
            stats.unresolved_questions += chunk.result.unresolved_indices.len();
            stats.unconsumed_blocks += chunk.result.unconsumed_blocks;
        }
        stats.resolved_questions = stats.total_questions - stats.unresolved_questions;
        stats
    }
}

/// Everything produced from one input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub chunks: Vec<ChunkResult>,
    pub stats: ParseStats,
}

impl BatchOutput {
    pub fn new(chunks: Vec<ChunkResult>) -> Self {
        let stats = ParseStats::from_chunks(&chunks);
        Self { chunks, stats }
    }

    /// `(name, result)` pairs in chunk order.
    pub fn named_results(&self) -> impl Iterator<Item = (&str, &ParseResult)> {
        self.chunks.iter().map(|c| (c.name.as_str(), &c.result))
    }
}

/// A chunk's filled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledTemplate {
    /// 1-indexed position of the chunk, matching [`ChunkResult::index`].
    pub index: usize,
    /// Chunk name (or its positional default). Not unique.
    pub name: String,
    pub template: TableSink,
}

/// Parse output of one document plus one filled template per chunk.
///
/// Chunks whose filling failed have an entry in `batch` with `error` set
/// and no template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledDocument {
    pub batch: BatchOutput,
    pub templates: Vec<FilledTemplate>,
}

impl FilledDocument {
    /// The chunk a template was filled from.
    pub fn chunk_of(&self, filled: &FilledTemplate) -> Option<&ChunkResult> {
        self.batch.chunks.iter().find(|c| c.index == filled.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(correct: Option<usize>, n: usize) -> QuestionRecord {
        QuestionRecord {
            stem: "Q".into(),
            options: (0..n)
                .map(|i| OptionEntry {
                    label: ((b'A' + i as u8) as char).to_string(),
                    text: format!("opt{i}"),
                    is_correct: Some(i) == correct,
                })
                .collect(),
            correct_option_index: correct,
        }
    }

    #[test]
    fn answer_number_is_one_based() {
        assert_eq!(record(Some(1), 3).answer_number(), "2");
        assert_eq!(record(None, 3).answer_number(), "");
    }

    #[test]
    fn option_text_pads_missing_options() {
        let r = record(None, 2);
        assert_eq!(r.option_text(1), "opt1");
        assert_eq!(r.option_text(3), "");
    }

    #[test]
    fn correct_option_lookup() {
        let r = record(Some(2), 4);
        assert_eq!(r.correct_option().map(|o| o.label.as_str()), Some("C"));
    }

    #[test]
    fn stats_aggregate_over_chunks() {
        let ok = ChunkResult {
            name: "doc1".into(),
            named: true,
            index: 1,
            first_line: 1,
            result: ParseResult {
                questions: vec![record(Some(0), 2), record(None, 2)],
                unresolved_indices: vec![4],
                unconsumed_blocks: 1,
            },
            error: None,
            slots_filled: 2,
        };
        let failed = ChunkResult {
            name: "doc2".into(),
            index: 2,
            error: Some(ChunkError::ProcessingFailed {
                chunk: "doc2".into(),
                detail: "sink closed".into(),
            }),
            slots_filled: 0,
            ..ok.clone()
        };
        let batch = BatchOutput::new(vec![ok, failed]);
        assert_eq!(batch.stats.total_chunks, 2);
        assert_eq!(batch.stats.failed_chunks, 1);
        assert_eq!(batch.stats.total_questions, 4);
        assert_eq!(batch.stats.resolved_questions, 2);
        assert_eq!(batch.stats.unconsumed_blocks, 2);
        assert_eq!(batch.stats.slots_filled, 2);
        assert_eq!(batch.named_results().count(), 2);
    }
}
