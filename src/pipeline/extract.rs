//! Question/option extraction from grouped segments.
//!
//! A *block* is an optional prose segment (the stem) followed by every
//! contiguous option segment after it. Each block becomes one
//! [`QuestionRecord`]; extraction stops at the caller's record limit and
//! reports how many blocks were left over.

use crate::config::{MarkerPolicy, ParseConfig};
use crate::output::{OptionEntry, ParseResult, QuestionRecord};
use crate::pipeline::classify::{split_option, Segment};
use crate::pipeline::strip::strip_stem;
use tracing::debug;

/// A stem and its option group, borrowed from the segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Raw stem text (numbering not yet stripped); `""` when the block
    /// opens directly with options.
    pub stem: &'a str,
    /// The option segments of the group, possibly empty.
    pub options: &'a [Segment],
    /// Input line index of the block's first line.
    pub start_line: usize,
}

/// Partition segments into blocks.
pub fn split_blocks(segments: &[Segment]) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < segments.len() {
        let start_line = segments[i].start_line();
        let stem = match &segments[i] {
            Segment::Prose { text, .. } => {
                i += 1;
                text.as_str()
            }
            Segment::Option { .. } => "",
        };

        let opt_start = i;
        while i < segments.len() && matches!(segments[i], Segment::Option { .. }) {
            i += 1;
        }

        blocks.push(Block {
            stem,
            options: &segments[opt_start..i],
            start_line,
        });
    }

    blocks
}

/// Build the record for one block.
///
/// The marker is looked for on the raw option line, before the label is
/// split off; only the first marked option of the group counts.
pub fn build_record(block: &Block<'_>, config: &ParseConfig) -> QuestionRecord {
    let mut correct_option_index = None;

    let options = block
        .options
        .iter()
        .enumerate()
        .map(|(pos, seg)| {
            let raw = match seg {
                Segment::Option { text, .. } | Segment::Prose { text, .. } => text.as_str(),
            };
            let parts = split_option(raw);

            let is_correct = correct_option_index.is_none() && raw.contains(config.marker);
            if is_correct {
                correct_option_index = Some(pos);
            }

            let text = match config.marker_policy {
                MarkerPolicy::Keep => parts.text.to_string(),
                MarkerPolicy::Strip => parts.text.replace(config.marker, "").trim().to_string(),
            };

            OptionEntry {
                label: parts
                    .label
                    .map(String::from)
                    .unwrap_or_else(|| (pos + 1).to_string()),
                text,
                is_correct,
            }
        })
        .collect();

    QuestionRecord {
        stem: strip_stem(block.stem),
        options,
        correct_option_index,
    }
}

/// Extract question records from grouped segments.
///
/// Honours [`ParseConfig::effective_max_records`]; blocks past the limit
/// are counted in [`ParseResult::unconsumed_blocks`] and otherwise ignored.
pub fn extract(segments: &[Segment], config: &ParseConfig) -> ParseResult {
    let blocks = split_blocks(segments);
    let limit = config.effective_max_records().unwrap_or(usize::MAX);

    let mut result = ParseResult {
        unconsumed_blocks: blocks.len().saturating_sub(limit),
        ..Default::default()
    };

    for block in blocks.iter().take(limit) {
        let record = build_record(block, config);
        if record.correct_option_index.is_none() {
            debug!(
                "No answer marker for block at line {} ({} options)",
                block.start_line + 1,
                record.options.len()
            );
            result.unresolved_indices.push(block.start_line);
        }
        result.questions.push(record);
    }

    result
}
