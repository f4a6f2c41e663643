//! Parse entry points.
//!
//! The pure functions ([`parse_lines`], [`parse_text`], [`parse_document`])
//! never fail and perform no I/O. [`process_document`] runs a caller step
//! per chunk and isolates its failures; [`fill_document`] is that step
//! specialised to slot sinks. The file-based functions add input
//! resolution, and [`process_files`] parses many files concurrently.

use crate::config::ParseConfig;
use crate::error::{ChunkError, McqError};
use crate::output::{BatchOutput, ChunkResult, FilledDocument, FilledTemplate, ParseResult};
use crate::pipeline::chunk::{split_chunks, NamedChunk};
use crate::pipeline::classify::group_lines;
use crate::pipeline::extract::extract;
use crate::pipeline::input;
use crate::slots::{fill_slots, SlotSink, TableSink};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parse a sequence of raw lines into question records.
///
/// Line indices in the result refer to positions in `lines`.
///
/// # Example
/// ```rust
/// use mcq2slots::{parse_lines, ParseConfig};
///
/// let lines = ["1. What is 2+2?", "(A) 3", "(B) 4 @", "(C) 5"];
/// let result = parse_lines(&lines, &ParseConfig::default());
/// assert_eq!(result.questions[0].stem, "What is 2+2?");
/// assert_eq!(result.questions[0].correct_option_index, Some(1));
/// ```
pub fn parse_lines<S: AsRef<str>>(lines: &[S], config: &ParseConfig) -> ParseResult {
    parse_at(lines, 0, config)
}

/// Parse a block of text, splitting it on line boundaries first.
pub fn parse_text(text: &str, config: &ParseConfig) -> ParseResult {
    parse_lines(&input::split_lines(text), config)
}

fn parse_at<S: AsRef<str>>(lines: &[S], line_offset: usize, config: &ParseConfig) -> ParseResult {
    let segments = group_lines(lines, line_offset);
    let result = extract(&segments, config);
    debug!(
        "Grouped {} segments into {} records ({} unresolved, {} unconsumed)",
        segments.len(),
        result.questions.len(),
        result.unresolved_indices.len(),
        result.unconsumed_blocks
    );
    if result.unconsumed_blocks > 0 {
        warn!(
            "Record limit reached: {} question blocks left unconsumed",
            result.unconsumed_blocks
        );
    }
    result
}

/// Parse a document, splitting it into chunks first when
/// [`ParseConfig::chunk_mode`] is set.
///
/// Without chunk mode the whole input is one unnamed chunk, so the output
/// always carries exactly one result (empty for empty input).
pub fn parse_document<S: AsRef<str>>(lines: &[S], config: &ParseConfig) -> BatchOutput {
    process_document(lines, config, |_, _| Ok(0))
}

/// Parse a document and run `step` on every chunk's result.
///
/// `step` receives the chunk name and its [`ParseResult`] and returns how
/// many slots it filled. An `Err` is recorded on that chunk only; the
/// remaining chunks are still parsed and stepped.
pub fn process_document<S, F>(lines: &[S], config: &ParseConfig, mut step: F) -> BatchOutput
where
    S: AsRef<str>,
    F: FnMut(&str, &ParseResult) -> Result<usize, ChunkError>,
{
    let chunks = if config.chunk_mode {
        split_chunks(lines)
    } else {
        vec![NamedChunk {
            name: None,
            lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            first_line: 0,
        }]
    };
    let total = chunks.len();
    debug!("Processing {} chunk(s)", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let results: Vec<ChunkResult> = chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let index = i + 1;
            let named = chunk.name.is_some();
            let name = chunk
                .name
                .unwrap_or_else(|| config.default_chunk_name(index));

            if let Some(ref cb) = config.progress_callback {
                cb.on_chunk_start(index, total, &name);
            }

            let result = parse_at(&chunk.lines, chunk.first_line, config);
            let (slots_filled, error) = match step(&name, &result) {
                Ok(n) => (n, None),
                Err(e) => {
                    warn!("{}", e);
                    (0, Some(e))
                }
            };

            if let Some(ref cb) = config.progress_callback {
                match &error {
                    None => cb.on_chunk_complete(index, total, &name, result.questions.len()),
                    Some(e) => cb.on_chunk_error(index, total, &name, &e.to_string()),
                }
            }

            ChunkResult {
                name,
                named,
                index,
                first_line: chunk.first_line,
                result,
                error,
                slots_filled,
            }
        })
        .collect();

    let output = BatchOutput::new(results);
    info!(
        "Parsed {} chunk(s): {} questions, {} unresolved, {} failed",
        output.stats.total_chunks,
        output.stats.total_questions,
        output.stats.unresolved_questions,
        output.stats.failed_chunks
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, total - output.stats.failed_chunks);
    }

    output
}

/// Parse a document and fill one sink per chunk.
///
/// `make_sink` builds the sink for a chunk from its name and parse result.
/// Each filled sink comes back with its chunk's 1-indexed position (chunk
/// names may repeat). Sinks of chunks whose fill failed are dropped; the
/// failure is recorded on the chunk.
pub fn fill_document<S, K, M>(
    lines: &[S],
    config: &ParseConfig,
    mut make_sink: M,
) -> (BatchOutput, Vec<(usize, K)>)
where
    S: AsRef<str>,
    K: SlotSink,
    M: FnMut(&str, &ParseResult) -> K,
{
    let mut sinks = Vec::new();
    // The step runs once per chunk, in chunk order.
    let mut index = 0;
    let batch = process_document(lines, config, |name, result| {
        index += 1;
        let mut sink = make_sink(name, result);
        let filled = fill_slots(&result.questions, &mut sink).map_err(|e| {
            ChunkError::SinkWriteFailed {
                chunk: name.to_string(),
                slot: e.slot,
                row: e.row,
                col: e.col,
                detail: e.source.to_string(),
            }
        })?;
        sinks.push((index, sink));
        Ok(filled)
    });
    (batch, sinks)
}

/// Parse a document into in-memory templates.
///
/// Each chunk gets a [`TableSink`] of the configured template size, or one
/// exactly as large as its record count when no template is configured.
pub fn fill_tables<S: AsRef<str>>(lines: &[S], config: &ParseConfig) -> FilledDocument {
    let (batch, sinks) = fill_document(lines, config, |_, result| match config.template_size {
        Some(size) => TableSink::for_template(size),
        None => TableSink::new(result.questions.len()),
    });
    let templates = sinks
        .into_iter()
        .map(|(index, template)| FilledTemplate {
            index,
            name: batch
                .chunks
                .get(index - 1)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            template,
        })
        .collect();
    FilledDocument { batch, templates }
}

/// Read a text file (or stdin, `-`) and fill its templates.
///
/// # Errors
/// Returns `Err(McqError)` only when the input cannot be read or decoded.
pub fn parse_file(path: impl AsRef<Path>, config: &ParseConfig) -> Result<FilledDocument, McqError> {
    let path = path.as_ref();
    info!("Parsing {}", path.display());
    let lines = input::read_lines(path)?;
    Ok(fill_tables(&lines, config))
}

/// Parse several files concurrently, at most [`ParseConfig::concurrency`]
/// at a time.
///
/// Results come back in input order. A file that cannot be read yields an
/// `Err` in its own slot without affecting the others. Progress events are
/// reported per file (one "chunk" per file, named by the file stem).
pub async fn process_files(
    paths: &[PathBuf],
    config: &ParseConfig,
) -> Vec<(PathBuf, Result<FilledDocument, McqError>)> {
    let total = paths.len();
    info!("Parsing {} file(s), concurrency {}", total, config.concurrency);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // Per-chunk events would interleave across files; keep them file-level.
    let mut file_config = config.clone();
    file_config.progress_callback = None;

    let mut results: Vec<(usize, PathBuf, Result<FilledDocument, McqError>)> =
        stream::iter(paths.iter().enumerate().map(|(i, path)| {
            let file_config = file_config.clone();
            let cb = config.progress_callback.clone();
            async move {
                let index = i + 1;
                let name = input::output_stem(path);
                if let Some(ref cb) = cb {
                    cb.on_chunk_start(index, total, &name);
                }

                let outcome = input::read_lines_async(path)
                    .await
                    .map(|lines| fill_tables(&lines, &file_config));

                if let Some(ref cb) = cb {
                    match &outcome {
                        Ok(doc) => cb.on_chunk_complete(
                            index,
                            total,
                            &name,
                            doc.batch.stats.total_questions,
                        ),
                        Err(e) => cb.on_chunk_error(index, total, &name, &e.to_string()),
                    }
                }
                (i, path.clone(), outcome)
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(i, _, _)| *i);
    let success = results.iter().filter(|(_, _, r)| r.is_ok()).count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, success);
    }

    results
        .into_iter()
        .map(|(_, path, outcome)| (path, outcome))
        .collect()
}
