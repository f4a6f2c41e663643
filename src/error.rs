//! Error types for the mcq2slots library.
//!
//! Two error types reflect two distinct failure modes:
//!
//! * [`McqError`] is **fatal**: the run cannot proceed at all (input file
//!   missing, not UTF-8, invalid configuration, output not writable).
//!   Returned as `Err(McqError)` from the I/O entry points.
//!
//! * [`ChunkError`] is **non-fatal**: processing one chunk failed (the slot
//!   sink rejected a write) but sibling chunks are fine. Stored inside
//!   [`crate::output::ChunkResult`].
//!
//! [`SlotError`] is what a [`crate::slots::SlotSink`] reports; the parse
//! entry points wrap it into a [`ChunkError`].
//!
//! The parser itself never fails: malformed lines degrade to option text
//! and missing answer markers are reported as unresolved indices.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mcq2slots library.
///
/// Chunk-level failures use [`ChunkError`] and are stored in
/// [`crate::output::ChunkResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum McqError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but its content is not valid UTF-8 text.
    #[error("Input '{path}' is not valid UTF-8 text (first bad byte at offset {offset})")]
    NotUtf8 { path: PathBuf, offset: usize },

    /// Reading the input failed for a reason other than the above.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single chunk.
///
/// The overall run continues with the next chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// The slot sink refused a cell write.
    #[error("Chunk '{chunk}': slot {slot} rejected cell ({row}, {col}): {detail}")]
    SinkWriteFailed {
        chunk: String,
        slot: usize,
        row: usize,
        col: usize,
        detail: String,
    },

    /// Caller-supplied per-chunk processing failed.
    #[error("Chunk '{chunk}': {detail}")]
    ProcessingFailed { chunk: String, detail: String },
}

/// Rejection of a single cell write by a [`crate::slots::SlotSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The template has fewer slots than records to place.
    #[error("slot {slot} does not exist (template has {count} slots)")]
    SlotOutOfRange { slot: usize, count: usize },

    /// The cell coordinate lies outside the slot's table.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} table")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Sink-specific failure.
    #[error("{0}")]
    Other(String),
}

impl ChunkError {
    /// Name of the chunk the error belongs to.
    pub fn chunk(&self) -> &str {
        match self {
            ChunkError::SinkWriteFailed { chunk, .. } | ChunkError::ProcessingFailed { chunk, .. } => {
                chunk
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_utf8_display() {
        let e = McqError::NotUtf8 {
            path: PathBuf::from("questions.txt"),
            offset: 17,
        };
        let msg = e.to_string();
        assert!(msg.contains("questions.txt"), "got: {msg}");
        assert!(msg.contains("17"), "got: {msg}");
    }

    #[test]
    fn invalid_config_display() {
        let e = McqError::InvalidConfig("Concurrency must be ≥ 1".into());
        assert!(e.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn sink_error_display_names_chunk_and_cell() {
        let e = ChunkError::SinkWriteFailed {
            chunk: "doc1".into(),
            slot: 3,
            row: 4,
            col: 3,
            detail: "out of range".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("doc1"));
        assert!(msg.contains("(4, 3)"));
        assert_eq!(e.chunk(), "doc1");
    }

    #[test]
    fn chunk_error_serialises() {
        let e = ChunkError::ProcessingFailed {
            chunk: "output_1".into(),
            detail: "boom".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: ChunkError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
