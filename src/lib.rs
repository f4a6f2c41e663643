//! # mcq2slots
//!
//! Parse loosely formatted multiple-choice questions from plain text and
//! place them into the fixed slots of a question template.
//!
//! ## Input format
//!
//! ```text
//! 1. What is 2+2?
//! (A) 3
//! (B) 4 @
//! (C) 5
//!
//! Q2) Capital of France?
//! A. Paris @
//! B. Lyon
//! ```
//!
//! Prose lines form the question stem (leading `1.`, `Q2)` style numbers are
//! stripped). Lines starting with `(A)`, `A)`, `[a]` or `A.`–`D.` are
//! options. The option containing the answer marker (`@` by default) is the
//! correct one. Questions without a marked option are still emitted and
//! reported as *unresolved* by input line index.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text
//!  │
//!  ├─ 1. Input     file / stdin → UTF-8 lines
//!  ├─ 2. Chunk     optional `---name---` split into sub-documents
//!  ├─ 3. Classify  option vs. prose lines, prose runs merged
//!  ├─ 4. Strip     question numbers removed from stem lines
//!  ├─ 5. Extract   one record per stem + option group, up to the slot limit
//!  └─ 6. Slots     record → fixed cells of the i-th template table
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mcq2slots::{parse_text, ParseConfig};
//!
//! let text = "Q1) Capital of France?\nA. Paris\nB. Lyon\n";
//! let result = parse_text(text, &ParseConfig::default());
//! assert_eq!(result.questions.len(), 1);
//! assert_eq!(result.unresolved_indices, vec![0]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mcq2slots` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;
pub mod slots;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MarkerPolicy, ParseConfig, ParseConfigBuilder, TemplateSize};
pub use error::{ChunkError, McqError, SlotError};
pub use output::{
    BatchOutput, ChunkResult, FilledDocument, FilledTemplate, OptionEntry, ParseResult,
    ParseStats, QuestionRecord,
};
pub use parse::{
    fill_document, fill_tables, parse_document, parse_file, parse_lines, parse_text,
    process_document, process_files,
};
pub use pipeline::chunk::{split_chunks, NamedChunk};
pub use pipeline::classify::{classify, LineClass};
pub use progress::{NoopProgressCallback, ParseProgressCallback, ProgressCallback};
pub use slots::{fill_slots, SlotSink, TableSink};
