//! Pipeline stages for MCQ text parsing.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage is testable on its own and the grammar lives in one place.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ classify ──▶ strip ──▶ extract
//! (file)    (opt.)    (group)      (Q-num)   (records)
//! ```
//!
//! 1. [`input`]   : read a file or stdin as UTF-8 lines
//! 2. [`chunk`]   : optional `---name---` splitting into sub-documents
//! 3. [`classify`]: option/prose classification and prose-run grouping
//! 4. [`strip`]   : question-number removal on stem lines
//! 5. [`extract`] : stem/option pairing, answer marker, record limit

pub mod chunk;
pub mod classify;
pub mod extract;
pub mod input;
pub mod strip;
