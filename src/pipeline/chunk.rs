//! Chunk splitting on `---name---` delimiter lines.
//!
//! One text stream can carry several independent question sets:
//!
//! ```text
//! ---doc1---
//! 1. A?
//! A. yes@
//! ---doc2---
//! ...
//! ```
//!
//! Every delimiter closes the current chunk (if it holds any content) and
//! opens a new one named by the text between the dashes. Content before the
//! first delimiter forms an unnamed chunk. Chunks keep their raw lines and
//! the input index of their first line so diagnostics can point back into
//! the whole document.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---(.*)---$").unwrap());

/// A named sub-document of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedChunk {
    /// Text between the delimiter dashes; `None` for leading content or an
    /// empty name (`------`).
    pub name: Option<String>,
    /// Raw lines of the chunk, delimiter excluded.
    pub lines: Vec<String>,
    /// Input line index of `lines[0]`.
    pub first_line: usize,
}

impl NamedChunk {
    fn has_content(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }
}

/// If `line` is a delimiter, return its (possibly empty) name.
pub fn delimiter_name(line: &str) -> Option<&str> {
    RE_DELIMITER
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Split raw lines into named chunks.
///
/// Chunks without any non-blank line are dropped; the final chunk is
/// flushed even without a trailing delimiter.
pub fn split_chunks<S: AsRef<str>>(lines: &[S]) -> Vec<NamedChunk> {
    let mut chunks = Vec::new();
    let mut current = NamedChunk {
        name: None,
        lines: Vec::new(),
        first_line: 0,
    };

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        match delimiter_name(line) {
            Some(name) => {
                let next = NamedChunk {
                    name: (!name.is_empty()).then(|| name.to_string()),
                    lines: Vec::new(),
                    first_line: i + 1,
                };
                let done = std::mem::replace(&mut current, next);
                if done.has_content() {
                    chunks.push(done);
                }
            }
            None => current.lines.push(line.to_string()),
        }
    }

    if current.has_content() {
        chunks.push(current);
    }

    chunks
}
