//! Line classification and prose grouping.
//!
//! A line is an *option* when it opens with an option marker:
//!
//! - `(A)`, `[b]`, `A)`, `1]`: optional open bracket/paren, one
//!   alphanumeric label, a closing bracket/paren;
//! - `A.` … `D.`: a letter A–D (either case) followed by a period.
//!
//! Everything else is prose. [`OPTION_MARKER`] is the single source of truth
//! for that grammar: the grouper classifies with it and the extractor splits
//! label from text with the very same match, so the two can never disagree.
//!
//! Grouping folds the lines through a [`GroupState`] accumulator: prose
//! lines pile up until an option line arrives, at which point the run is
//! flushed as one [`Segment::Prose`]. An option group ends at the next prose
//! line, so options of one question must be contiguous.

use once_cell::sync::Lazy;
use regex::Regex;

/// Option-marker grammar, anchored at the start of a trimmed line.
///
/// Either `paren` or `dot` captures the label character; the match ends
/// right after the marker's closing bracket/paren or period.
pub static OPTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[(\[]?(?P<paren>[A-Za-z0-9])[)\]]|(?P<dot>[A-Da-d])\.)").unwrap()
});

/// Classification of a single non-empty trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Option,
    Prose,
}

/// Classify a trimmed line against [`OPTION_MARKER`].
pub fn classify(line: &str) -> LineClass {
    if OPTION_MARKER.is_match(line) {
        LineClass::Option
    } else {
        LineClass::Prose
    }
}

/// Label and text of an option line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionParts<'a> {
    /// Marker label, `None` when the line has no recognisable marker.
    pub label: Option<char>,
    /// Trimmed text after the marker (the whole trimmed line if no marker).
    pub text: &'a str,
}

/// Split an option line into its marker label and text.
///
/// Never fails: a line without a marker is returned whole as text.
pub fn split_option(line: &str) -> OptionParts<'_> {
    let line = line.trim();
    match OPTION_MARKER.captures(line) {
        Some(caps) => {
            let label = caps
                .name("paren")
                .or_else(|| caps.name("dot"))
                .and_then(|m| m.as_str().chars().next());
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            OptionParts {
                label,
                text: line[end..].trim(),
            }
        }
        None => OptionParts {
            label: None,
            text: line,
        },
    }
}

/// One unit of grouper output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A maximal run of prose lines, joined with `\n`.
    Prose {
        text: String,
        /// Input line index of the run's first line.
        first_line: usize,
    },
    /// A single option line (trimmed, otherwise untouched).
    Option { text: String, line: usize },
}

impl Segment {
    pub fn class(&self) -> LineClass {
        match self {
            Segment::Prose { .. } => LineClass::Prose,
            Segment::Option { .. } => LineClass::Option,
        }
    }

    /// Input line index where the segment starts.
    pub fn start_line(&self) -> usize {
        match self {
            Segment::Prose { first_line, .. } => *first_line,
            Segment::Option { line, .. } => *line,
        }
    }
}

/// Accumulator threaded through [`group_lines`].
#[derive(Debug, Default)]
struct GroupState<'a> {
    segments: Vec<Segment>,
    prose: Vec<&'a str>,
    prose_start: usize,
    in_options: bool,
}

impl<'a> GroupState<'a> {
    fn step(mut self, index: usize, line: &'a str) -> Self {
        match classify(line) {
            LineClass::Option => {
                if !self.prose.is_empty() && !self.in_options {
                    self.flush_prose();
                }
                self.segments.push(Segment::Option {
                    text: line.to_string(),
                    line: index,
                });
                self.in_options = true;
            }
            LineClass::Prose => {
                if self.prose.is_empty() {
                    self.prose_start = index;
                }
                self.prose.push(line);
                self.in_options = false;
            }
        }
        self
    }

    fn flush_prose(&mut self) {
        let text = self.prose.join("\n").trim().to_string();
        self.segments.push(Segment::Prose {
            text,
            first_line: self.prose_start,
        });
        self.prose.clear();
    }

    fn finish(mut self) -> Vec<Segment> {
        if !self.prose.is_empty() {
            self.flush_prose();
        }
        self.segments
    }
}

/// Group raw lines into prose runs and option lines.
///
/// Lines are trimmed and blank lines dropped first. `line_offset` is added
/// to every recorded line index, so a chunk of a larger document reports
/// positions in the document's numbering.
pub fn group_lines<S: AsRef<str>>(lines: &[S], line_offset: usize) -> Vec<Segment> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| (i + line_offset, l.as_ref().trim()))
        .filter(|(_, l)| !l.is_empty())
        .fold(GroupState::default(), |state, (i, l)| state.step(i, l))
        .finish()
}
