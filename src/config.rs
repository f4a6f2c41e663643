//! Configuration types for MCQ parsing and slot filling.
//!
//! All parsing behaviour is controlled through [`ParseConfig`], built via
//! its [`ParseConfigBuilder`]. Every knob lives in one struct so a config
//! can be shared across concurrent file parses and logged as a whole.

use crate::error::McqError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for parsing MCQ text.
///
/// Built via [`ParseConfig::builder()`] or using [`ParseConfig::default()`].
///
/// # Example
/// ```rust
/// use mcq2slots::{MarkerPolicy, ParseConfig, TemplateSize};
///
/// let config = ParseConfig::builder()
///     .marker('*')
///     .marker_policy(MarkerPolicy::Strip)
///     .template_size(TemplateSize::T50)
///     .build()
///     .unwrap();
/// assert_eq!(config.effective_max_records(), Some(50));
/// ```
#[derive(Clone)]
pub struct ParseConfig {
    /// In-band character flagging the correct option. Default: `@`.
    pub marker: char,

    /// Whether the marker is kept in emitted option text. Default: [`MarkerPolicy::Keep`].
    pub marker_policy: MarkerPolicy,

    /// Maximum number of records to emit. `None` means unbounded. Default: None.
    ///
    /// Blocks past the limit are left unconsumed and counted in
    /// [`crate::output::ParseResult::unconsumed_blocks`].
    pub max_records: Option<usize>,

    /// Split the input on `---name---` delimiter lines first. Default: false.
    pub chunk_mode: bool,

    /// Prefix for positional names of unnamed chunks (`<prefix>_<n>`). Default: `output`.
    pub default_chunk_prefix: String,

    /// Number of files parsed concurrently by [`crate::parse::process_files`]. Default: 4.
    pub concurrency: usize,

    /// Template whose slot count caps the number of records. Default: None.
    pub template_size: Option<TemplateSize>,

    /// Optional per-chunk progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            marker: '@',
            marker_policy: MarkerPolicy::default(),
            max_records: None,
            chunk_mode: false,
            default_chunk_prefix: "output".to_string(),
            concurrency: 4,
            template_size: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("marker", &self.marker)
            .field("marker_policy", &self.marker_policy)
            .field("max_records", &self.max_records)
            .field("chunk_mode", &self.chunk_mode)
            .field("default_chunk_prefix", &self.default_chunk_prefix)
            .field("concurrency", &self.concurrency)
            .field("template_size", &self.template_size)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ParseProgressCallback>"),
            )
            .finish()
    }
}

impl ParseConfig {
    /// Create a new builder for `ParseConfig`.
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder {
            config: Self::default(),
        }
    }

    /// The record limit actually applied: the smaller of `max_records` and
    /// the template's slot count, when either is set.
    pub fn effective_max_records(&self) -> Option<usize> {
        let slots = self.template_size.map(TemplateSize::slots);
        match (self.max_records, slots) {
            (Some(m), Some(s)) => Some(m.min(s)),
            (m, s) => m.or(s),
        }
    }

    /// Positional default name for the `n`-th chunk (1-indexed).
    pub fn default_chunk_name(&self, n: usize) -> String {
        format!("{}_{}", self.default_chunk_prefix, n)
    }
}

/// Builder for [`ParseConfig`].
#[derive(Debug)]
pub struct ParseConfigBuilder {
    config: ParseConfig,
}

impl ParseConfigBuilder {
    pub fn marker(mut self, marker: char) -> Self {
        self.config.marker = marker;
        self
    }

    pub fn marker_policy(mut self, policy: MarkerPolicy) -> Self {
        self.config.marker_policy = policy;
        self
    }

    pub fn max_records(mut self, n: usize) -> Self {
        self.config.max_records = Some(n);
        self
    }

    pub fn chunk_mode(mut self, v: bool) -> Self {
        self.config.chunk_mode = v;
        self
    }

    pub fn default_chunk_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.default_chunk_prefix = prefix.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn template_size(mut self, size: TemplateSize) -> Self {
        self.config.template_size = Some(size);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParseConfig, McqError> {
        let c = &self.config;
        if c.marker.is_whitespace() || c.marker.is_alphanumeric() {
            return Err(McqError::InvalidConfig(format!(
                "Answer marker must be a symbol, got {:?}",
                c.marker
            )));
        }
        // These characters are part of every option label, so they would mark all options.
        if matches!(c.marker, '(' | ')' | '[' | ']' | '.') {
            return Err(McqError::InvalidConfig(format!(
                "Answer marker {:?} collides with option label syntax",
                c.marker
            )));
        }
        if c.concurrency == 0 {
            return Err(McqError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.default_chunk_prefix.trim().is_empty() {
            return Err(McqError::InvalidConfig(
                "Default chunk prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do with the answer marker in emitted option text.
///
/// Plain-text sources disagree on whether the marker belongs to the answer
/// text, so both behaviours are available. `Keep` reproduces the text
/// exactly as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Leave the marker in the option text (default).
    #[default]
    Keep,
    /// Remove every marker occurrence and re-trim the text.
    Strip,
}

/// Fixed-size document templates, named by how many question slots they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSize {
    #[serde(rename = "25")]
    T25,
    #[serde(rename = "50")]
    T50,
    #[serde(rename = "100")]
    T100,
    #[serde(rename = "125")]
    T125,
    #[serde(rename = "150")]
    T150,
    #[serde(rename = "200")]
    T200,
}

impl TemplateSize {
    pub const ALL: [TemplateSize; 6] = [
        TemplateSize::T25,
        TemplateSize::T50,
        TemplateSize::T100,
        TemplateSize::T125,
        TemplateSize::T150,
        TemplateSize::T200,
    ];

    /// Number of question slots in the template.
    pub fn slots(self) -> usize {
        match self {
            TemplateSize::T25 => 25,
            TemplateSize::T50 => 50,
            TemplateSize::T100 => 100,
            TemplateSize::T125 => 125,
            TemplateSize::T150 => 150,
            TemplateSize::T200 => 200,
        }
    }

    /// Look up a template by its slot count.
    pub fn from_slots(n: usize) -> Result<Self, McqError> {
        Self::ALL
            .into_iter()
            .find(|t| t.slots() == n)
            .ok_or_else(|| {
                McqError::InvalidConfig(format!(
                    "Unknown template size {n}; expected one of 25, 50, 100, 125, 150, 200"
                ))
            })
    }
}

impl fmt::Display for TemplateSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slots())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_and_keep_marker() {
        let c = ParseConfig::default();
        assert_eq!(c.marker, '@');
        assert_eq!(c.marker_policy, MarkerPolicy::Keep);
        assert_eq!(c.effective_max_records(), None);
        assert!(!c.chunk_mode);
    }

    #[test]
    fn effective_limit_takes_smaller_bound() {
        let c = ParseConfig::builder()
            .max_records(10)
            .template_size(TemplateSize::T25)
            .build()
            .unwrap();
        assert_eq!(c.effective_max_records(), Some(10));

        let c = ParseConfig::builder()
            .max_records(300)
            .template_size(TemplateSize::T125)
            .build()
            .unwrap();
        assert_eq!(c.effective_max_records(), Some(125));
    }

    #[test]
    fn whitespace_marker_rejected() {
        let err = ParseConfig::builder().marker(' ').build().unwrap_err();
        assert!(matches!(err, McqError::InvalidConfig(_)));
    }

    #[test]
    fn label_syntax_marker_rejected() {
        for m in ['(', ']', '.', 'x', '7'] {
            assert!(ParseConfig::builder().marker(m).build().is_err(), "{m}");
        }
        assert!(ParseConfig::builder().marker('✓').build().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        assert!(ParseConfig::builder().concurrency(0).build().is_err());
    }

    #[test]
    fn template_size_lookup() {
        assert_eq!(TemplateSize::from_slots(150).unwrap(), TemplateSize::T150);
        assert!(TemplateSize::from_slots(75).is_err());
        assert_eq!(TemplateSize::T200.to_string(), "200");
    }

    #[test]
    fn template_size_serialises_as_slot_count() {
        let json = serde_json::to_string(&TemplateSize::T100).unwrap();
        assert_eq!(json, "\"100\"");
    }

    #[test]
    fn default_chunk_names_are_positional() {
        let c = ParseConfig::default();
        assert_eq!(c.default_chunk_name(1), "output_1");
        let c = ParseConfig::builder()
            .default_chunk_prefix("quiz")
            .build()
            .unwrap();
        assert_eq!(c.default_chunk_name(3), "quiz_3");
    }
}
