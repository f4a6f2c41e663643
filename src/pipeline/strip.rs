//! Question-number stripping for stem lines.
//!
//! Source material numbers its questions in every style imaginable:
//! `Q.1`, `Q1.`, `Q1)`, `1.`, `1)` or a bare `12`. The decoration (and the
//! whitespace after it) is removed from the start of each stem line
//! independently, so a multi-line stem keeps its inner lines intact unless
//! they too start with a number.
//!
//! A bare number is only taken as numbering in the leading position. After
//! that, further decorations are stripped only when they are unambiguous
//! (`Q`-prefixed or punctuated), so `1. 2020 was a leap year` keeps its
//! year.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_QUESTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Q\.?\d+[.)]?|\d+[.)]?)\s*").unwrap());

/// Numbering that cannot be the start of the question text itself.
static RE_DECORATED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Q\.?\d+[.)]?|\d+[.)])(?:\s+|$)").unwrap());

/// Remove leading question-number decorations from one line.
///
/// The first decoration may be a bare number (`12 What?`); any following
/// ones must be decorated, so `"1. 2) text"` becomes `"text"` while
/// `"1. 2020 was"` becomes `"2020 was"`. Stripping an already stripped line
/// is a no-op unless the line now starts with a bare number.
pub fn strip_question_number(line: &str) -> &str {
    let line = line.trim_start();
    let Some(m) = RE_QUESTION_NUMBER.find(line) else {
        return line;
    };
    let mut rest = &line[m.end()..];
    while let Some(m) = RE_DECORATED_NUMBER.find(rest) {
        rest = &rest[m.end()..];
    }
    rest
}

/// Strip every line of a (possibly multi-line) stem and re-join it.
pub fn strip_stem(stem: &str) -> String {
    stem.lines()
        .map(strip_question_number)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_numbering_styles() {
        assert_eq!(strip_question_number("Q.1 What?"), "What?");
        assert_eq!(strip_question_number("Q1. What?"), "What?");
        assert_eq!(strip_question_number("Q1) What?"), "What?");
        assert_eq!(strip_question_number("1. What?"), "What?");
        assert_eq!(strip_question_number("12) What?"), "What?");
        assert_eq!(strip_question_number("3 What?"), "What?");
    }

    #[test]
    fn leaves_unnumbered_lines_alone() {
        assert_eq!(strip_question_number("What is 2+2?"), "What is 2+2?");
        assert_eq!(strip_question_number("Quick: name a prime"), "Quick: name a prime");
    }

    #[test]
    fn number_only_line_becomes_empty() {
        assert_eq!(strip_question_number("7."), "");
    }

    #[test]
    fn stripping_is_idempotent() {
        for line in ["1. 2) nested", "Q.3 Q4. twice", "plain", "42", "7) Q8) 9. deep"] {
            let once = strip_question_number(line);
            assert_eq!(strip_question_number(once), once, "{line}");
        }
    }

    #[test]
    fn number_inside_question_text_survives() {
        assert_eq!(
            strip_question_number("1. 2020 was a leap year. True?"),
            "2020 was a leap year. True?"
        );
        assert_eq!(strip_question_number("Q3) 100 meters in cm?"), "100 meters in cm?");
        assert_eq!(strip_stem("1. 2020 was a leap year. True?"), "2020 was a leap year. True?");
    }

    #[test]
    fn strip_stem_applies_per_line() {
        let stem = "1. Consider the list\n2) numbered twice\nthen answer";
        assert_eq!(
            strip_stem(stem),
            "Consider the list\nnumbered twice\nthen answer"
        );
        assert_eq!(strip_stem(&strip_stem(stem)), strip_stem(stem));
    }
}
