//! Recover a JSON object from free-form model output
//!
//! Models wrap their answer in prose, code fences, apologies and restated
//! summaries. The scanner below tries every `{` left to right, finds its
//! matching `}` with a depth counter that ignores braces inside string
//! literals, and returns the first span that parses as a JSON object.

use radlabel_domain::LabelRecord;
use serde_json::{Map, Value};
use std::ops::Range;
use tracing::debug;

/// Result of scanning a completion
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The first balanced span that parsed as a JSON object
    Found {
        /// Parsed object
        record: LabelRecord,
        /// Byte range of the object within the scanned text
        span: Range<usize>,
    },

    /// No candidate parsed; an expected outcome, not an error
    NotFound,
}

impl Extraction {
    /// The record, if one was found
    pub fn into_record(self) -> Option<LabelRecord> {
        match self {
            Extraction::Found { record, .. } => Some(record),
            Extraction::NotFound => None,
        }
    }

    /// Whether a record was found
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found { .. })
    }
}

/// Find the `}` matching the `{` at byte offset `start`
///
/// Braces inside double-quoted strings do not count, and a backslash escapes
/// the next byte inside a string. Returns `None` when `start` is not a `{` or
/// the brace never closes (including an unterminated string).
///
/// Works on bytes: every delimiter is ASCII, so spans always fall on UTF-8
/// boundaries.
pub fn balanced_span(text: &str, start: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Balanced spans for every `{` in the text, in order of their start
///
/// Spans may nest or overlap; a `{` whose brace never closes yields nothing.
pub fn candidate_spans(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_span(text, start))
}

/// Return the first candidate span that parses as a JSON object
///
/// Candidates that balance but fail to parse (trailing commas, unquoted
/// keys, single quotes) are skipped and scanning resumes at the next `{`
/// after the failed candidate's start.
pub fn extract_first_object(text: &str) -> Extraction {
    for span in candidate_spans(text) {
        match serde_json::from_str::<Map<String, Value>>(&text[span.clone()]) {
            Ok(object) => {
                return Extraction::Found {
                    record: object.into(),
                    span,
                };
            }
            Err(e) => {
                debug!(
                    "Skipping candidate at bytes {}..{}: {}",
                    span.start, span.end, e
                );
            }
        }
    }

    Extraction::NotFound
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_object() -> impl Strategy<Value = Map<String, Value>> {
        let scalar = prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
            Just(Value::Null),
        ];
        prop::collection::vec(("[a-z_{}\" ]{1,10}", scalar), 0..6)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        /// Property: an object embedded in brace-free prose comes back unchanged
        #[test]
        fn test_round_trip_in_prose(
            object in json_object(),
            before in "[^{}]{0,40}",
            after in "[^{}]{0,40}",
        ) {
            let text = format!("{}{}{}", before, Value::Object(object.clone()), after);
            let extracted = extract_first_object(&text).into_record();
            prop_assert_eq!(extracted.map(LabelRecord::into_map), Some(object));
        }

        /// Property: text without `{` never yields an object
        #[test]
        fn test_no_open_brace_never_found(text in "[^{]{0,200}") {
            prop_assert_eq!(extract_first_object(&text), Extraction::NotFound);
        }

        /// Property: the scanner never panics on arbitrary input
        #[test]
        fn test_arbitrary_input_never_panics(text in ".{0,200}") {
            let _ = extract_first_object(&text);
        }
    }
}
