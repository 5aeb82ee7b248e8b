//! Pattern search over the host's client bundles.
//!
//! Bundles are minified and rotate often, so everything here is a best-effort
//! scan: a miss is a `None`, never an error.

use lazy_static::lazy_static;
use regex::Regex;

use crate::consts::{FEATURE_MARKER, QUERY_ID_WINDOW, TWEET_RESULT_OPERATION};

lazy_static! {
    static ref QUERY_ID: Regex = Regex::new(&format!(
        r#"queryId:"([^"]+)"[^}}]{{0,{window}}}operationName:"{name}""#,
        window = QUERY_ID_WINDOW,
        name = regex::escape(TWEET_RESULT_OPERATION),
    ))
    .unwrap();
}

/// Hash of the single tweet lookup operation, from a descriptor like
/// `{queryId:"abc",operationName:"TweetResultByRestId",...}`.
pub fn find_query_id(source: &str) -> Option<String> {
    QUERY_ID.captures(source).map(|c| c[1].to_string())
}

/// The first object literal around the feature marker that is valid JSON, verbatim.
pub fn find_feature_object(source: &str) -> Option<String> {
    source
        .match_indices(FEATURE_MARKER)
        .filter_map(|(at, _)| enclosing_object(source, at))
        .find(|candidate| is_json_object(candidate))
        .map(|candidate| candidate.to_string())
}

/// The smallest object literal that is still open at `at`, from its `{` up to and
/// including the matching `}`. Sibling objects that close before `at` are skipped.
fn enclosing_object(source: &str, at: usize) -> Option<&str> {
    let mut before = at;
    while let Some(start) = source[..before].rfind('{') {
        match matching_brace(source, start) {
            Some(end) if end > at => return Some(&source[start..=end]),
            _ => before = start,
        }
    }
    None
}

/// Index of the `}` closing the `{` at `start`, skipping quoted strings.
fn matching_brace(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (offset, byte) in source.as_bytes()[start..].iter().enumerate() {
        if let Some(q) = quote {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b if *b == q => quote = None,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' | b'\'' => quote = Some(*byte),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_json_object(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(candidate).is_ok()
}
