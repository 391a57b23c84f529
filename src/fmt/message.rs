//! Message localization and `{N}` parameter substitution.

use crate::record::LogRecord;
use regex::Regex;
use std::sync::LazyLock;

static PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("Invalid parameter regex"));

/// Looks the message up in the record's bundle, then substitutes parameters.
///
/// Substitution only happens when the text contains one of the markers `{0`..`{3`, so
/// messages that merely contain braces stay untouched. Indices without a parameter are
/// left as written.
#[must_use]
pub fn format_message(record: &LogRecord) -> String {
    let Some(raw) = record.message() else {
        return String::new();
    };

    let text = record
        .resource_bundle()
        .and_then(|bundle| bundle.get(raw))
        .unwrap_or(raw);

    match record.parameters() {
        Some(params) if !params.is_empty() && has_marker(text) => substitute(text, params),
        _ => text.to_string(),
    }
}

fn has_marker(text: &str) -> bool {
    ["{0", "{1", "{2", "{3"].iter().any(|m| text.contains(m))
}

/// Replaces `{N}` with `params[N]`.
#[must_use]
pub fn substitute(text: &str, params: &[String]) -> String {
    PARAM_REGEX
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| params.get(i))
                .map_or_else(|| caps[0].to_string(), Clone::clone)
        })
        .into_owned()
}
