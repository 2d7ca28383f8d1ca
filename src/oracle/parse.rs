//! Helpers for pulling structured JSON out of oracle text.

/// Extract the first top-level JSON object span from raw oracle output.
///
/// Models often wrap their JSON in prose or markdown fences; the span from
/// the first `{` to the last `}` is taken verbatim. Returns `None` when no
/// plausible span exists. Whether the span actually parses is the caller's
/// problem.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
