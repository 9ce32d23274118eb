//! Helpers for free-text tag fields entered as comma separated input.

/// Split on `,` and trim every segment.
///
/// Empty segments are kept: `"A, B,"` yields `["A", "B", ""]` and an empty
/// input yields a single empty entry.
pub fn split_comma_list(input: &str) -> Vec<String> {
    input.split(',').map(|segment| segment.trim().to_string()).collect()
}

/// Like [`split_comma_list`], except that an empty input means "no entries".
pub fn split_optional_comma_list(input: &str) -> Vec<String> {
    if input.is_empty() {
        Vec::new()
    } else {
        split_comma_list(input)
    }
}

/// Inverse used to pre-populate edit forms.
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}
