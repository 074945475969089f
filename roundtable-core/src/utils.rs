// roundtable-core/src/utils.rs
//! Small helpers shared across the crate.

/// Bounds a string for trace logging, appending an ellipsis when cut.
/// Counts characters, not bytes, so multi-byte content stays intact.
pub fn preview(input: &str, max_chars: usize) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
