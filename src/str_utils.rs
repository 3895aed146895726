/// Safely returns a prefix of the string with at most `max_chars` characters.
/// This respects UTF-8 character boundaries.
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Safely slices a string using byte offsets if they fall on character boundaries.
/// Returns None if the offsets are invalid or not on boundaries.
pub fn slice_bytes_safe(s: &str, start: usize, end: usize) -> Option<&str> {
    if start <= end && end <= s.len() && s.is_char_boundary(start) && s.is_char_boundary(end) {
        Some(&s[start..end])
    } else {
        None
    }
}

/// Single-line preview of a block for log lines.
pub fn preview(s: &str, max_chars: usize) -> String {
    let head = prefix_chars(s, max_chars).replace(['\n', '\r'], " ");
    if head.len() < s.len() {
        format!("{}...", head)
    } else {
        head
    }
}
