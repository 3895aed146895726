//! In-string / escape / brace-depth tracking shared by the locator, the repair
//! cascade and the reconstructor.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Only `"` opens a string (strict JSON)
    Double,
    /// `"` or `'` opens a string, closed by the same character
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    StringStart,
    StringEnd,
    /// A char inside a string, including escape backslashes
    InString,
    Open,
    Close,
    Other,
}

#[derive(Debug, Clone)]
pub struct JsonScanner {
    style: QuoteStyle,
    quote: Option<char>,
    escape_next: bool,
    depth: i64,
    string_start: Option<usize>,
}

impl JsonScanner {
    pub fn new(style: QuoteStyle) -> Self {
        Self {
            style,
            quote: None,
            escape_next: false,
            depth: 0,
            string_start: None,
        }
    }

    pub fn in_string(&self) -> bool {
        self.quote.is_some()
    }

    pub fn depth(&self) -> i64 {
        self.depth
    }

    /// Byte offset of the quote that opened the current string
    pub fn string_start(&self) -> Option<usize> {
        self.string_start
    }

    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    fn opens_string(&self, ch: char) -> bool {
        match self.style {
            QuoteStyle::Double => ch == '"',
            QuoteStyle::Any => ch == '"' || ch == '\'',
        }
    }

    /// Advance over `ch` located at byte offset `idx`.
    pub fn step(&mut self, idx: usize, ch: char) -> ScanEvent {
        if let Some(q) = self.quote {
            if self.escape_next {
                self.escape_next = false;
                return ScanEvent::InString;
            }
            if ch == '\\' {
                self.escape_next = true;
                return ScanEvent::InString;
            }
            if ch == q {
                self.quote = None;
                self.string_start = None;
                return ScanEvent::StringEnd;
            }
            return ScanEvent::InString;
        }

        match ch {
            c if self.opens_string(c) => {
                self.quote = Some(c);
                self.string_start = Some(idx);
                ScanEvent::StringStart
            }
            '{' => {
                self.depth += 1;
                ScanEvent::Open
            }
            '}' => {
                self.depth -= 1;
                ScanEvent::Close
            }
            _ => ScanEvent::Other,
        }
    }
}

/// Byte offset one past the `}` that balances the `{` at `start`, or `None`
/// if the text ends first.
pub fn find_balanced_end(text: &str, start: usize, style: QuoteStyle) -> Option<usize> {
    if !text[start..].starts_with('{') {
        return None;
    }
    let mut scanner = JsonScanner::new(style);
    for (offset, ch) in text[start..].char_indices() {
        let idx = start + offset;
        if scanner.step(idx, ch) == ScanEvent::Close && scanner.depth() == 0 {
            return Some(idx + 1);
        }
    }
    None
}

/// Detects if a JSON string is complete (balanced braces/brackets, no open string)
pub fn is_json_complete(json_str: &str) -> bool {
    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return false;
    }

    let mut scanner = JsonScanner::new(QuoteStyle::Double);
    let mut bracket_count = 0i64;
    for (idx, ch) in trimmed.char_indices() {
        let event = scanner.step(idx, ch);
        if event == ScanEvent::Other {
            match ch {
                '[' => bracket_count += 1,
                ']' => bracket_count -= 1,
                _ => {}
            }
        }
        if scanner.depth() < 0 || bracket_count < 0 {
            return false;
        }
    }

    !scanner.in_string() && scanner.depth() == 0 && bracket_count == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_end_skips_braces_in_strings() {
        let text = r#"xx {"content": "if (x) { y() }"} tail"#;
        let end = find_balanced_end(text, 3, QuoteStyle::Any).unwrap();
        assert_eq!(&text[3..end], r#"{"content": "if (x) { y() }"}"#);
    }

    #[test]
    fn test_balanced_end_unclosed() {
        assert_eq!(find_balanced_end(r#"{"a": {"b": 1}"#, 0, QuoteStyle::Any), None);
    }

    #[test]
    fn test_apostrophe_inside_double_quotes_does_not_open_string() {
        let text = r#"{"content": "it's fine"}"#;
        assert_eq!(find_balanced_end(text, 0, QuoteStyle::Any), Some(text.len()));
    }

    #[test]
    fn test_escaped_quote_stays_in_string() {
        let text = r#"{"a": "say \"}\" now"}"#;
        assert_eq!(find_balanced_end(text, 0, QuoteStyle::Double), Some(text.len()));
    }

    #[test]
    fn test_string_start_tracking() {
        let mut scanner = JsonScanner::new(QuoteStyle::Double);
        for (i, ch) in r#"{"ab"#.char_indices() {
            scanner.step(i, ch);
        }
        assert!(scanner.in_string());
        assert_eq!(scanner.string_start(), Some(1));
    }

    #[test]
    fn test_is_json_complete() {
        assert!(is_json_complete("{}"));
        assert!(is_json_complete(r#"{"key": [1, 2]}"#));
        assert!(!is_json_complete("{"));
        assert!(!is_json_complete(r#"{"key": "value"#));
        assert!(!is_json_complete(r#"[1, 2, 3"#));
        assert!(is_json_complete(r#"{"key": "val\"ue"}"#));
    }
}
