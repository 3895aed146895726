//! JSON Repair Cascade
//!
//! Turns almost-JSON emitted by a model into a `serde_json::Value` by trying
//! progressively more invasive strategies. The first strategy that parses
//! wins and its tier decides the confidence. Malformed input never errors:
//! total failure is reported as `data: None` with the last parser message.

use crate::constants::{
    CONFIDENCE_ALTERNATIVE, CONFIDENCE_COMMON_MISTAKES, CONFIDENCE_CONTROL_ESCAPED,
    CONFIDENCE_NATIVE_FALLBACK, CONFIDENCE_STRICT,
};
use crate::scanner::{JsonScanner, QuoteStyle, ScanEvent};
use crate::types::RepairAttemptResult;
use serde_json::Value;
use tracing::debug;

const INVISIBLE_CHARS: &[char] = &['\u{feff}', '\u{fffe}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}'];

type Transform = fn(&str) -> String;

/// Ordered common-mistake fixes, applied cumulatively
const COMMON_FIXES: &[(&str, Transform)] = &[
    ("converted single-quoted strings to double quotes", convert_single_quotes),
    ("quoted bare object keys", quote_bare_keys),
    ("replaced Python literals", replace_python_literals),
    ("removed trailing commas", strip_trailing_commas),
    ("escaped control characters inside strings", escape_control_chars_in_strings),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericRepairCascade;

impl GenericRepairCascade {
    pub fn new() -> Self {
        Self
    }

    pub fn repair(&self, candidate: &str) -> RepairAttemptResult {
        let mut fixes = Vec::new();

        // 1. strict
        let mut last_error = match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return success(value, fixes, CONFIDENCE_STRICT, Vec::new()),
            Err(e) => e.to_string(),
        };

        // 2. literal control characters inside strings
        let escaped = escape_control_chars_in_strings(candidate);
        if escaped != candidate {
            fixes.push("escaped control characters inside strings".to_string());
            match serde_json::from_str::<Value>(&escaped) {
                Ok(value) => {
                    return success(value, fixes, CONFIDENCE_CONTROL_ESCAPED, Vec::new());
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        // 3. alternative preprocessing: the unescaped text with invisible
        // characters stripped, then every control character neutralized
        let normalized = strip_invisible(candidate);
        if normalized != candidate {
            fixes.push("stripped byte-order marks and invisible characters".to_string());
            match serde_json::from_str::<Value>(&normalized) {
                Ok(value) => return success(value, fixes, CONFIDENCE_ALTERNATIVE, Vec::new()),
                Err(e) => last_error = e.to_string(),
            }
        }
        let aggressive = escape_all_control_chars(&normalized);
        if aggressive != normalized {
            fixes.push("unicode-escaped all control characters".to_string());
            match serde_json::from_str::<Value>(&aggressive) {
                Ok(value) => return success(value, fixes, CONFIDENCE_ALTERNATIVE, Vec::new()),
                Err(e) => last_error = e.to_string(),
            }
        }

        // 4. common model mistakes, combined
        let mut text = normalized;
        for (description, transform) in COMMON_FIXES {
            let next = transform(&text);
            if next == text {
                continue;
            }
            fixes.push(description.to_string());
            text = next;
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    return success(value, fixes, CONFIDENCE_COMMON_MISTAKES, Vec::new());
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        // 5. one last native parse of the untouched input; anything after
        // the value, prose included, is a failure
        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(value) => success(value, fixes, CONFIDENCE_NATIVE_FALLBACK, Vec::new()),
            Err(_) => {
                debug!(
                    "[JSON-REPAIR] All strategies failed ({} chars): {}",
                    candidate.len(),
                    last_error
                );
                RepairAttemptResult::failed(fixes, last_error)
            }
        }
    }
}

fn success(
    value: Value,
    fixes_applied: Vec<String>,
    confidence: f64,
    warnings: Vec<String>,
) -> RepairAttemptResult {
    debug!(
        "[JSON-REPAIR] Parsed at confidence {} after {} fix(es)",
        confidence,
        fixes_applied.len()
    );
    RepairAttemptResult {
        data: Some(value),
        fixes_applied,
        confidence,
        warnings,
    }
}

/// For each char: is it part of a string literal (quotes included)?
fn string_mask(chars: &[char], style: QuoteStyle) -> Vec<bool> {
    let mut scanner = JsonScanner::new(style);
    chars
        .iter()
        .enumerate()
        .map(|(pos, &ch)| {
            !matches!(
                scanner.step(pos, ch),
                ScanEvent::Open | ScanEvent::Close | ScanEvent::Other
            )
        })
        .collect()
}

fn short_escape(ch: char) -> Option<&'static str> {
    match ch {
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        '\u{0c}' => Some("\\f"),
        '\u{08}' => Some("\\b"),
        _ => None,
    }
}

/// Replace literal newline/CR/tab/FF/BS inside double-quoted strings with
/// their escape sequences. Structural whitespace is left alone.
pub fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanner = JsonScanner::new(QuoteStyle::Double);
    for (idx, ch) in text.char_indices() {
        let event = scanner.step(idx, ch);
        match (event, short_escape(ch)) {
            (ScanEvent::InString, Some(esc)) => out.push_str(esc),
            _ => out.push(ch),
        }
    }
    out
}

/// Every control character (0x00-0x1F, 0x7F) inside a string becomes
/// `\uXXXX`; outside strings JSON whitespace survives and the rest is dropped.
pub fn escape_all_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanner = JsonScanner::new(QuoteStyle::Double);
    for (idx, ch) in text.char_indices() {
        let event = scanner.step(idx, ch);
        let is_control = ch.is_ascii_control();
        if !is_control {
            out.push(ch);
        } else if event == ScanEvent::InString {
            out.push_str(&format!("\\u{:04x}", ch as u32));
        } else if matches!(ch, '\n' | '\r' | '\t') {
            out.push(ch);
        }
    }
    out
}

fn strip_invisible(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .collect()
}

/// `'abc'` -> `"abc"`, escaping embedded double quotes and unescaping `\'`
pub fn convert_single_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            None => {
                if ch == '\'' {
                    quote = Some('\'');
                    out.push('"');
                } else {
                    if ch == '"' {
                        quote = Some('"');
                    }
                    out.push(ch);
                }
            }
            Some('"') => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else if ch == '"' {
                    quote = None;
                }
            }
            Some(_) => match ch {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                '\'' => {
                    quote = None;
                    out.push('"');
                }
                _ => out.push(ch),
            },
        }
    }
    out
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '-'
}

/// Walk identifiers outside strings, letting `rewrite` decide their text.
/// `rewrite` gets the identifier, the previous and the next significant chars.
fn rewrite_identifiers<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, Option<char>, Option<char>) -> Option<String>,
{
    let chars: Vec<char> = text.chars().collect();
    let mask = string_mask(&chars, QuoteStyle::Any);
    let mut out = String::with_capacity(text.len());
    let mut prev_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let starts_ident = !mask[i]
            && is_ident_start(ch)
            && (i == 0 || !is_ident_char(chars[i - 1]) || mask[i - 1]);
        if !starts_ident {
            if !ch.is_whitespace() {
                prev_significant = Some(ch);
            }
            out.push(ch);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && !mask[i] && is_ident_char(chars[i]) {
            i += 1;
        }
        let ident: String = chars[start..i].iter().collect();
        let next_significant = chars[i..].iter().copied().find(|c| !c.is_whitespace());
        match rewrite(&ident, prev_significant, next_significant) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&ident),
        }
        prev_significant = chars[i - 1].into();
    }
    out
}

/// `{key: 1}` -> `{"key": 1}`
pub fn quote_bare_keys(text: &str) -> String {
    rewrite_identifiers(text, |ident, prev, next| {
        let after_open = matches!(prev, Some('{') | Some(','));
        (after_open && next == Some(':')).then(|| format!("\"{}\"", ident))
    })
}

/// Bare `True`/`False`/`None` -> `true`/`false`/`null`
pub fn replace_python_literals(text: &str) -> String {
    rewrite_identifiers(text, |ident, _, next| {
        if next == Some(':') {
            return None;
        }
        match ident {
            "True" => Some("true".to_string()),
            "False" => Some("false".to_string()),
            "None" => Some("null".to_string()),
            _ => None,
        }
    })
}

/// Remove `,` directly before `}` or `]` (outside strings)
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mask = string_mask(&chars, QuoteStyle::Any);
    let mut out = String::with_capacity(text.len());

    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' && !mask[i] {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Close an open string, then any unclosed brackets and braces in nesting order
pub fn close_open_structures(json_str: &str) -> String {
    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return "{}".to_string();
    }

    let mut result = trimmed.to_string();
    let mut stack: Vec<char> = Vec::new();
    let mut scanner = JsonScanner::new(QuoteStyle::Double);

    for (idx, ch) in trimmed.char_indices() {
        match scanner.step(idx, ch) {
            ScanEvent::Open => stack.push('}'),
            ScanEvent::Close => {
                if stack.last() == Some(&'}') {
                    stack.pop();
                }
            }
            ScanEvent::Other if ch == '[' => stack.push(']'),
            ScanEvent::Other if ch == ']' => {
                if stack.last() == Some(&']') {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    if scanner.in_string() {
        result.push('"');
    }
    while let Some(closer) = stack.pop() {
        result.push(closer);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cascade() -> GenericRepairCascade {
        GenericRepairCascade::new()
    }

    #[test]
    fn test_strict_valid_is_idempotent() {
        let input = r#"{"tool":"write_file","path":"a.ts","content":"x"}"#;
        let result = cascade().repair(input);
        assert_eq!(result.data, Some(serde_json::from_str::<Value>(input).unwrap()));
        assert_eq!(result.confidence, 1.0);
        assert!(result.fixes_applied.is_empty());
    }

    #[test]
    fn test_literal_newlines_in_strings() {
        let input = "{\"tool\":\"write_file\",\n\"path\":\"a.ts\",\"content\":\"line1\nline2\ttab\"}";
        let result = cascade().repair(input);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.data.unwrap()["content"], "line1\nline2\ttab");
        assert_eq!(result.fixes_applied, vec!["escaped control characters inside strings"]);
    }

    #[test]
    fn test_other_control_chars_use_unicode_escapes() {
        let input = "{\"tool\":\"write_file\",\"content\":\"a\u{0001}b\"}";
        let result = cascade().repair(input);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.data.unwrap()["content"], "a\u{0001}b");
    }

    #[test]
    fn test_bom_is_stripped() {
        let input = "\u{feff}{\"tool\":\"delete_file\",\"path\":\"x.ts\"}";
        let result = cascade().repair(input);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.data.unwrap()["path"], "x.ts");
    }

    #[test]
    fn test_trailing_comma_and_single_quotes() {
        let result = cascade().repair("{'tool': 'delete_file', 'path': 'x.ts',}");
        assert_eq!(result.confidence, 0.8);
        assert_eq!(
            result.data,
            Some(json!({"tool": "delete_file", "path": "x.ts"}))
        );
        assert!(result
            .fixes_applied
            .contains(&"removed trailing commas".to_string()));
    }

    #[test]
    fn test_bare_keys_and_python_literals() {
        let result = cascade().repair("{tool: \"add_package\", name: \"zod\", isDev: True}");
        assert_eq!(result.confidence, 0.8);
        assert_eq!(
            result.data,
            Some(json!({"tool": "add_package", "name": "zod", "isDev": true}))
        );
    }

    #[test]
    fn test_text_after_the_value_is_a_failure() {
        let result = cascade().repair(r#"{"tool":"read_file","path":"a.ts"} and also delete everything"#);
        assert!(result.data.is_none());
        assert_eq!(result.confidence, 0.0);

        let two = cascade().repair("{\"tool\":\"delete_file\",\"path\":\"a.ts\"}\n{\"tool\":\"delete_file\",\"path\":\"b.ts\"}");
        assert!(two.data.is_none());
    }

    #[test]
    fn test_total_failure() {
        let result = cascade().repair("this is not json");
        assert!(result.data.is_none());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_convert_single_quotes_keeps_apostrophes_in_double_strings() {
        assert_eq!(
            convert_single_quotes(r#"{'a': "it's", 'b': 'say "hi"'}"#),
            r#"{"a": "it's", "b": "say \"hi\""}"#
        );
    }

    #[test]
    fn test_quote_bare_keys_ignores_strings() {
        assert_eq!(
            quote_bare_keys(r#"{a: "{b: 1}", c_d: 2}"#),
            r#"{"a": "{b: 1}", "c_d": 2}"#
        );
    }

    #[test]
    fn test_strip_trailing_commas_ignores_strings() {
        assert_eq!(
            strip_trailing_commas(r#"{"a": ",}", "b": [1, 2,],}"#),
            r#"{"a": ",}", "b": [1, 2]}"#
        );
    }

    #[test]
    fn test_python_literals_only_outside_strings() {
        assert_eq!(
            replace_python_literals(r#"{"a": None, "b": "None", "c": Nonesuch}"#),
            r#"{"a": null, "b": "None", "c": Nonesuch}"#
        );
    }

    #[test]
    fn test_close_open_structures() {
        let repaired = close_open_structures(r#"{"key": [1, {"a": "value"#);
        assert_eq!(repaired, r#"{"key": [1, {"a": "value"}]}"#);
        assert!(serde_json::from_str::<Value>(&repaired).is_ok());
        assert_eq!(close_open_structures("  "), "{}");
    }
}
