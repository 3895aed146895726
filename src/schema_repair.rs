//! Schema-aware reconstruction
//!
//! Last resort for candidates the repair cascade cannot parse. The tool name
//! is pulled out with a tolerant pattern, key/value pairs are tokenized out of
//! the damaged text, and a fresh object is assembled from the tool's schema.
//! Required fields that cannot be found are inferred and listed under
//! `_inferredFields` so the executor can treat them with suspicion.

use crate::constants::{
    CODE_MARKERS, CONFIDENCE_RECONSTRUCTED, CONTENT_LIKE_FIELDS, INFERRED_FIELDS_KEY,
    PATH_LIKE_FIELDS, SOURCE_FILE_EXTENSIONS,
};
use crate::json_repair::{close_open_structures, GenericRepairCascade};
use crate::scanner::{find_balanced_end, is_json_complete, JsonScanner, QuoteStyle, ScanEvent};
use crate::tool_schema::{FieldType, ToolSchema, ToolSchemaRegistry};
use crate::types::RepairAttemptResult;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

lazy_static! {
    static ref TOOL_NAME_REGEX: Regex =
        Regex::new(r#"(?:"tool"|'tool')\s*:\s*(?:"([^"]+)"|'([^']+)')"#)
            .expect("Invalid tool name regex");
    static ref FENCE_OPEN_REGEX: Regex =
        Regex::new(r"^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("Invalid fence regex");
    static ref FENCE_CLOSE_REGEX: Regex = Regex::new(r"\s*```\s*$").expect("Invalid fence regex");
    static ref PATH_TOKEN_REGEX: Regex =
        Regex::new(r"[A-Za-z0-9_@~./-]+\.[A-Za-z0-9]{1,6}").expect("Invalid path regex");
}

/// Synthesized JSON for a damaged candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub tool: String,
    pub json: String,
    pub inferred_fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SchemaAwareReconstructor {
    cascade: GenericRepairCascade,
    registry: Arc<ToolSchemaRegistry>,
}

impl SchemaAwareReconstructor {
    pub fn new(cascade: GenericRepairCascade, registry: Arc<ToolSchemaRegistry>) -> Self {
        Self { cascade, registry }
    }

    /// Synthesized JSON text, or `None` when the candidate is irrecoverable.
    pub fn reconstruct(&self, candidate: &str) -> Option<String> {
        self.reconstruct_detailed(candidate).map(|r| r.json)
    }

    pub fn reconstruct_detailed(&self, candidate: &str) -> Option<Reconstruction> {
        match catch_unwind(AssertUnwindSafe(|| self.try_reconstruct(candidate))) {
            Ok(result) => result,
            Err(_) => {
                warn!("[SCHEMA-REPAIR] Reconstruction panicked; treating candidate as irrecoverable");
                None
            }
        }
    }

    /// Reconstruct, then run the synthesized text back through the cascade.
    /// Confidence is capped at the reconstruction tier.
    pub fn repair(&self, candidate: &str) -> Option<RepairAttemptResult> {
        let reconstruction = self.reconstruct_detailed(candidate)?;
        let mut result = self.cascade.repair(&reconstruction.json);
        if !result.is_success() {
            return None;
        }
        result
            .fixes_applied
            .insert(0, "schema-aware reconstruction".to_string());
        result.confidence = result.confidence.min(CONFIDENCE_RECONSTRUCTED);
        result.warnings.extend(
            reconstruction
                .inferred_fields
                .iter()
                .map(|f| format!("inferred required field '{}'", f)),
        );
        Some(result)
    }

    fn try_reconstruct(&self, candidate: &str) -> Option<Reconstruction> {
        let caps = TOOL_NAME_REGEX.captures(candidate)?;
        let tool = caps.get(1).or_else(|| caps.get(2))?.as_str().to_string();
        let Some(schema) = self.registry.get(&tool) else {
            debug!("[SCHEMA-REPAIR] Unknown tool '{}', not reconstructing", tool);
            return None;
        };

        let unfenced = unfence(candidate);
        if has_stray_text(&unfenced) {
            debug!(
                "[SCHEMA-REPAIR] Text outside the '{}' object, not reconstructing",
                tool
            );
            return None;
        }

        let normalized = normalize(&unfenced);
        let pairs = extract_pairs(&normalized, &self.cascade);
        let (object, inferred_fields) = assemble(schema, &pairs, &normalized);
        let json = serde_json::to_string(&Value::Object(object)).ok()?;

        debug!(
            "[SCHEMA-REPAIR] Rebuilt '{}' from {} pair(s), inferred {:?}",
            tool,
            pairs.len(),
            inferred_fields
        );
        Some(Reconstruction {
            tool,
            json,
            inferred_fields,
        })
    }
}

fn unfence(candidate: &str) -> String {
    let unfenced = FENCE_OPEN_REGEX.replace(candidate, "");
    FENCE_CLOSE_REGEX.replace(&unfenced, "").trim().to_string()
}

/// Prose before the object, or a second value or prose after it closes.
/// Text after an early close that ends in `}` without opening anything new
/// is the rest of a damaged object, not stray.
fn has_stray_text(unfenced: &str) -> bool {
    if !unfenced.starts_with('{') {
        return true;
    }
    match find_balanced_end(unfenced, 0, QuoteStyle::Any) {
        Some(end) => {
            let rest = unfenced[end..].trim();
            !rest.is_empty() && (rest.contains('{') || !rest.ends_with('}'))
        }
        None => false,
    }
}

/// Close a dangling string and open structures, and flatten newlines that
/// sit outside strings.
fn normalize(unfenced: &str) -> String {
    let mut text = close_unclosed_string(unfenced);
    if !is_json_complete(&text) {
        text = close_open_structures(&text);
    }
    collapse_structural_newlines(&text).trim().to_string()
}

/// If the text ends inside a string, close it at the next `}`, `]` or `,`
/// after the opening quote, or at the end of the text.
pub fn close_unclosed_string(text: &str) -> String {
    let mut scanner = JsonScanner::new(QuoteStyle::Any);
    for (idx, ch) in text.char_indices() {
        scanner.step(idx, ch);
    }
    let (Some(start), Some(quote)) = (scanner.string_start(), scanner.quote()) else {
        return text.to_string();
    };

    let body_start = start + quote.len_utf8();
    let insert_at = text[body_start..]
        .find(['}', ']', ','])
        .map(|rel| body_start + rel)
        .unwrap_or(text.len());

    let mut fixed = String::with_capacity(text.len() + 1);
    fixed.push_str(&text[..insert_at]);
    fixed.push(quote);
    fixed.push_str(&text[insert_at..]);
    fixed
}

fn collapse_structural_newlines(text: &str) -> String {
    let mut scanner = JsonScanner::new(QuoteStyle::Any);
    text.char_indices()
        .map(|(idx, ch)| {
            let event = scanner.step(idx, ch);
            if event != ScanEvent::InString && matches!(ch, '\n' | '\r') {
                ' '
            } else {
                ch
            }
        })
        .collect()
}

fn skip_ws(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '-'
}

/// Does a quote right before `i` end the string? It does when it is followed
/// by the end of the object or by `, <key>:`.
fn quote_closes_string(chars: &[char], i: usize) -> bool {
    let i = skip_ws(chars, i);
    let Some(&ch) = chars.get(i) else {
        return true;
    };
    match ch {
        '}' | ']' => true,
        ',' => {
            let j = skip_ws(chars, i + 1);
            match chars.get(j) {
                None | Some('}') | Some(']') => true,
                Some(&q) if q == '"' || q == '\'' => {
                    let mut k = j + 1;
                    while k < chars.len() && chars[k] != q {
                        if !is_key_char(chars[k]) {
                            return false;
                        }
                        k += 1;
                    }
                    chars.get(skip_ws(chars, k + 1)) == Some(&':')
                }
                Some(&c) if is_key_char(c) => {
                    let mut k = j;
                    while k < chars.len() && is_key_char(chars[k]) {
                        k += 1;
                    }
                    chars.get(skip_ws(chars, k)) == Some(&':')
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Read a string whose opening quote is at `i`. Unescaped quotes that do not
/// end the value are kept as content; if the text runs out, the value ends at
/// the last such quote instead. Returns the body in JSON-escaped form.
fn read_tolerant_string(chars: &[char], i: usize) -> (String, usize) {
    let quote = chars[i];
    let mut body = String::new();
    let mut last_rejected: Option<(usize, usize)> = None;
    let mut j = i + 1;

    while j < chars.len() {
        let ch = chars[j];
        if ch == '\\' {
            match chars.get(j + 1) {
                Some('\'') => body.push('\''),
                Some(&next) => {
                    body.push('\\');
                    body.push(next);
                }
                None => body.push_str("\\\\"),
            }
            j += 2;
            continue;
        }
        if ch == quote {
            if quote_closes_string(chars, j + 1) {
                return (body, j + 1);
            }
            last_rejected = Some((body.len(), j));
        }
        if ch == '"' {
            body.push_str("\\\"");
        } else {
            body.push(ch);
        }
        j += 1;
    }

    match last_rejected {
        Some((len, at)) => {
            body.truncate(len);
            (body, at + 1)
        }
        None => (body, chars.len()),
    }
}

/// Decode a JSON-escaped body, escaping control characters first and
/// doubling backslashes that do not start a valid escape.
fn decode_string_body(body: &str) -> String {
    let escaped = escape_body_controls(body);
    if let Ok(s) = serde_json::from_str::<String>(&format!("\"{}\"", escaped)) {
        return s;
    }
    let sanitized = double_invalid_backslashes(&escaped);
    serde_json::from_str::<String>(&format!("\"{}\"", sanitized)).unwrap_or_else(|_| body.to_string())
}

fn escape_body_controls(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for ch in body.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn double_invalid_backslashes(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            let valid = match chars.get(i + 1) {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => true,
                Some('u') => chars.len() >= i + 6 && chars[i + 2..i + 6].iter().all(|c| c.is_ascii_hexdigit()),
                _ => false,
            };
            if valid {
                out.push(chars[i]);
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            out.push_str("\\\\");
            i += 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// End (exclusive) of the `{...}` or `[...]` starting at `i`, or the end of text
fn nested_end(chars: &[char], i: usize) -> usize {
    let mut scanner = JsonScanner::new(QuoteStyle::Any);
    let mut depth = 0i64;
    for (j, &ch) in chars.iter().enumerate().skip(i) {
        match scanner.step(j, ch) {
            ScanEvent::Open => depth += 1,
            ScanEvent::Close => depth -= 1,
            ScanEvent::Other if ch == '[' => depth += 1,
            ScanEvent::Other if ch == ']' => depth -= 1,
            _ => continue,
        }
        if depth == 0 {
            return j + 1;
        }
    }
    chars.len()
}

fn parse_scalar(raw: &str) -> Value {
    match raw {
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        "None" | "undefined" => Value::Null,
        _ => serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

/// Tolerantly tokenize the top-level `key: value` pairs of a damaged object.
pub fn extract_pairs(text: &str, cascade: &GenericRepairCascade) -> Vec<(String, Value)> {
    let chars: Vec<char> = text.chars().collect();
    let mut pairs = Vec::new();
    let mut i = match chars.iter().position(|&c| c == '{') {
        Some(open) => open + 1,
        None => 0,
    };

    while i < chars.len() {
        i = skip_ws(chars.as_slice(), i);
        let Some(&ch) = chars.get(i) else { break };
        if ch == ',' {
            i += 1;
            continue;
        }
        if ch == '}' {
            break;
        }

        let key = if ch == '"' || ch == '\'' {
            let end = chars[i + 1..]
                .iter()
                .position(|&c| c == ch)
                .map(|rel| i + 1 + rel)
                .unwrap_or(chars.len());
            let key: String = chars[i + 1..end].iter().collect();
            i = end + 1;
            key
        } else if is_key_char(ch) {
            let start = i;
            while i < chars.len() && is_key_char(chars[i]) {
                i += 1;
            }
            chars[start..i].iter().collect()
        } else {
            i += 1;
            continue;
        };

        i = skip_ws(&chars, i);
        if chars.get(i) != Some(&':') {
            continue;
        }
        i = skip_ws(&chars, i + 1);
        let Some(&first) = chars.get(i) else { break };

        let value = match first {
            '"' | '\'' => {
                let (body, next) = read_tolerant_string(&chars, i);
                i = next;
                Value::String(decode_string_body(&body))
            }
            '{' | '[' => {
                let end = nested_end(&chars, i);
                let raw: String = chars[i..end].iter().collect();
                i = end;
                cascade.repair(&raw).data.unwrap_or(Value::String(raw))
            }
            _ => {
                let start = i;
                while i < chars.len() && !matches!(chars[i], ',' | '}' | ']') {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().collect();
                parse_scalar(raw.trim())
            }
        };

        if !key.is_empty() {
            pairs.push((key, value));
        }
    }

    pairs
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce string-typed scalars to the declared type when they parse cleanly
fn coerce(value: Value, ty: Option<FieldType>) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let trimmed = s.trim();
    match ty {
        Some(FieldType::Boolean) => match trimmed {
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            _ => value,
        },
        Some(FieldType::Number) => {
            if let Ok(n) = trimmed.parse::<i64>() {
                Value::Number(n.into())
            } else if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
                Value::Number(n)
            } else {
                value
            }
        }
        Some(FieldType::Array) | Some(FieldType::Object) => match serde_json::from_str::<Value>(trimmed) {
            Ok(parsed) if ty.is_some_and(|t| t.matches(&parsed)) => parsed,
            _ => value,
        },
        _ => value,
    }
}

fn has_source_extension(s: &str) -> bool {
    let lower = s.to_lowercase();
    SOURCE_FILE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn looks_like_path(s: &str) -> bool {
    !s.is_empty() && s.len() < 260 && !s.contains(char::is_whitespace) && has_source_extension(s)
}

fn looks_like_code(s: &str) -> bool {
    CODE_MARKERS.iter().any(|m| s.contains(m))
}

/// Best-effort guess for a missing required field
fn infer_field(
    field: &str,
    ty: Option<FieldType>,
    pairs: &[(String, Value)],
    normalized: &str,
) -> Value {
    let strings = || {
        pairs
            .iter()
            .filter(|(k, _)| k != "tool")
            .filter_map(|(_, v)| v.as_str())
    };

    if PATH_LIKE_FIELDS.contains(&field) {
        let found = strings()
            .find(|s| looks_like_path(s))
            .or_else(|| strings().find(|s| has_source_extension(s)))
            .map(|s| s.to_string())
            .or_else(|| {
                PATH_TOKEN_REGEX
                    .find_iter(normalized)
                    .map(|m| m.as_str())
                    .find(|s| looks_like_path(s))
                    .map(|s| s.to_string())
            });
        if let Some(path) = found {
            return Value::String(path);
        }
    }

    if CONTENT_LIKE_FIELDS.contains(&field) {
        if let Some(code) = strings().filter(|s| looks_like_code(s)).max_by_key(|s| s.len()) {
            return Value::String(code.to_string());
        }
    }

    match ty {
        Some(FieldType::Number) => Value::Number(0.into()),
        Some(FieldType::Boolean) => Value::Bool(false),
        Some(FieldType::Array) => Value::Array(Vec::new()),
        Some(FieldType::Object) => Value::Object(Map::new()),
        _ => Value::String(format!("inferred-{}", field)),
    }
}

fn assemble(
    schema: &ToolSchema,
    pairs: &[(String, Value)],
    normalized: &str,
) -> (Map<String, Value>, Vec<String>) {
    let mut object = Map::new();
    object.insert("tool".to_string(), Value::String(schema.name.clone()));
    let mut inferred = Vec::new();

    let lookup = |field: &str| {
        pairs
            .iter()
            .find(|(k, v)| k == field && !is_blank(v))
            .map(|(_, v)| v.clone())
    };

    for field in schema.required_args() {
        let ty = schema.field_type(field);
        let value = match lookup(field) {
            Some(value) => coerce(value, ty),
            None => {
                inferred.push(field.to_string());
                infer_field(field, ty, pairs, normalized)
            }
        };
        object.insert(field.to_string(), value);
    }

    for (key, value) in pairs {
        if key == "tool" || key == INFERRED_FIELDS_KEY || object.contains_key(key) {
            continue;
        }
        object.insert(key.clone(), coerce(value.clone(), schema.field_type(key)));
    }

    if !inferred.is_empty() {
        object.insert(
            INFERRED_FIELDS_KEY.to_string(),
            Value::Array(inferred.iter().cloned().map(Value::String).collect()),
        );
    }
    (object, inferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reconstructor() -> SchemaAwareReconstructor {
        SchemaAwareReconstructor::new(GenericRepairCascade::new(), ToolSchemaRegistry::shared())
    }

    fn parsed(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_unclosed_string_round_trip() {
        let json = reconstructor()
            .reconstruct(r#"{"tool":"write_file","path":"a.ts","content":"unterminated"#)
            .unwrap();
        let value = parsed(&json);
        assert_eq!(value["tool"], "write_file");
        assert_eq!(value["path"], "a.ts");
        assert_eq!(value["content"], "unterminated");
        assert!(value.get(INFERRED_FIELDS_KEY).is_none());
    }

    #[test]
    fn test_unknown_tool_is_irrecoverable() {
        assert!(reconstructor().reconstruct(r#"{"tool":"rm_rf","path":"/"}"#).is_none());
        assert!(reconstructor().reconstruct("no tool here").is_none());
    }

    #[test]
    fn test_unescaped_inner_quotes_are_kept() {
        let json = reconstructor()
            .reconstruct(r#"{"tool": "write_file", "path": "a.ts", "content": "He said "hi" to me"}"#)
            .unwrap();
        assert_eq!(parsed(&json)["content"], r#"He said "hi" to me"#);
    }

    #[test]
    fn test_multiline_content_survives() {
        let input = "```json\n{\"tool\": \"write_file\",\n \"path\": \"src/App.tsx\",\n \"content\": \"import React from 'react';\nexport default () => <div/>;\"\n}\n```";
        let json = reconstructor().reconstruct(input).unwrap();
        let value = parsed(&json);
        assert_eq!(
            value["content"],
            "import React from 'react';\nexport default () => <div/>;"
        );
        assert_eq!(value["path"], "src/App.tsx");
    }

    #[test]
    fn test_missing_path_is_inferred_and_tagged() {
        let input = r#"{"tool": "write_file", "file": "src/util.ts", "content": "export const x = 1;" oops}"#;
        let json = reconstructor().reconstruct(input).unwrap();
        let value = parsed(&json);
        assert_eq!(value["path"], "src/util.ts");
        assert_eq!(value[INFERRED_FIELDS_KEY], json!(["path"]));
        assert_eq!(value["file"], "src/util.ts");
    }

    #[test]
    fn test_missing_content_is_inferred_from_code() {
        let input = r#"{"tool": "write_file", "path": "a.js", "body": "function f() { return 1 }""#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(value["content"], "function f() { return 1 }");
        assert_eq!(value[INFERRED_FIELDS_KEY], json!(["content"]));
    }

    #[test]
    fn test_placeholder_when_nothing_fits() {
        let input = r#"{"tool": "rename_file", "path": "a.ts" "#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(value["newPath"], "a.ts");

        let input = r#"{"tool": "add_package" version: 2"#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(value["name"], "inferred-name");
        assert_eq!(value["version"], 2);
    }

    #[test]
    fn test_typed_fields_are_coerced() {
        let input = r#"{"tool": "edit_file", "path": "a.ts", "replaceAll": "true", "occurrenceIndex": "2", oops"#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(value["replaceAll"], true);
        assert_eq!(value["occurrenceIndex"], 2);
    }

    #[test]
    fn test_nested_values_are_parsed() {
        let input = r#"{"tool": "edit_file", "path": "a.ts", "searchReplaceBlocks": [{"search": "a", "replace": "b"},], junk junk"#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(
            value["searchReplaceBlocks"],
            json!([{"search": "a", "replace": "b"}])
        );
    }

    #[test]
    fn test_repair_caps_confidence() {
        let result = reconstructor()
            .repair(r#"{"tool":"delete_file","path":"x.ts" "#)
            .unwrap();
        assert!(result.confidence <= 0.8);
        assert_eq!(result.fixes_applied[0], "schema-aware reconstruction");
        assert_eq!(result.data.unwrap()["path"], "x.ts");
    }

    #[test]
    fn test_close_unclosed_string_at_next_delimiter() {
        assert_eq!(close_unclosed_string(r#"{"a": "x}"#), r#"{"a": "x"}"#);
        assert_eq!(close_unclosed_string(r#"{"a": "x, y"#), r#"{"a": "x", y"#);
        assert_eq!(close_unclosed_string(r#"{"a": "x"#), r#"{"a": "x""#);
        assert_eq!(close_unclosed_string(r#"{"a": "x"}"#), r#"{"a": "x"}"#);
    }

    #[test]
    fn test_invalid_escapes_are_preserved_literally() {
        let input = r#"{"tool": "write_file", "path": "re.ts", "content": "const r = /\d+/;" bad}"#;
        let value = parsed(&reconstructor().reconstruct(input).unwrap());
        assert_eq!(value["content"], r"const r = /\d+/;");
    }

    #[test]
    fn test_text_outside_the_object_is_not_reconstructed() {
        let r = reconstructor();
        assert!(r
            .reconstruct(r#"{"tool":"read_file","path":"a.ts"} and also delete everything"#)
            .is_none());
        assert!(r
            .reconstruct("```json\n{\"tool\":\"delete_file\",\"path\":\"a.ts\"}\n{\"tool\":\"delete_file\",\"path\":\"b.ts\"}\n```")
            .is_none());
        assert!(r
            .reconstruct(r#"Sure: {"tool":"read_file","path":"a.ts""#)
            .is_none());
    }

    #[test]
    fn test_mismatched_quotes_do_not_name_a_tool() {
        assert!(reconstructor()
            .reconstruct(r#"{"tool': "write_file", "path": "a.ts", "content": "x"#)
            .is_none());
        let value = parsed(
            &reconstructor()
                .reconstruct(r#"{'tool': 'delete_file', 'path': 'a.ts'"#)
                .unwrap(),
        );
        assert_eq!(value["tool"], "delete_file");
    }
}
