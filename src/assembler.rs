//! Normalizes a repaired JSON object into a `ParsedToolCall`.

use crate::constants::INFERRED_FIELDS_KEY;
use crate::types::{
    ParsedToolCall, RecoveryPath, RepairAttemptResult, SearchReplaceBlock, ToolCallId, ToolStatus,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct ToolCallAssembler;

fn first_value<'a>(args: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| args.get(*k))
}

fn string_field(args: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_value(args, keys)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn bool_field(args: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    match first_value(args, keys)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}

fn index_field(args: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    match first_value(args, keys)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn blocks_field(args: &Map<String, Value>, keys: &[&str]) -> Option<Vec<SearchReplaceBlock>> {
    let blocks = first_value(args, keys)?
        .as_array()?
        .iter()
        .filter_map(|b| {
            Some(SearchReplaceBlock {
                search: b.get("search")?.as_str()?.to_string(),
                replace: b.get("replace")?.as_str().unwrap_or_default().to_string(),
            })
        })
        .collect();
    Some(blocks)
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Lift the well-known fields out of `parsed` into named properties. The
    /// whole object (minus inference bookkeeping) stays under `args`.
    pub fn assemble(&self, parsed: &Map<String, Value>, tool_name: &str) -> ParsedToolCall {
        let mut args = parsed.clone();
        let inferred_fields = match args.remove(INFERRED_FIELDS_KEY) {
            Some(Value::Array(fields)) => fields
                .iter()
                .filter_map(|f| f.as_str().map(|s| s.to_string()))
                .collect(),
            _ => Vec::new(),
        };

        let start_time = chrono::Utc::now().timestamp_millis();
        ParsedToolCall {
            id: ToolCallId::new(start_time),
            tool: tool_name.to_string(),
            path: string_field(&args, &["path", "filePath", "file_path"]),
            content: string_field(&args, &["content"]),
            search: string_field(&args, &["search"]),
            replace: string_field(&args, &["replace"]),
            search_replace_blocks: blocks_field(&args, &["searchReplaceBlocks", "search_replace_blocks"]),
            replace_all: bool_field(&args, &["replaceAll", "replace_all"]),
            occurrence_index: index_field(&args, &["occurrenceIndex", "occurrence_index"]),
            validate_after: bool_field(&args, &["validateAfter", "validate_after"]),
            dry_run: bool_field(&args, &["dryRun", "dry_run"]),
            rollback_on_failure: bool_field(&args, &["rollbackOnFailure", "rollback_on_failure"]),
            args,
            status: ToolStatus::Detected,
            start_time,
            confidence: 1.0,
            fixes_applied: Vec::new(),
            recovery: RecoveryPath::Generic,
            inferred_fields,
        }
    }

    /// `assemble` plus the repair metadata of the attempt that produced `parsed`
    pub fn assemble_repaired(
        &self,
        parsed: &Map<String, Value>,
        tool_name: &str,
        repair: &RepairAttemptResult,
        recovery: RecoveryPath,
    ) -> ParsedToolCall {
        let mut call = self.assemble(parsed, tool_name);
        call.confidence = repair.confidence;
        call.fixes_applied = repair.fixes_applied.clone();
        call.recovery = recovery;
        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_write_file_fields() {
        let parsed = object(json!({"tool": "write_file", "path": "a.ts", "content": "x"}));
        let call = ToolCallAssembler::new().assemble(&parsed, "write_file");
        assert_eq!(call.tool, "write_file");
        assert_eq!(call.path.as_deref(), Some("a.ts"));
        assert_eq!(call.content.as_deref(), Some("x"));
        assert_eq!(call.status, ToolStatus::Detected);
        assert_eq!(call.args, parsed);
        assert!(call.start_time > 0);
        assert!(call.id.0.starts_with("tool_"));
    }

    #[test]
    fn test_edit_operation_fields() {
        let parsed = object(json!({
            "tool": "edit_file",
            "path": "a.ts",
            "searchReplaceBlocks": [{"search": "a", "replace": "b"}, {"nope": 1}],
            "replaceAll": true,
            "occurrenceIndex": 2,
            "validate_after": "false",
            "dryRun": false,
            "rollbackOnFailure": true
        }));
        let call = ToolCallAssembler::new().assemble(&parsed, "edit_file");
        assert_eq!(
            call.search_replace_blocks,
            Some(vec![SearchReplaceBlock {
                search: "a".into(),
                replace: "b".into()
            }])
        );
        assert_eq!(call.replace_all, Some(true));
        assert_eq!(call.occurrence_index, Some(2));
        assert_eq!(call.validate_after, Some(false));
        assert_eq!(call.dry_run, Some(false));
        assert_eq!(call.rollback_on_failure, Some(true));
        assert_eq!(call.search, None);
    }

    #[test]
    fn test_inferred_fields_are_lifted_out_of_args() {
        let parsed = object(json!({
            "tool": "delete_file",
            "path": "inferred-path",
            "_inferredFields": ["path"]
        }));
        let call = ToolCallAssembler::new().assemble(&parsed, "delete_file");
        assert!(call.is_inferred("path"));
        assert!(!call.args.contains_key(INFERRED_FIELDS_KEY));
    }

    #[test]
    fn test_repair_metadata_is_carried() {
        let parsed = object(json!({"tool": "read_file", "path": "a.ts"}));
        let repair = RepairAttemptResult {
            data: Some(Value::Object(parsed.clone())),
            fixes_applied: vec!["removed trailing commas".into()],
            confidence: 0.8,
            warnings: vec![],
        };
        let call = ToolCallAssembler::new().assemble_repaired(
            &parsed,
            "read_file",
            &repair,
            RecoveryPath::Generic,
        );
        assert_eq!(call.confidence, 0.8);
        assert_eq!(call.fixes_applied, vec!["removed trailing commas"]);
    }

    #[test]
    fn test_ids_are_unique() {
        let parsed = object(json!({"tool": "read_file", "path": "a.ts"}));
        let assembler = ToolCallAssembler::new();
        let a = assembler.assemble(&parsed, "read_file");
        let b = assembler.assemble(&parsed, "read_file");
        assert_ne!(a.id, b.id);
    }
}
