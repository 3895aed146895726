use salvage::*;
use serde_json::{json, Value};

#[test]
fn test_strict_valid_input_is_untouched() {
    let cascade = GenericRepairCascade::new();
    let inputs = [
        r#"{"tool":"write_file","path":"a.ts","content":"line1\nline2"}"#,
        r#"{"tool":"edit_file","path":"a.ts","searchReplaceBlocks":[{"search":"a","replace":"b"}],"replaceAll":true}"#,
        r#"{"tool":"add_package","name":"leaflet","version":"^1.9.4","isDev":false}"#,
        "{\n  \"tool\": \"delete_file\",\n  \"path\": \"x.ts\"\n}",
    ];
    for input in inputs {
        let result = cascade.repair(input);
        let expected: Value = serde_json::from_str(input).unwrap();
        assert_eq!(result.data, Some(expected), "input: {}", input);
        assert_eq!(result.confidence, 1.0);
        assert!(result.fixes_applied.is_empty());
    }
}

#[test]
fn test_trailing_comma_and_single_quotes() {
    let result = GenericRepairCascade::new().repair("{'tool': 'delete_file', 'path': 'x.ts',}");
    assert_eq!(result.data, Some(json!({"tool": "delete_file", "path": "x.ts"})));
    assert_eq!(result.confidence, 0.8);
    assert!(!result.fixes_applied.is_empty());
}

#[test]
fn test_raw_newlines_in_strings() {
    let result = GenericRepairCascade::new()
        .repair("{\"tool\":\"write_file\",\"path\":\"a.ts\",\"content\":\"a\n\tb\"}");
    assert_eq!(
        result.data,
        Some(json!({"tool": "write_file", "path": "a.ts", "content": "a\n\tb"}))
    );
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn test_garbage_fails_without_panicking() {
    let result = GenericRepairCascade::new().repair("this is not { json at all");
    assert!(!result.is_success());
    assert_eq!(result.confidence, 0.0);
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_balanced_braces_inside_strings() {
    let buffer = r#"Here: {"tool":"write_file","path":"a.ts","content":"if (x) { y() } else { z(\"}\") }"} done"#;
    let blocks = BlockLocator::new(ToolSchemaRegistry::shared()).locate(buffer);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start_index, 6);
    assert_eq!(&buffer[blocks[0].end_index..], " done");
}

#[test]
fn test_no_partial_block_emission() {
    let buffer = r#"{"tool":"write_file","path":"a.ts","content":"if (x) { y() "#;
    let blocks = BlockLocator::new(ToolSchemaRegistry::shared()).locate(buffer);
    assert!(blocks.is_empty());
}

#[test]
fn test_unclosed_string_round_trip() {
    let registry = ToolSchemaRegistry::shared();
    let reconstructor = SchemaAwareReconstructor::new(GenericRepairCascade::new(), registry);
    let json = reconstructor
        .reconstruct(r#"{"tool":"write_file","path":"a.ts","content":"unterminated"#)
        .expect("should reconstruct");

    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["tool"], json!("write_file"));
    assert_eq!(value["path"], json!("a.ts"));
    let content = value["content"].as_str().unwrap();
    assert!(!content.is_empty());
    assert!(content.starts_with("unterminated"));
}

#[test]
fn test_reconstruction_refuses_unknown_tools() {
    let reconstructor =
        SchemaAwareReconstructor::new(GenericRepairCascade::new(), ToolSchemaRegistry::shared());
    assert!(reconstructor
        .reconstruct(r#"{"tool":"rm_rf","path":"/"#)
        .is_none());
}

#[test]
fn test_inferred_fields_surface_on_the_call() {
    let reconstructor =
        SchemaAwareReconstructor::new(GenericRepairCascade::new(), ToolSchemaRegistry::shared());
    let repaired = reconstructor
        .repair(r#"{"tool":"delete_file","target_file":"src/old.ts"#)
        .expect("should reconstruct");
    assert!(repaired.confidence <= 0.8);

    let Some(Value::Object(object)) = repaired.data.as_ref() else {
        panic!("expected object");
    };
    let call = ToolCallAssembler::new().assemble_repaired(
        object,
        "delete_file",
        &repaired,
        RecoveryPath::SchemaReconstructed,
    );
    assert_eq!(call.path.as_deref(), Some("src/old.ts"));
    assert!(call.is_inferred("path"));
    assert_eq!(call.placeholder(), "[DELETE_FILE: src/old.ts]");
}
