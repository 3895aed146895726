//! Tool Schema Registry
//!
//! Static table of the tools the engine recognizes and the shape of their
//! arguments. Every other component asks the registry whether a tool name is
//! known instead of keeping its own list.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn from_json_type(s: &str) -> Option<Self> {
        match s {
            "string" => Some(FieldType::String),
            "number" | "integer" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            "object" => Some(FieldType::Object),
            _ => None,
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
        }
    }
}

/// Argument shape of a single tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSchema {
    pub name: String,
    pub required_fields: Vec<String>,
    pub field_types: BTreeMap<String, FieldType>,
}

impl ToolSchema {
    pub fn new(name: &str, required: &[&str], fields: &[(&str, FieldType)]) -> Self {
        Self {
            name: name.to_string(),
            required_fields: required.iter().map(|s| s.to_string()).collect(),
            field_types: fields
                .iter()
                .map(|(k, t)| (k.to_string(), *t))
                .collect(),
        }
    }

    /// Analyze an OpenAI-style function definition
    pub fn from_tool_definition(tool: &Value) -> Option<Self> {
        let function = tool.get("function")?;
        let name = function.get("name")?.as_str()?.to_string();

        let parameters = function.get("parameters")?;
        let properties = parameters.get("properties")?.as_object()?;
        let mut required_fields = vec!["tool".to_string()];
        if let Some(arr) = parameters.get("required").and_then(|v| v.as_array()) {
            required_fields.extend(arr.iter().filter_map(|v| v.as_str().map(|s| s.to_string())));
        }

        let field_types = properties
            .iter()
            .map(|(k, v)| {
                let ty = v
                    .get("type")
                    .and_then(|t| t.as_str())
                    .and_then(FieldType::from_json_type)
                    .unwrap_or(FieldType::String);
                (k.clone(), ty)
            })
            .collect();

        let schema = ToolSchema {
            name,
            required_fields,
            field_types,
        };
        schema.is_consistent().then_some(schema)
    }

    /// `required_fields` must be a subset of the declared fields plus `tool`
    pub fn is_consistent(&self) -> bool {
        self.required_fields
            .iter()
            .all(|f| f == "tool" || self.field_types.contains_key(f))
    }

    /// Required fields other than the `tool` discriminator itself
    pub fn required_args(&self) -> impl Iterator<Item = &str> {
        self.required_fields
            .iter()
            .map(|s| s.as_str())
            .filter(|f| *f != "tool")
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.iter().any(|f| f == field)
    }

    pub fn optional_fields(&self) -> Vec<&str> {
        self.field_types
            .keys()
            .map(|s| s.as_str())
            .filter(|f| !self.is_required(f))
            .collect()
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.field_types.get(field).copied()
    }
}

/// Schema registry for all recognized tools
#[derive(Debug, Clone, Default)]
pub struct ToolSchemaRegistry {
    schemas: HashMap<String, ToolSchema>,
}

lazy_static! {
    static ref BUILTIN_REGISTRY: Arc<ToolSchemaRegistry> = Arc::new(ToolSchemaRegistry::builtin());
}

impl ToolSchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Shared read-only instance of the built-in tool table
    pub fn shared() -> Arc<ToolSchemaRegistry> {
        BUILTIN_REGISTRY.clone()
    }

    /// The file and package tools understood by the executor
    pub fn builtin() -> Self {
        use FieldType::*;

        let mut registry = Self::new();
        registry.register(ToolSchema::new(
            "write_file",
            &["tool", "path", "content"],
            &[("path", String), ("content", String)],
        ));
        registry.register(ToolSchema::new(
            "edit_file",
            &["tool", "path"],
            &[
                ("path", String),
                ("search", String),
                ("replace", String),
                ("searchReplaceBlocks", Array),
                ("replaceAll", Boolean),
                ("occurrenceIndex", Number),
                ("validateAfter", Boolean),
                ("dryRun", Boolean),
                ("rollbackOnFailure", Boolean),
            ],
        ));
        registry.register(ToolSchema::new(
            "delete_file",
            &["tool", "path"],
            &[("path", String)],
        ));
        registry.register(ToolSchema::new(
            "read_file",
            &["tool", "path"],
            &[("path", String)],
        ));
        registry.register(ToolSchema::new(
            "rename_file",
            &["tool", "path", "newPath"],
            &[("path", String), ("newPath", String)],
        ));
        registry.register(ToolSchema::new(
            "add_package",
            &["tool", "name"],
            &[("name", String), ("version", String), ("isDev", Boolean)],
        ));
        registry.register(ToolSchema::new(
            "remove_package",
            &["tool", "name"],
            &[("name", String)],
        ));
        registry
    }

    /// Build registry from OpenAI-style tool definitions
    pub fn from_tools(tools: &[Value]) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            if let Some(schema) = ToolSchema::from_tool_definition(tool) {
                registry.register(schema);
            }
        }
        registry
    }

    pub fn register(&mut self, schema: ToolSchema) {
        if !schema.is_consistent() {
            tracing::warn!(
                "[SCHEMA] Rejected schema '{}': required fields not declared",
                schema.name
            );
            return;
        }
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Sorted list of recognized tool names
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_schemas_are_consistent() {
        let registry = ToolSchemaRegistry::builtin();
        assert!(registry.len() >= 7);
        for name in registry.tool_names() {
            let schema = registry.get(name).unwrap();
            assert!(schema.is_consistent(), "{} is inconsistent", name);
            assert!(schema.is_required("tool"));
        }
    }

    #[test]
    fn test_edit_file_optional_fields() {
        let registry = ToolSchemaRegistry::builtin();
        let schema = registry.get("edit_file").unwrap();
        let optional = schema.optional_fields();
        assert!(optional.contains(&"searchReplaceBlocks"));
        assert!(optional.contains(&"dryRun"));
        assert!(!optional.contains(&"path"));
        assert_eq!(schema.required_args().collect::<Vec<_>>(), vec!["path"]);
    }

    #[test]
    fn test_unknown_tool() {
        let registry = ToolSchemaRegistry::shared();
        assert!(!registry.contains("rm_rf"));
        assert!(registry.contains("add_package"));
    }

    #[test]
    fn test_tool_schema_from_definition() {
        let tool = json!({
            "type": "function",
            "function": {
                "name": "grep",
                "description": "Search files",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "pattern": {"type": "string"},
                        "-A": {"type": "number"}
                    },
                    "required": ["pattern"]
                }
            }
        });

        let schema = ToolSchema::from_tool_definition(&tool).unwrap();
        assert_eq!(schema.name, "grep");
        assert_eq!(schema.required_fields, vec!["tool", "pattern"]);
        assert_eq!(schema.optional_fields(), vec!["-A"]);
        assert_eq!(schema.field_type("-A"), Some(FieldType::Number));
    }

    #[test]
    fn test_definition_with_undeclared_required_field_is_rejected() {
        let tool = json!({
            "type": "function",
            "function": {
                "name": "broken",
                "parameters": {
                    "type": "object",
                    "properties": {},
                    "required": ["ghost"]
                }
            }
        });
        assert!(ToolSchema::from_tool_definition(&tool).is_none());
        assert!(ToolSchemaRegistry::from_tools(&[tool]).is_empty());
    }

    #[test]
    fn test_field_type_matches() {
        assert!(FieldType::Boolean.matches(&json!(false)));
        assert!(!FieldType::Number.matches(&json!("3")));
        assert!(FieldType::Array.matches(&json!([])));
    }
}
