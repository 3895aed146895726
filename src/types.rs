use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing_error::SpanTrace;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ToolCallId(pub String);

impl ToolCallId {
    /// Millisecond timestamp plus a random suffix. Never reused within a process.
    pub fn new(timestamp_ms: i64) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "tool_{}_{}",
            timestamp_ms,
            crate::str_utils::prefix_chars(&suffix, 12)
        ))
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ToolCallId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Bare,
    Fenced,
}

/// A span of the buffer suspected to hold a tool call.
///
/// `raw_text` is exactly `buffer[start_index..end_index]` and is what gets
/// replaced by a placeholder. `payload` is the text handed to the repair
/// cascade: identical to `raw_text` for bare blocks, the fence body for
/// fenced ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    pub raw_text: String,
    pub payload: String,
    pub start_index: usize,
    pub end_index: usize,
    pub source_kind: SourceKind,
}

impl CandidateBlock {
    pub fn contains(&self, other: &CandidateBlock) -> bool {
        self.start_index <= other.start_index && other.end_index <= self.end_index
    }

    pub fn overlaps(&self, other: &CandidateBlock) -> bool {
        self.start_index < other.end_index && other.start_index < self.end_index
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairAttemptResult {
    pub data: Option<Value>,
    pub fixes_applied: Vec<String>,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl RepairAttemptResult {
    pub fn failed(fixes_applied: Vec<String>, last_error: String) -> Self {
        Self {
            data: None,
            fixes_applied,
            confidence: 0.0,
            warnings: vec![last_error],
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Detected,
    Executing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPath {
    Generic,
    SchemaReconstructed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchReplaceBlock {
    pub search: String,
    pub replace: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedToolCall {
    pub id: ToolCallId,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_replace_blocks: Option<Vec<SearchReplaceBlock>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_after: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_on_failure: Option<bool>,
    pub args: Map<String, Value>,
    pub status: ToolStatus,
    /// Epoch milliseconds at assembly time.
    pub start_time: i64,
    pub confidence: f64,
    pub fixes_applied: Vec<String>,
    pub recovery: RecoveryPath,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inferred_fields: Vec<String>,
}

impl ParsedToolCall {
    pub fn primary_arg(&self) -> &str {
        self.path.as_deref().unwrap_or("unknown")
    }

    pub fn placeholder(&self) -> String {
        format!("[{}: {}]", self.tool.to_uppercase(), self.primary_arg())
    }

    pub fn is_inferred(&self, field: &str) -> bool {
        self.inferred_fields.iter().any(|f| f == field)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamParseResult {
    pub tools: Vec<ParsedToolCall>,
    pub processed_content: String,
}

impl StreamParseResult {
    /// The degraded result: nothing extracted, buffer passed through untouched.
    pub fn passthrough(buffer: &str) -> Self {
        Self {
            tools: Vec::new(),
            processed_content: buffer.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SalvageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer too large: {len} bytes (limit {max})")]
    BufferTooLarge { len: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String, SpanTrace),
}

#[derive(Debug)]
pub struct ObservedError {
    pub inner: SalvageError,
    pub span_trace: SpanTrace,
}

impl std::fmt::Display for ObservedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n\nSpan Trace:\n{}", self.inner, self.span_trace)
    }
}

impl std::error::Error for ObservedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl<E> From<E> for ObservedError
where
    E: Into<SalvageError>,
{
    fn from(error: E) -> Self {
        Self {
            inner: error.into(),
            span_trace: SpanTrace::capture(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ObservedError>;
