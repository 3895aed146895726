//! Stream parser: the entry point of the engine.
//!
//! `parse` locates candidates, runs each through the repair cascade (and the
//! schema-aware reconstructor when that fails), assembles the survivors and
//! replaces their spans with `[TOOL_NAME: path]` placeholders. A bad
//! candidate is logged and left in place; it never stops its siblings.
//!
//! The parser keeps no state between calls. When a growing buffer is parsed
//! repeatedly, the caller must pass the start offsets it already resolved to
//! `parse_excluding` (or use [`IncrementalParser`]) so a call is not emitted
//! twice, and must not run two parses of the same stream concurrently.

use crate::assembler::ToolCallAssembler;
use crate::block_locator::BlockLocator;
use crate::config::ParserConfig;
use crate::json_repair::GenericRepairCascade;
use crate::logging::{panic_message, ParseMetric};
use crate::schema_repair::SchemaAwareReconstructor;
use crate::str_utils::{preview, slice_bytes_safe};
use crate::tool_schema::ToolSchemaRegistry;
use crate::types::{
    CandidateBlock, ParsedToolCall, RecoveryPath, Result, SalvageError, StreamParseResult,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, error, warn};
use tracing_error::SpanTrace;

/// A resolved span and the text that replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub placeholder: String,
}

#[derive(Debug, Default)]
struct ParseOutcome {
    tools: Vec<ParsedToolCall>,
    replacements: Vec<Replacement>,
}

/// Apply non-overlapping replacements computed against `buffer`'s original
/// offsets in one left-to-right pass.
pub fn rewrite_spans<'a, I>(buffer: &str, replacements: I) -> String
where
    I: IntoIterator<Item = &'a Replacement>,
{
    let mut sorted: Vec<&Replacement> = replacements.into_iter().collect();
    sorted.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(buffer.len());
    let mut cursor = 0;
    for r in sorted {
        if r.start < cursor || slice_bytes_safe(buffer, r.start, r.end).is_none() {
            continue;
        }
        out.push_str(&buffer[cursor..r.start]);
        out.push_str(&r.placeholder);
        cursor = r.end;
    }
    out.push_str(&buffer[cursor..]);
    out
}

#[derive(Debug, Clone)]
pub struct StreamParser {
    registry: Arc<ToolSchemaRegistry>,
    locator: BlockLocator,
    cascade: GenericRepairCascade,
    reconstructor: SchemaAwareReconstructor,
    assembler: ToolCallAssembler,
    config: ParserConfig,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new(ToolSchemaRegistry::shared(), ParserConfig::default())
    }
}

impl StreamParser {
    pub fn new(registry: Arc<ToolSchemaRegistry>, config: ParserConfig) -> Self {
        let cascade = GenericRepairCascade::new();
        Self {
            locator: BlockLocator::new(registry.clone()),
            reconstructor: SchemaAwareReconstructor::new(cascade, registry.clone()),
            cascade,
            assembler: ToolCallAssembler::new(),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&self, buffer: &str) -> StreamParseResult {
        self.parse_excluding(buffer, &HashSet::new())
    }

    /// Like `parse`, but candidates starting at an offset in `resolved` are
    /// neither re-emitted nor replaced.
    pub fn parse_excluding(&self, buffer: &str, resolved: &HashSet<usize>) -> StreamParseResult {
        match self.run_guarded(buffer, resolved) {
            Ok(outcome) => StreamParseResult {
                processed_content: rewrite_spans(buffer, &outcome.replacements),
                tools: outcome.tools,
            },
            Err(e) => {
                error!("[PARSE] Extraction aborted, passing buffer through: {}", e.inner);
                StreamParseResult::passthrough(buffer)
            }
        }
    }

    fn run_guarded(&self, buffer: &str, resolved: &HashSet<usize>) -> Result<ParseOutcome> {
        match catch_unwind(AssertUnwindSafe(|| self.extract(buffer, resolved))) {
            Ok(result) => result,
            Err(payload) => Err(SalvageError::Internal(
                format!("parser panicked: {}", panic_message(payload.as_ref())),
                SpanTrace::capture(),
            )
            .into()),
        }
    }

    fn extract(&self, buffer: &str, resolved: &HashSet<usize>) -> Result<ParseOutcome> {
        if buffer.len() > self.config.max_buffer_bytes {
            return Err(SalvageError::BufferTooLarge {
                len: buffer.len(),
                max: self.config.max_buffer_bytes,
            }
            .into());
        }

        let span = debug_span!("parse", buffer_len = buffer.len());
        let _enter = span.enter();

        let mut metric = ParseMetric::new();
        let mut outcome = ParseOutcome::default();

        for candidate in self.locator.locate(buffer) {
            metric.record_candidate();
            if resolved.contains(&candidate.start_index) {
                metric.record_already_resolved();
                continue;
            }

            let started = Instant::now();
            if let Some(call) = self.resolve(&candidate, &mut metric) {
                debug!(
                    "[PARSE] {} at {}..{} resolved in {:?} (confidence {})",
                    call.tool,
                    candidate.start_index,
                    candidate.end_index,
                    started.elapsed(),
                    call.confidence
                );
                outcome.replacements.push(Replacement {
                    start: candidate.start_index,
                    end: candidate.end_index,
                    placeholder: call.placeholder(),
                });
                outcome.tools.push(call);
            }
        }

        metric.log_summary();
        Ok(outcome)
    }

    /// found -> generic-repaired | schema-reconstructed | failed
    fn resolve(&self, candidate: &CandidateBlock, metric: &mut ParseMetric) -> Option<ParsedToolCall> {
        let generic = self.cascade.repair(&candidate.payload);
        let (result, recovery) = if generic.is_success() {
            (generic, RecoveryPath::Generic)
        } else if !self.config.enable_schema_reconstruction {
            return self.skip(candidate, metric, "repair cascade failed");
        } else {
            match self.reconstructor.repair(&candidate.payload) {
                Some(result) => (result, RecoveryPath::SchemaReconstructed),
                None => {
                    let reason = generic
                        .warnings
                        .last()
                        .cloned()
                        .unwrap_or_else(|| "unrecoverable".to_string());
                    return self.skip(candidate, metric, &reason);
                }
            }
        };

        let Some(Value::Object(object)) = result.data.as_ref() else {
            return self.skip(candidate, metric, "not a JSON object");
        };
        let Some(tool) = object.get("tool").and_then(|t| t.as_str()) else {
            return self.skip(candidate, metric, "no tool field");
        };
        let Some(schema) = self.registry.get(tool) else {
            metric.record_unknown_tool(tool);
            debug!("[PARSE] Unknown tool '{}' at {}", tool, candidate.start_index);
            return None;
        };

        let missing: Vec<&str> = schema
            .required_args()
            .filter(|f| match object.get(*f) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .collect();
        if !missing.is_empty() {
            let reason = format!("missing required field(s) {}", missing.join(", "));
            return self.skip(candidate, metric, &reason);
        }

        metric.record_success(recovery);
        Some(
            self.assembler
                .assemble_repaired(object, tool, &result, recovery),
        )
    }

    fn skip(
        &self,
        candidate: &CandidateBlock,
        metric: &mut ParseMetric,
        reason: &str,
    ) -> Option<ParsedToolCall> {
        metric.record_failure();
        warn!(
            "[PARSE] Skipping {:?} candidate at {}: {} ({})",
            candidate.source_kind,
            candidate.start_index,
            reason,
            preview(&candidate.payload, 80)
        );
        None
    }
}

/// Caller-side bookkeeping for repeatedly parsing one growing buffer.
///
/// Each `feed` returns only tool calls not seen before, while
/// `processed_content` keeps placeholders for every span resolved so far.
#[derive(Debug, Clone)]
pub struct IncrementalParser {
    parser: StreamParser,
    resolved: BTreeMap<usize, Replacement>,
}

impl Default for IncrementalParser {
    fn default() -> Self {
        Self::new(StreamParser::default())
    }
}

impl IncrementalParser {
    pub fn new(parser: StreamParser) -> Self {
        Self {
            parser,
            resolved: BTreeMap::new(),
        }
    }

    pub fn feed(&mut self, buffer: &str) -> StreamParseResult {
        if self
            .resolved
            .values()
            .any(|r| slice_bytes_safe(buffer, r.start, r.end).is_none())
        {
            warn!("[PARSE] Buffer no longer extends the previous one; resetting");
            self.reset();
        }

        let skip: HashSet<usize> = self.resolved.keys().copied().collect();
        match self.parser.run_guarded(buffer, &skip) {
            Ok(outcome) => {
                for r in outcome.replacements {
                    self.resolved.insert(r.start, r);
                }
                StreamParseResult {
                    processed_content: rewrite_spans(buffer, self.resolved.values()),
                    tools: outcome.tools,
                }
            }
            Err(e) => {
                error!("[PARSE] Extraction aborted, passing buffer through: {}", e.inner);
                StreamParseResult::passthrough(buffer)
            }
        }
    }

    pub fn resolved_offsets(&self) -> Vec<usize> {
        self.resolved.keys().copied().collect()
    }

    pub fn reset(&mut self) {
        self.resolved.clear();
    }
}
