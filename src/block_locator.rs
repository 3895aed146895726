//! Candidate block discovery
//!
//! Finds spans of a (possibly still streaming) buffer that look like tool
//! calls: bare `{ "tool": ... }` objects and fenced ```` ```json ```` blocks.
//! Bare objects are delimited with a balanced-brace scan that ignores braces
//! inside string values. A block that has not closed yet produces nothing.

use crate::constants::FENCE_LANGUAGES;
use crate::scanner::{find_balanced_end, JsonScanner, QuoteStyle};
use crate::tool_schema::ToolSchemaRegistry;
use crate::types::{CandidateBlock, SourceKind};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref TOOL_KEY_REGEX: Regex =
        Regex::new(r#"(?:"tool"|'tool')\s*:\s*(?:"([^"\s]+)"|'([^'\s]+)')"#)
            .expect("Invalid tool key regex");
}

const FENCE: &str = "```";

#[derive(Debug, Clone)]
pub struct BlockLocator {
    registry: Arc<ToolSchemaRegistry>,
}

impl BlockLocator {
    pub fn new(registry: Arc<ToolSchemaRegistry>) -> Self {
        Self { registry }
    }

    /// All candidates in `buffer`, ordered by start offset, non-overlapping.
    pub fn locate(&self, buffer: &str) -> Vec<CandidateBlock> {
        let (mut all, open_fence) = locate_fenced(buffer);
        all.extend(
            self.locate_bare(buffer)
                .into_iter()
                .filter(|b| open_fence.map_or(true, |fence| b.end_index <= fence)),
        );
        dedupe(all)
    }

    fn locate_bare(&self, buffer: &str) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();
        let mut covered_until = 0;
        let mut unclosed_from: Option<usize> = None;

        for caps in TOOL_KEY_REGEX.captures_iter(buffer) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            if whole.start() < covered_until {
                // a "tool" key nested inside a block we already have
                continue;
            }
            if unclosed_from.is_some_and(|from| in_string_at(buffer, from, whole.start())) {
                // string content of a block that is still open
                continue;
            }
            if !self.registry.contains(name.as_str()) {
                debug!("[LOCATE] Ignoring unrecognized tool name '{}'", name.as_str());
                continue;
            }
            let Some(start) = enclosing_brace(buffer, whole.start()) else {
                continue;
            };
            match find_balanced_end(buffer, start, QuoteStyle::Any) {
                Some(end) if end > whole.end() => {
                    covered_until = end;
                    blocks.push(CandidateBlock {
                        raw_text: buffer[start..end].to_string(),
                        payload: buffer[start..end].to_string(),
                        start_index: start,
                        end_index: end,
                        source_kind: SourceKind::Bare,
                    });
                }
                Some(_) => {}
                None => {
                    debug!(
                        "[LOCATE] Block at {} for '{}' is not closed",
                        start,
                        name.as_str()
                    );
                    unclosed_from.get_or_insert(start);
                }
            }
        }

        blocks
    }
}

/// Is `pos` inside a string, scanning from the `{` at `from`?
fn in_string_at(buffer: &str, from: usize, pos: usize) -> bool {
    let mut scanner = JsonScanner::new(QuoteStyle::Any);
    for (offset, ch) in buffer[from..pos].char_indices() {
        scanner.step(from + offset, ch);
    }
    scanner.in_string()
}

/// Offset of the `{` whose object directly holds the key at `pos`: the
/// nearest brace that is still open, one level deep and outside any string
/// when the scan reaches `pos`.
fn enclosing_brace(buffer: &str, pos: usize) -> Option<usize> {
    buffer[..pos]
        .char_indices()
        .rev()
        .filter(|&(_, ch)| ch == '{')
        .map(|(idx, _)| idx)
        .find(|&idx| {
            let mut scanner = JsonScanner::new(QuoteStyle::Any);
            for (offset, ch) in buffer[idx..pos].char_indices() {
                scanner.step(idx + offset, ch);
                if scanner.depth() <= 0 {
                    return false;
                }
            }
            !scanner.in_string() && scanner.depth() == 1
        })
}

fn is_line_start(buffer: &str, pos: usize) -> bool {
    let line_start = buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
    buffer[line_start..pos].trim().is_empty()
}

fn is_info_token(info: &str) -> bool {
    info.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.' | '#'))
}

/// Byte ranges of a fence body made of two or more objects separated only
/// by whitespace.
fn split_objects(body: &str) -> Option<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();
    let mut idx = 0;
    loop {
        let rest = &body[idx..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let start = idx + (rest.len() - trimmed.len());
        let end = find_balanced_end(body, start, QuoteStyle::Any)?;
        ranges.push((start, end));
        idx = end;
    }
    (ranges.len() > 1).then_some(ranges)
}

/// Closed fences whose info string is empty or a JSON dialect. The whole
/// fence (markers included) is the span and the body is the payload; a body
/// holding several objects yields one candidate per object instead. Also
/// returns the offset of a trailing fence that has not closed yet.
///
/// Only a ```` ``` ```` at the start of a line followed by a bare language
/// token opens a fence.
fn locate_fenced(buffer: &str) -> (Vec<CandidateBlock>, Option<usize>) {
    let mut blocks = Vec::new();
    let mut search_idx = 0;

    while let Some(rel) = buffer[search_idx..].find(FENCE) {
        let open = search_idx + rel;
        let info_start = open + FENCE.len();
        let (info, body_start) = match buffer[info_start..].find('\n') {
            Some(nl) => (&buffer[info_start..info_start + nl], Some(info_start + nl + 1)),
            None => (&buffer[info_start..], None),
        };
        let info = info.trim().to_lowercase();
        if !is_line_start(buffer, open) || !is_info_token(&info) {
            search_idx = info_start;
            continue;
        }

        let Some(body_start) = body_start else {
            return (blocks, Some(open));
        };
        let Some(close_rel) = buffer[body_start..].find(FENCE) else {
            debug!("[LOCATE] Fence at {} is not closed yet", open);
            return (blocks, Some(open));
        };
        let close = body_start + close_rel;
        let end = close + FENCE.len();

        if FENCE_LANGUAGES.contains(&info.as_str()) {
            let body = &buffer[body_start..close];
            match split_objects(body) {
                Some(ranges) => {
                    debug!(
                        "[LOCATE] Fence at {} holds {} objects, splitting",
                        open,
                        ranges.len()
                    );
                    for (s, e) in ranges {
                        let object = &body[s..e];
                        blocks.push(CandidateBlock {
                            raw_text: object.to_string(),
                            payload: object.to_string(),
                            start_index: body_start + s,
                            end_index: body_start + e,
                            source_kind: SourceKind::Fenced,
                        });
                    }
                }
                None => {
                    let payload = body.trim();
                    if !payload.is_empty() {
                        blocks.push(CandidateBlock {
                            raw_text: buffer[open..end].to_string(),
                            payload: payload.to_string(),
                            start_index: open,
                            end_index: end,
                            source_kind: SourceKind::Fenced,
                        });
                    }
                }
            }
        }
        search_idx = end;
    }

    (blocks, None)
}

/// Drop candidates that overlap an earlier or enclosing one. Sorting by start
/// ascending and length descending puts every container before its contents.
fn dedupe(mut blocks: Vec<CandidateBlock>) -> Vec<CandidateBlock> {
    blocks.sort_by(|a, b| {
        a.start_index
            .cmp(&b.start_index)
            .then(b.end_index.cmp(&a.end_index))
    });

    let mut accepted: Vec<CandidateBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if accepted.last().is_some_and(|last| last.overlaps(&block)) {
            debug!(
                "[LOCATE] Dropping {:?} candidate at {} (inside another block)",
                block.source_kind, block.start_index
            );
            continue;
        }
        accepted.push(block);
    }
    accepted
}
