use crate::config::ParserConfig;
use crate::tool_schema::ToolSchemaRegistry;
use crate::types::*;
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File holding the model output; stdin when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
    #[arg(long, default_value_t = false)]
    pub disable_reconstruction: bool,
    #[arg(long)]
    pub max_buffer_bytes: Option<usize>,
    /// JSON array of OpenAI-style tool definitions replacing the builtin set
    #[arg(long)]
    pub tools: Option<PathBuf>,
    /// Replay the input line by line as a growing stream
    #[arg(long, default_value_t = false)]
    pub incremental: bool,
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Environment defaults, overridden by flags
    pub fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig::default();
        if self.disable_reconstruction {
            config.enable_schema_reconstruction = false;
        }
        if let Some(max) = self.max_buffer_bytes {
            config.max_buffer_bytes = max;
        }
        config
    }
}

pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Create the log directory if one was requested
pub fn prepare_log_dir(dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn load_registry(path: Option<&Path>) -> Result<Arc<ToolSchemaRegistry>> {
    let Some(p) = path else {
        return Ok(ToolSchemaRegistry::shared());
    };
    let raw = std::fs::read_to_string(p)?;
    let tools: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let registry = ToolSchemaRegistry::from_tools(&tools);
    if registry.is_empty() {
        return Err(SalvageError::Internal(
            format!("no usable tool definitions in {}", p.display()),
            tracing_error::SpanTrace::capture(),
        )
        .into());
    }
    Ok(Arc::new(registry))
}

pub fn render(result: &StreamParseResult, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(out)
}

/// Cumulative prefixes of `input`, one per line, ending with the full input
pub fn stream_steps(input: &str) -> Vec<&str> {
    let mut steps: Vec<&str> = input
        .match_indices('\n')
        .map(|(i, _)| &input[..=i])
        .collect();
    if steps.last().map(|s| s.len()) != Some(input.len()) {
        steps.push(input);
    }
    steps
}
