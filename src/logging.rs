use crate::types::RecoveryPath;
use colored::*;
use std::panic;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// Install the global subscriber: env filter, stderr output, optional daily
/// log file, span traces for errors. The returned guard flushes the file writer.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => "salvage=info".into(),
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "salvage.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                ),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init();

    guard
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Unknown panic payload"
    }
}

/// Sets up a global panic hook that logs panics using tracing.
pub fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();
        let message = panic_message(panic_info.payload());
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(
            target: "panic",
            message = %message,
            location = %location,
            backtrace = %backtrace,
            "FATAL: Application panicked"
        );

        original_hook(panic_info);
    }));
}

/// Per-invocation counters for one `parse` call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseMetric {
    pub candidates: usize,
    pub generic_repaired: usize,
    pub schema_reconstructed: usize,
    pub failed: usize,
    pub already_resolved: usize,
    pub unknown_tools: Vec<String>,
}

impl ParseMetric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_candidate(&mut self) {
        self.candidates += 1;
    }

    pub fn record_success(&mut self, recovery: RecoveryPath) {
        match recovery {
            RecoveryPath::Generic => self.generic_repaired += 1,
            RecoveryPath::SchemaReconstructed => self.schema_reconstructed += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_unknown_tool(&mut self, name: &str) {
        self.failed += 1;
        self.unknown_tools.push(name.to_string());
    }

    pub fn record_already_resolved(&mut self) {
        self.already_resolved += 1;
    }

    pub fn extracted(&self) -> usize {
        self.generic_repaired + self.schema_reconstructed
    }

    pub fn log_summary(&self) {
        if !self.unknown_tools.is_empty() {
            warn!(
                target: "salvage::metrics",
                "{} {}",
                "[UNKNOWN TOOL]".bold().red(),
                self.unknown_tools.join(", ")
            );
        }

        if self.candidates == 0 {
            debug!(target: "salvage::metrics", "[PARSE] No candidates");
            return;
        }

        info!(
            target: "salvage::metrics",
            "[PARSE] Candidates: {} | Repaired: {} | Reconstructed: {} | Failed: {} | Resolved earlier: {}",
            self.candidates,
            self.generic_repaired,
            self.schema_reconstructed,
            self.failed,
            self.already_resolved
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_counts() {
        let mut metric = ParseMetric::new();
        metric.record_candidate();
        metric.record_candidate();
        metric.record_candidate();
        metric.record_success(RecoveryPath::Generic);
        metric.record_success(RecoveryPath::SchemaReconstructed);
        metric.record_unknown_tool("rm_rf");
        assert_eq!(metric.extracted(), 2);
        assert_eq!(metric.failed, 1);
        assert_eq!(metric.unknown_tools, vec!["rm_rf"]);
        metric.log_summary();
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));
        assert_eq!(panic_message(owned.as_ref()), "boom");
        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "Unknown panic payload");
    }
}
