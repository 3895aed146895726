use crate::constants::DEFAULT_MAX_BUFFER_BYTES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Fall back to schema-aware reconstruction when the cascade fails
    pub enable_schema_reconstruction: bool,
    /// Larger buffers are passed through untouched
    pub max_buffer_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl ParserConfig {
    /// Build from `SALVAGE_SCHEMA_RECONSTRUCTION` and `SALVAGE_MAX_BUFFER_BYTES`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enable_schema_reconstruction = match lookup("SALVAGE_SCHEMA_RECONSTRUCTION")
            .unwrap_or_else(|| "on".to_string())
            .to_lowercase()
            .as_str()
        {
            "off" | "false" | "0" | "no" => false,
            _ => true,
        };

        let max_buffer_bytes = match lookup("SALVAGE_MAX_BUFFER_BYTES").map(|v| v.trim().parse::<usize>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                tracing::warn!(
                    "[CONFIG] Ignoring invalid SALVAGE_MAX_BUFFER_BYTES, using {}",
                    DEFAULT_MAX_BUFFER_BYTES
                );
                DEFAULT_MAX_BUFFER_BYTES
            }
            None => DEFAULT_MAX_BUFFER_BYTES,
        };

        Self {
            enable_schema_reconstruction,
            max_buffer_bytes,
        }
    }
}
