/// Confidence tiers of the repair cascade
pub const CONFIDENCE_STRICT: f64 = 1.0;
pub const CONFIDENCE_CONTROL_ESCAPED: f64 = 1.0;
pub const CONFIDENCE_ALTERNATIVE: f64 = 0.9;
pub const CONFIDENCE_COMMON_MISTAKES: f64 = 0.8;
pub const CONFIDENCE_NATIVE_FALLBACK: f64 = 1.0;

/// Ceiling for anything that went through schema-aware reconstruction
pub const CONFIDENCE_RECONSTRUCTED: f64 = 0.8;

/// Key carrying the list of inferred fields inside a reconstructed object
pub const INFERRED_FIELDS_KEY: &str = "_inferredFields";

pub const DEFAULT_MAX_BUFFER_BYTES: usize = 8 * 1024 * 1024;

/// Extensions that make a string look like a file path during field inference
pub const SOURCE_FILE_EXTENSIONS: &[&str] = &[
    ".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".json", ".css", ".scss", ".html", ".md",
    ".py", ".rs", ".go", ".java", ".vue", ".svelte", ".yml", ".yaml", ".toml", ".sh", ".sql",
    ".txt", ".env",
];

/// Tokens that make a string look like source code during field inference
pub const CODE_MARKERS: &[&str] = &[
    "import ", "export ", "function", "const ", "let ", "class ", "return ", "=>", "def ",
    "fn ", "{", "}", "<div", "</",
];

/// Fields whose missing value is inferred from path-like strings
pub const PATH_LIKE_FIELDS: &[&str] = &["path", "newPath", "filePath", "file_path", "target"];

/// Fields whose missing value is inferred from code-like strings
pub const CONTENT_LIKE_FIELDS: &[&str] = &["content", "code", "text"];

/// Fence info strings accepted as JSON payloads
pub const FENCE_LANGUAGES: &[&str] = &["", "json", "jsonc", "json5"];
