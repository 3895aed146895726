pub mod assembler;
pub mod block_locator;
pub mod config;
pub mod constants;
pub mod json_repair;
pub mod logging;
pub mod main_helper;
pub mod scanner;
pub mod schema_repair;
pub mod str_utils;
pub mod stream_parser;
pub mod tool_schema;
pub mod types;

pub use types::*;

pub use assembler::ToolCallAssembler;
pub use block_locator::BlockLocator;
pub use config::ParserConfig;
pub use json_repair::GenericRepairCascade;
pub use schema_repair::SchemaAwareReconstructor;
pub use stream_parser::{IncrementalParser, StreamParser};
pub use tool_schema::{FieldType, ToolSchema, ToolSchemaRegistry};
