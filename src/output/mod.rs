//! Serialization, validation and atomic writing of results.

mod event;
mod json;
mod schema;
mod writer;

pub use event::{LogEvent, LogEventEnvelope};
pub use json::{to_json, JsonFormat};
pub use schema::SchemaValidator;
pub use writer::{output_path_for, write_atomic, OutputWriter};
