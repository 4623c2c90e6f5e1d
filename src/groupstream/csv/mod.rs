//! Streaming delimited-text record parser.
//!
//! This module turns a byte stream into a sequence of field and
//! end-of-record events without ever buffering more than a bounded sliding
//! window. It provides:
//!
//! - [`CsvParser`] - the single-pass parser over any [`std::io::Read`]
//! - [`RecordSink`] - the callback trait receiving field/record events
//! - [`CsvConfig`] - delimiter and record-size configuration
//! - [`CsvError`] - fatal parsing failures
//!
//! Field values are delivered as borrowed slices into the parser's live
//! buffer and are only valid for the duration of the callback; a sink that
//! needs a value after returning must copy it out.

pub mod config;
pub mod error;
pub mod parser;

pub use config::CsvConfig;
pub use error::CsvError;
pub use parser::{CsvParser, RecordSink};
