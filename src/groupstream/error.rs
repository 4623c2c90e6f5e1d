/*!
# Error Handling

This module provides the error types shared by the whole engine. All
operations that can fail return well-structured errors with enough context
to report the failure to the user.

## Error Categories

- **Parse Errors**: fatal record parsing failures, wrapping [`CsvError`]
- **Configuration Errors**: invalid field specs, unknown aggregation
  functions, out-of-range column numbers
- **I/O Errors**: failures of the byte source or sink
- **Resource Errors**: a configured limit was exceeded while processing

Per-record numeric coercion failures are *not* represented here: they are
recoverable, reported as diagnostics, and never abort the run.

## Examples

```rust
use groupstream::GroupByError;

let error = GroupByError::config_error("unknown aggregation function 'med'");
println!("{}", error); // "Configuration error: unknown aggregation function 'med'"
```
*/

use std::fmt;

use crate::groupstream::csv::CsvError;

/// Error type for group-by configuration and execution.
///
/// Each variant includes the context relevant to its category. Parse-level
/// failures keep their original [`CsvError`] so callers can match on the
/// precise parsing condition.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupByError {
    /// Fatal record parsing failure.
    ParseError(CsvError),

    /// Invalid configuration: malformed field spec, unknown aggregation
    /// function, column number out of the configured bounds.
    ConfigError {
        /// Human-readable description of the configuration problem
        message: String,
    },

    /// The byte source or sink failed.
    IoError {
        /// Description of the I/O failure
        message: String,
    },

    /// A configured limit was exceeded while processing.
    ResourceError {
        /// Name of the limited resource (e.g. "grouping key")
        resource: String,
        /// Description of how the limit was exceeded
        message: String,
    },
}

impl fmt::Display for GroupByError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupByError::ParseError(err) => write!(f, "{}", err),
            GroupByError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            GroupByError::IoError { message } => write!(f, "I/O error: {}", message),
            GroupByError::ResourceError { resource, message } => {
                write!(f, "Resource error for {}: {}", resource, message)
            }
        }
    }
}

impl std::error::Error for GroupByError {}

impl GroupByError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        GroupByError::ConfigError {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io_error(message: impl Into<String>) -> Self {
        GroupByError::IoError {
            message: message.into(),
        }
    }

    /// Create a resource error
    pub fn resource_error(resource: impl Into<String>, message: impl Into<String>) -> Self {
        GroupByError::ResourceError {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

impl From<CsvError> for GroupByError {
    fn from(err: CsvError) -> Self {
        GroupByError::ParseError(err)
    }
}

impl From<std::io::Error> for GroupByError {
    fn from(err: std::io::Error) -> Self {
        GroupByError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type for group-by operations
pub type GroupByResult<T> = Result<T, GroupByError>;
