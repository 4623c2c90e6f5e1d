//! Record Parser Configuration

use serde::{Deserialize, Serialize};

/// Configuration for the streaming record parser.
///
/// `max_record_size` is the hard upper bound on a single record, quoted or
/// not; the parser allocates a sliding window of twice this size so that a
/// full record of lookahead is always available after a record boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter byte
    pub delimiter: u8,

    /// Maximum size of a single record in bytes
    pub max_record_size: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_record_size: 65536,
        }
    }
}

impl CsvConfig {
    /// Create a configuration with the given delimiter and the default
    /// record size limit
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }
}
