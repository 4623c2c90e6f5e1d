pub mod aggregate;
pub mod config;
pub mod csv;
pub mod engine;
pub mod error;

// Re-export the main surface for binaries and tests
pub use aggregate::{aggr_of_name, AggrFunc, AggrState, FieldValue, AGGR_FUNCS};
pub use config::{parse_spec, FieldSpec, RowConf};
pub use csv::{CsvConfig, CsvError, CsvParser, RecordSink};
pub use engine::{group_by, GroupByStats, GroupingEngine};
pub use error::{GroupByError, GroupByResult};
