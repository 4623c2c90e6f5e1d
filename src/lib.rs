//! # groupstream
//!
//! Single-pass streaming group-by aggregation over delimited text.
//!
//! `groupstream` reads delimited records from any byte source, partitions
//! them into groups by a subset of columns, and incrementally folds the
//! remaining columns through per-column aggregation functions, emitting
//! one output row per group. Memory grows with the number of distinct
//! groups, never with the number of input rows.
//!
//! ## Features
//!
//! - **Bounded streaming parser**: a sliding-window buffer sized to the
//!   configured maximum record length, with quoted-field support
//! - **Incremental aggregation**: sum, min, max, avg, first, last,
//!   smallest, greatest and drop, folded record by record
//! - **Field-spec assignments**: `2-4,6:sum` style column ranges with
//!   unions, open ends and negation
//! - **Recoverable numeric errors**: a malformed number skips one
//!   record's aggregates and the run keeps streaming
//!
//! ## Quick Start
//!
//! ```rust
//! use groupstream::{group_by, parse_spec, CsvConfig, RowConf};
//!
//! fn main() -> Result<(), groupstream::GroupByError> {
//!     let mut conf = RowConf::new(16);
//!     conf.apply(&parse_spec("2:sum", 16)?)?;
//!     conf.finalize();
//!
//!     let input = &b"a,1\nb,2\na,3\n"[..];
//!     let mut output = Vec::new();
//!     let stats = group_by(input, &mut output, &conf, &CsvConfig::default())?;
//!     assert_eq!(stats.records, 3);
//!     assert_eq!(stats.groups, 2);
//!     Ok(())
//! }
//! ```

pub mod groupstream;

// Re-export the whole public surface at the crate root
pub use groupstream::{
    aggr_of_name, group_by, parse_spec, AggrFunc, AggrState, CsvConfig, CsvError, CsvParser,
    FieldSpec, FieldValue, GroupByError, GroupByResult, GroupByStats, GroupingEngine, RecordSink,
    RowConf, AGGR_FUNCS,
};
