//! Grouping engine.
//!
//! The engine sits behind the parser's [`RecordSink`] events: it copies
//! each field of the current record into a per-record arena, and on the
//! record boundary builds the grouping key, finds or creates the group,
//! and folds every aggregated column's value into that group's state
//! slots. Once the input is exhausted, [`GroupingEngine::dump`] renders
//! one output row per group.
//!
//! [`group_by`] wires the whole pipeline together: byte source, parser,
//! engine, byte sink.

pub mod table;

pub use table::{Group, GroupTable, GROUP_HASH_SIZE};

use log::warn;
use std::io::{Read, Write};

use crate::groupstream::aggregate::FieldValue;
use crate::groupstream::config::RowConf;
use crate::groupstream::csv::{CsvConfig, CsvParser, RecordSink};
use crate::groupstream::error::{GroupByError, GroupByResult};

/// Totals of one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupByStats {
    /// Records parsed from the input
    pub records: u64,
    /// Distinct groups emitted
    pub groups: usize,
}

/// Streaming group accumulation over parsed records.
///
/// Field slices handed to the sink borrow the parser's buffer, so the
/// engine copies them into its own arena before returning; nothing of a
/// record outlives `end_of_record` except what the groups own.
pub struct GroupingEngine<'a> {
    conf: &'a RowConf,
    delimiter: u8,
    /// Hard bound on a single grouping key
    max_key_size: usize,
    table: GroupTable,
    records: u64,
    /// Arena of the current record's field bytes
    field_buf: Vec<u8>,
    /// End offset of each field in `field_buf`
    field_ends: Vec<usize>,
    key_buf: Vec<u8>,
}

impl<'a> GroupingEngine<'a> {
    /// Create an engine over a finalized row configuration.
    pub fn new(conf: &'a RowConf, csv: &CsvConfig) -> Self {
        debug_assert!(conf.is_finalized());
        Self {
            conf,
            delimiter: csv.delimiter,
            max_key_size: conf.nb_columns().saturating_mul(csv.max_record_size),
            table: GroupTable::new(),
            records: 0,
            field_buf: Vec::new(),
            field_ends: Vec::new(),
            key_buf: Vec::new(),
        }
    }

    /// Records processed so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// The group table accumulated so far
    pub fn table(&self) -> &GroupTable {
        &self.table
    }

    /// Render one output row per group, in bucket order: grouping-key
    /// values and finalized aggregates interleaved in original column
    /// order, joined by the delimiter.
    pub fn dump<W: Write>(&self, out: &mut W) -> GroupByResult<()> {
        let mut line = Vec::new();
        for group in self.table.iter() {
            line.clear();
            let mut keys = group.key_values();
            for column in 0..group.max_fields_seen {
                if column > 0 {
                    line.push(self.delimiter);
                }
                match self.conf.aggr_slot(column) {
                    Some(slot) => {
                        let text = group.aggrs[slot].finalize();
                        write_field(&mut line, &text, self.delimiter);
                    }
                    None => {
                        write_field(&mut line, keys.next().unwrap_or_default(), self.delimiter)
                    }
                }
            }
            line.push(b'\n');
            out.write_all(&line)?;
        }
        Ok(())
    }

    /// The field bytes of the current record, in order.
    fn record_fields<'b>(field_buf: &'b [u8], field_ends: &[usize]) -> Vec<&'b [u8]> {
        let mut fields = Vec::with_capacity(field_ends.len());
        let mut start = 0;
        for &end in field_ends {
            fields.push(&field_buf[start..end]);
            start = end;
        }
        fields
    }
}

impl RecordSink for GroupingEngine<'_> {
    fn field(&mut self, value: &[u8]) -> GroupByResult<()> {
        if self.field_ends.len() >= self.conf.nb_columns() {
            return Err(GroupByError::config_error(format!(
                "line {}: record has more than the configured maximum of {} fields",
                self.records + 1,
                self.conf.nb_columns()
            )));
        }
        self.field_buf.extend_from_slice(value);
        self.field_ends.push(self.field_buf.len());
        Ok(())
    }

    fn end_of_record(&mut self) -> GroupByResult<()> {
        self.records += 1;
        let fields = Self::record_fields(&self.field_buf, &self.field_ends);

        self.key_buf.clear();
        for (column, &bytes) in fields.iter().enumerate() {
            if self.conf.field(column).aggr.is_none() {
                self.key_buf.extend_from_slice(bytes);
                self.key_buf.push(0);
            }
        }
        if self.key_buf.len() > self.max_key_size {
            return Err(GroupByError::resource_error(
                "grouping key",
                format!(
                    "line {}: key of {} bytes exceeds the {} byte maximum",
                    self.records,
                    self.key_buf.len(),
                    self.max_key_size
                ),
            ));
        }

        let group = self.table.find_or_create(&self.key_buf, self.conf);
        if fields.len() > group.max_fields_seen {
            group.max_fields_seen = fields.len();
        }

        for (column, &bytes) in fields.iter().enumerate() {
            let conf = self.conf.field(column);
            let slot = match self.conf.aggr_slot(column) {
                Some(slot) => slot,
                None => continue,
            };
            let value = if conf.need_num {
                match parse_field_num(bytes) {
                    Some(num) => FieldValue::Num(num),
                    None => {
                        warn!(
                            "line {}: field {}: cannot make a number of '{}', \
                             skipping remaining aggregates for this record",
                            self.records,
                            column + 1,
                            String::from_utf8_lossy(bytes)
                        );
                        break;
                    }
                }
            } else {
                FieldValue::Bytes(bytes)
            };
            group.aggrs[slot].fold(&value);
        }

        self.field_buf.clear();
        self.field_ends.clear();
        Ok(())
    }
}

/// Coerce field text to a signed integer: optional surrounding ASCII
/// whitespace around a decimal integer, nothing else.
fn parse_field_num(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

/// Append one output field, wrapped in quotes when it contains the
/// delimiter, a quote, or a newline. Embedded quotes are not escaped.
fn write_field(out: &mut Vec<u8>, value: &[u8], delimiter: u8) {
    let needs_quoting = value
        .iter()
        .any(|&b| b == delimiter || b == b'"' || b == b'\n');
    if needs_quoting {
        out.push(b'"');
        out.extend_from_slice(value);
        out.push(b'"');
    } else {
        out.extend_from_slice(value);
    }
}

/// Run the full pipeline: parse `input`, accumulate groups, dump one row
/// per group into `output`.
///
/// The row configuration must have been finalized.
pub fn group_by<R: Read, W: Write>(
    input: R,
    mut output: W,
    conf: &RowConf,
    csv: &CsvConfig,
) -> GroupByResult<GroupByStats> {
    if !conf.is_finalized() {
        return Err(GroupByError::config_error(
            "row configuration must be finalized before processing",
        ));
    }
    let mut parser = CsvParser::new(input, csv)?;
    let mut engine = GroupingEngine::new(conf, csv);
    parser.parse(&mut engine)?;
    engine.dump(&mut output)?;
    output.flush()?;
    Ok(GroupByStats {
        records: engine.records,
        groups: engine.table.len(),
    })
}
