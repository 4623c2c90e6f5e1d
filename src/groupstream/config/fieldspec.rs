//! Field-spec parsing.
//!
//! One assignment has the form `RANGES[:FUNC]`. `RANGES` is a
//! comma-separated union of 1-based column ranges: a single column `N`, an
//! inclusive range `N-M` (reversed bounds are normalised), and the
//! open-ended forms `N-` (through the last column) and `-M` (from the
//! first). A leading `!` negates the whole union: every column *except*
//! the named ones. `FUNC` names an aggregation function,
//! case-insensitively; when omitted, the named columns are cleared back to
//! grouping-key membership.
//!
//! Examples: `2:sum`, `2-4,6:avg`, `!1:last`, `3-:drop`, `1-2`.

use crate::groupstream::aggregate::{aggr_of_name, AggrFunc};
use crate::groupstream::error::{GroupByError, GroupByResult};

/// One resolved field-spec assignment: which columns (0-based), and which
/// function, if any.
#[derive(Debug)]
pub struct FieldSpec {
    /// 0-based indices of the columns this assignment touches
    pub columns: Vec<usize>,
    /// Function to bind, or `None` to clear back to grouping membership
    pub aggr: Option<&'static AggrFunc>,
}

/// Parse one `RANGES[:FUNC]` assignment against a column bound.
pub fn parse_spec(spec: &str, max_columns: usize) -> GroupByResult<FieldSpec> {
    let (ranges, func) = match spec.split_once(':') {
        Some((ranges, func)) => (ranges, Some(func)),
        None => (spec, None),
    };

    let aggr = match func {
        Some(name) => Some(aggr_of_name(name).ok_or_else(|| {
            GroupByError::config_error(format!("unknown aggregation function '{}'", name))
        })?),
        None => None,
    };

    let (ranges, negated) = match ranges.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (ranges, false),
    };

    let mut mask = vec![false; max_columns];
    parse_ranges(spec, ranges, &mut mask)?;
    if negated {
        for selected in &mut mask {
            *selected = !*selected;
        }
    }

    let columns = mask
        .iter()
        .enumerate()
        .filter(|(_, &selected)| selected)
        .map(|(column, _)| column)
        .collect();

    Ok(FieldSpec { columns, aggr })
}

/// Mark the columns of `item,rest` in the mask, recursing on the rest of
/// the union.
fn parse_ranges(spec: &str, ranges: &str, mask: &mut [bool]) -> GroupByResult<()> {
    let (item, rest) = match ranges.split_once(',') {
        Some((item, rest)) => (item, Some(rest)),
        None => (ranges, None),
    };

    let (first, last) = parse_item(spec, item, mask.len())?;
    let (first, last) = if last < first { (last, first) } else { (first, last) };
    for column in first..=last {
        mask[column - 1] = true;
    }

    match rest {
        Some(rest) => parse_ranges(spec, rest, mask),
        None => Ok(()),
    }
}

/// Parse one union item into inclusive 1-based bounds.
fn parse_item(spec: &str, item: &str, max_columns: usize) -> GroupByResult<(usize, usize)> {
    if item.is_empty() {
        return Err(bad_spec(spec, "empty column range"));
    }
    match item.split_once('-') {
        None => {
            let column = parse_column(spec, item, max_columns)?;
            Ok((column, column))
        }
        Some((first, last)) => {
            let first = if first.is_empty() {
                1
            } else {
                parse_column(spec, first, max_columns)?
            };
            let last = if last.is_empty() {
                max_columns
            } else {
                parse_column(spec, last, max_columns)?
            };
            Ok((first, last))
        }
    }
}

fn parse_column(spec: &str, text: &str, max_columns: usize) -> GroupByResult<usize> {
    let column: usize = text
        .parse()
        .map_err(|_| bad_spec(spec, &format!("'{}' is not a column number", text)))?;
    if column == 0 || column > max_columns {
        return Err(bad_spec(
            spec,
            &format!("column {} out of range 1-{}", column, max_columns),
        ));
    }
    Ok(column)
}

fn bad_spec(spec: &str, reason: &str) -> GroupByError {
    GroupByError::config_error(format!("bad field spec '{}': {}", spec, reason))
}
