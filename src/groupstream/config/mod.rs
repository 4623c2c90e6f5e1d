//! Per-column row configuration.
//!
//! A [`RowConf`] is the plan built before any record is processed: for
//! each column, whether it is part of the grouping key or bound to one
//! aggregation function. Finalizing the plan assigns every aggregated
//! column its slot index in the per-group state collection; the grouping
//! engine and the dump path both read the same slot layout.

pub mod fieldspec;

pub use fieldspec::{parse_spec, FieldSpec};

use crate::groupstream::aggregate::AggrFunc;
use crate::groupstream::error::{GroupByError, GroupByResult};

/// Configuration for one column.
///
/// A column is aggregated iff `aggr` is set; otherwise its value is part
/// of the grouping key. Never both.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldConf {
    /// Whether folded values must be coerced to a signed integer first
    pub need_num: bool,
    /// The aggregation function bound to this column, if any
    pub aggr: Option<&'static AggrFunc>,
}

/// The ordered per-column plan for a run.
///
/// Built once from field-spec assignments, finalized once, then read-only
/// while records stream through.
#[derive(Debug, Clone)]
pub struct RowConf {
    fields: Vec<FieldConf>,
    /// Per column, its slot index in the per-group state collection
    aggr_slot: Vec<Option<usize>>,
    nb_aggr_slots: usize,
    finalized: bool,
}

impl RowConf {
    /// Create a plan where every column up to `max_columns` defaults to
    /// grouping-key membership
    pub fn new(max_columns: usize) -> Self {
        Self {
            fields: vec![FieldConf::default(); max_columns],
            aggr_slot: vec![None; max_columns],
            nb_aggr_slots: 0,
            finalized: false,
        }
    }

    /// Number of configured columns
    pub fn nb_columns(&self) -> usize {
        self.fields.len()
    }

    /// Bind one column (0-based) to an aggregation function, or clear it
    /// back to grouping-key membership with `None`
    pub fn assign(&mut self, column: usize, aggr: Option<&'static AggrFunc>) -> GroupByResult<()> {
        let nb_columns = self.fields.len();
        let conf = self.fields.get_mut(column).ok_or_else(|| {
            GroupByError::config_error(format!(
                "column {} out of range 1-{}",
                column + 1,
                nb_columns
            ))
        })?;
        conf.need_num = aggr.map_or(false, |a| a.need_num);
        conf.aggr = aggr;
        self.finalized = false;
        Ok(())
    }

    /// Apply one parsed field-spec assignment
    pub fn apply(&mut self, spec: &FieldSpec) -> GroupByResult<()> {
        for &column in &spec.columns {
            self.assign(column, spec.aggr)?;
        }
        Ok(())
    }

    /// Walk the columns in order and record, for every aggregated column,
    /// its slot index as the running count of preceding aggregated
    /// columns.
    ///
    /// Must run after all assignments and before any record is processed.
    /// The computation is deterministic: finalizing twice with no
    /// intervening assignment yields identical slots.
    pub fn finalize(&mut self) {
        let mut next_slot = 0;
        for (column, conf) in self.fields.iter().enumerate() {
            self.aggr_slot[column] = if conf.aggr.is_some() {
                let slot = next_slot;
                next_slot += 1;
                Some(slot)
            } else {
                None
            };
        }
        self.nb_aggr_slots = next_slot;
        self.finalized = true;
    }

    /// Whether `finalize` has run since the last assignment
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Configuration of one column; out-of-range columns read as default
    /// grouping members
    pub fn field(&self, column: usize) -> FieldConf {
        self.fields.get(column).copied().unwrap_or_default()
    }

    /// Slot index of an aggregated column, `None` for grouping members
    pub fn aggr_slot(&self, column: usize) -> Option<usize> {
        self.aggr_slot.get(column).copied().flatten()
    }

    /// Total number of aggregate slots per group
    pub fn nb_aggr_slots(&self) -> usize {
        self.nb_aggr_slots
    }

    /// The aggregation functions of all aggregated columns, in slot order
    pub fn aggregated_funcs(&self) -> impl Iterator<Item = &'static AggrFunc> + '_ {
        self.fields.iter().filter_map(|conf| conf.aggr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groupstream::aggregate::aggr_of_name;

    #[test]
    fn test_columns_default_to_grouping_members() {
        let conf = RowConf::new(4);
        for column in 0..4 {
            assert!(conf.field(column).aggr.is_none());
            assert!(!conf.field(column).need_num);
        }
    }

    #[test]
    fn test_assign_sets_numeric_flag_from_function() {
        let mut conf = RowConf::new(4);
        conf.assign(1, aggr_of_name("sum")).unwrap();
        conf.assign(2, aggr_of_name("last")).unwrap();
        assert!(conf.field(1).need_num);
        assert!(!conf.field(2).need_num);
    }

    #[test]
    fn test_assign_none_clears_back_to_grouping() {
        let mut conf = RowConf::new(4);
        conf.assign(1, aggr_of_name("sum")).unwrap();
        conf.assign(1, None).unwrap();
        assert!(conf.field(1).aggr.is_none());
        assert!(!conf.field(1).need_num);
    }

    #[test]
    fn test_assign_out_of_range_fails() {
        let mut conf = RowConf::new(4);
        assert!(conf.assign(4, aggr_of_name("sum")).is_err());
    }

    #[test]
    fn test_finalize_assigns_slots_in_column_order() {
        let mut conf = RowConf::new(5);
        conf.assign(1, aggr_of_name("sum")).unwrap();
        conf.assign(3, aggr_of_name("avg")).unwrap();
        conf.assign(4, aggr_of_name("last")).unwrap();
        conf.finalize();

        assert_eq!(conf.aggr_slot(0), None);
        assert_eq!(conf.aggr_slot(1), Some(0));
        assert_eq!(conf.aggr_slot(2), None);
        assert_eq!(conf.aggr_slot(3), Some(1));
        assert_eq!(conf.aggr_slot(4), Some(2));
        assert_eq!(conf.nb_aggr_slots(), 3);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut conf = RowConf::new(5);
        conf.assign(0, aggr_of_name("min")).unwrap();
        conf.assign(2, aggr_of_name("max")).unwrap();
        conf.finalize();
        let slots: Vec<_> = (0..5).map(|c| conf.aggr_slot(c)).collect();
        let total = conf.nb_aggr_slots();

        conf.finalize();
        assert_eq!(slots, (0..5).map(|c| conf.aggr_slot(c)).collect::<Vec<_>>());
        assert_eq!(total, conf.nb_aggr_slots());
    }

    #[test]
    fn test_assignment_invalidates_finalization() {
        let mut conf = RowConf::new(3);
        conf.finalize();
        assert!(conf.is_finalized());
        conf.assign(0, aggr_of_name("sum")).unwrap();
        assert!(!conf.is_finalized());
    }

    #[test]
    fn test_aggregated_funcs_follow_slot_order() {
        let mut conf = RowConf::new(4);
        conf.assign(3, aggr_of_name("max")).unwrap();
        conf.assign(0, aggr_of_name("min")).unwrap();
        conf.finalize();
        let names: Vec<_> = conf.aggregated_funcs().map(|f| f.name).collect();
        assert_eq!(names, vec!["min", "max"]);
    }
}
