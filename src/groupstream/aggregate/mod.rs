//! Aggregation function framework.
//!
//! This module holds the fixed catalog of aggregation behaviors and the
//! per-group state slots they operate on. It provides:
//!
//! - [`AggrFunc`] - one stateless catalog entry (name, numeric flag,
//!   state constructor)
//! - [`AGGR_FUNCS`] / [`aggr_of_name`] - the catalog and case-insensitive
//!   lookup
//! - [`AggrState`] - the tagged per-column accumulator, one variant per
//!   function kind
//! - [`FieldValue`] - the typed value folded into a state
//!
//! Catalog entries are shared by every group that uses them; all mutable
//! state lives in the per-group [`AggrState`] slots.

pub mod state;

pub use state::{AggrState, FieldValue};

/// Which aggregation behavior a catalog entry constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggrKind {
    Sum,
    Min,
    Max,
    Avg,
    First,
    Last,
    Smallest,
    Greatest,
    Drop,
}

/// One entry of the aggregation function catalog.
///
/// Entries are stateless and reentrant across groups: `new_state` hands
/// out a fresh accumulator, and folding/finalizing happen on that state.
#[derive(Debug)]
pub struct AggrFunc {
    /// Function name as written in field specs
    pub name: &'static str,
    /// Whether folded values must first be coerced to a signed integer
    pub need_num: bool,
    kind: AggrKind,
}

impl AggrFunc {
    /// Construct the initial accumulator state for one column slot
    pub fn new_state(&self) -> AggrState {
        match self.kind {
            AggrKind::Sum => AggrState::Sum(0),
            AggrKind::Min => AggrState::Min(i64::MAX),
            AggrKind::Max => AggrState::Max(i64::MIN),
            AggrKind::Avg => AggrState::Avg { count: 0, sum: 0 },
            AggrKind::First => AggrState::First(Vec::new()),
            AggrKind::Last => AggrState::Last(Vec::new()),
            AggrKind::Smallest => AggrState::Smallest(Vec::new()),
            AggrKind::Greatest => AggrState::Greatest(Vec::new()),
            AggrKind::Drop => AggrState::Drop,
        }
    }
}

/// The fixed aggregation function catalog.
pub const AGGR_FUNCS: &[AggrFunc] = &[
    AggrFunc {
        name: "sum",
        need_num: true,
        kind: AggrKind::Sum,
    },
    AggrFunc {
        name: "min",
        need_num: true,
        kind: AggrKind::Min,
    },
    AggrFunc {
        name: "max",
        need_num: true,
        kind: AggrKind::Max,
    },
    AggrFunc {
        name: "avg",
        need_num: true,
        kind: AggrKind::Avg,
    },
    AggrFunc {
        name: "first",
        need_num: false,
        kind: AggrKind::First,
    },
    AggrFunc {
        name: "last",
        need_num: false,
        kind: AggrKind::Last,
    },
    AggrFunc {
        name: "smallest",
        need_num: false,
        kind: AggrKind::Smallest,
    },
    AggrFunc {
        name: "greatest",
        need_num: false,
        kind: AggrKind::Greatest,
    },
    AggrFunc {
        name: "drop",
        need_num: false,
        kind: AggrKind::Drop,
    },
];

/// Case-insensitive catalog lookup
pub fn aggr_of_name(name: &str) -> Option<&'static AggrFunc> {
    AGGR_FUNCS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}
