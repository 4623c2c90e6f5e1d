//! Tagged per-column accumulator states.
//!
//! One group owns one state slot per aggregated column. A state is
//! constructed once when the group is created, mutated only through
//! [`AggrState::fold`], and rendered to text once at dump time through
//! [`AggrState::finalize`].

use std::borrow::Cow;

/// A typed field value handed to a fold.
///
/// Numeric columns coerce the field text to a signed integer before
/// folding; textual columns fold the raw bytes, borrowed for the duration
/// of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Coerced signed integer value
    Num(i64),
    /// Raw field bytes
    Bytes(&'a [u8]),
}

/// Accumulator state for one aggregated column of one group.
///
/// Numeric accumulators wrap on overflow. The textual variants use the
/// empty buffer as their "no value yet" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggrState {
    /// Running sum, starts at 0
    Sum(i64),
    /// Running minimum, starts at the maximum representable value
    Min(i64),
    /// Running maximum, starts at the minimum representable value
    Max(i64),
    /// Count and sum for a round-half-up average
    Avg { count: u64, sum: i64 },
    /// First value seen
    First(Vec<u8>),
    /// Most recent value seen
    Last(Vec<u8>),
    /// Byte-wise smallest value seen
    Smallest(Vec<u8>),
    /// Byte-wise greatest value seen
    Greatest(Vec<u8>),
    /// Discards every value
    Drop,
}

impl AggrState {
    /// Fold one value into the accumulator.
    ///
    /// The caller matches the value type to the state kind: numeric states
    /// receive `Num`, textual states receive `Bytes`. A mismatched fold is
    /// ignored.
    pub fn fold(&mut self, value: &FieldValue<'_>) {
        match (self, value) {
            (AggrState::Sum(acc), FieldValue::Num(v)) => *acc = acc.wrapping_add(*v),
            (AggrState::Min(acc), FieldValue::Num(v)) => *acc = (*acc).min(*v),
            (AggrState::Max(acc), FieldValue::Num(v)) => *acc = (*acc).max(*v),
            (AggrState::Avg { count, sum }, FieldValue::Num(v)) => {
                *count += 1;
                *sum = sum.wrapping_add(*v);
            }
            (AggrState::First(buf), FieldValue::Bytes(v)) => {
                if buf.is_empty() {
                    buf.extend_from_slice(v);
                }
            }
            (AggrState::Last(buf), FieldValue::Bytes(v)) => {
                buf.clear();
                buf.extend_from_slice(v);
            }
            (AggrState::Smallest(buf), FieldValue::Bytes(v)) => {
                if buf.is_empty() || *v < buf.as_slice() {
                    buf.clear();
                    buf.extend_from_slice(v);
                }
            }
            (AggrState::Greatest(buf), FieldValue::Bytes(v)) => {
                if buf.is_empty() || *v > buf.as_slice() {
                    buf.clear();
                    buf.extend_from_slice(v);
                }
            }
            (AggrState::Drop, _) => {}
            (state, value) => {
                debug_assert!(false, "fold type mismatch: {:?} <- {:?}", state, value);
            }
        }
    }

    /// Render the accumulated value as output text.
    ///
    /// Numeric states print their accumulator in decimal. The average is
    /// `(sum + count/2) / count`, a round-half-up integer division; an
    /// average that never received a value renders as empty text.
    pub fn finalize(&self) -> Cow<'_, [u8]> {
        match self {
            AggrState::Sum(acc) | AggrState::Min(acc) | AggrState::Max(acc) => {
                Cow::Owned(acc.to_string().into_bytes())
            }
            AggrState::Avg { count, sum } => {
                if *count == 0 {
                    Cow::Borrowed(&b""[..])
                } else {
                    let count = *count as i64;
                    let avg = sum.wrapping_add(count / 2) / count;
                    Cow::Owned(avg.to_string().into_bytes())
                }
            }
            AggrState::First(buf)
            | AggrState::Last(buf)
            | AggrState::Smallest(buf)
            | AggrState::Greatest(buf) => Cow::Borrowed(buf.as_slice()),
            AggrState::Drop => Cow::Borrowed(&b""[..]),
        }
    }
}
