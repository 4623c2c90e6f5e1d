//! Fixed-bucket chained group table.
//!
//! The table is an array of `GROUP_HASH_SIZE` buckets, each an append-only
//! chain of groups. It is never resized or rehashed; chain length grows
//! with the number of distinct keys. The table exclusively owns every
//! group for the duration of the run.

use log::debug;
use std::hash::Hasher;

use crate::groupstream::aggregate::AggrState;
use crate::groupstream::config::RowConf;

/// Number of hash buckets. Fixed for the lifetime of a table.
pub const GROUP_HASH_SIZE: usize = 16384;

/// One group: its owned key, the aggregate state slots, and the widest
/// field count seen across its records.
#[derive(Debug)]
pub struct Group {
    /// Grouping-key values concatenated in column order, each terminated
    /// by a zero byte
    pub key: Vec<u8>,
    /// Highest field count observed across all records of this group
    pub max_fields_seen: usize,
    /// One accumulator per aggregated column, in slot order
    pub aggrs: Vec<AggrState>,
}

impl Group {
    fn new(key: Vec<u8>, conf: &RowConf) -> Self {
        Self {
            key,
            max_fields_seen: 0,
            aggrs: conf.aggregated_funcs().map(|f| f.new_state()).collect(),
        }
    }

    /// Split the stored key back into the ordered grouping-key values.
    pub fn key_values(&self) -> impl Iterator<Item = &[u8]> {
        // every value is zero-terminated, so drop the final empty split
        let values = match self.key.last() {
            Some(0) => &self.key[..self.key.len() - 1],
            _ => &self.key[..],
        };
        values.split(|&b| b == 0)
    }
}

/// The hash table of all groups.
pub struct GroupTable {
    buckets: Vec<Vec<Group>>,
    len: usize,
}

impl GroupTable {
    pub fn new() -> Self {
        Self {
            buckets: (0..GROUP_HASH_SIZE).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    /// Number of distinct groups seen so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mix the key bytes down to a bucket index.
    ///
    /// `DefaultHasher::new()` uses fixed keys, so bucket placement is
    /// deterministic across runs.
    fn bucket_of(key: &[u8]) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        hasher.write(key);
        hasher.finish() as usize % GROUP_HASH_SIZE
    }

    /// Find the group with a byte-exact key match, creating it on first
    /// sight. A group lives for the remainder of the run once created.
    pub fn find_or_create(&mut self, key: &[u8], conf: &RowConf) -> &mut Group {
        let bucket = &mut self.buckets[Self::bucket_of(key)];
        let pos = match bucket.iter().position(|g| g.key.as_slice() == key) {
            Some(pos) => pos,
            None => {
                bucket.push(Group::new(key.to_vec(), conf));
                self.len += 1;
                if self.len & 0xfff == 0 {
                    debug!("{} groups", self.len);
                }
                bucket.len() - 1
            }
        };
        &mut bucket[pos]
    }

    /// Visit every group in bucket order. No relation to input encounter
    /// order is guaranteed.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.buckets.iter().flatten()
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new()
    }
}
