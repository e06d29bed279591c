//! World State
//!
//! Versioned key-value state of the channel, partitioned by namespace, plus the
//! read/write sets a transaction accumulates while it is simulated.
//!
//! Commit follows multi-version concurrency control: every key read (and every
//! range scanned) during simulation must still carry the version observed, or
//! the whole transaction is rejected and none of its writes are applied.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::Serialize;

use super::LedgerError;

/// Height at which a value was committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub block_num: u64,
    pub tx_num: u64,
}

#[derive(Debug, Clone)]
struct VersionedValue {
    value: Vec<u8>,
    version: Version,
}

/// Entry returned by committed range scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedEntry {
    pub key: String,
    pub value: Vec<u8>,
    pub version: Version,
}

/// Range observed during simulation, re-checked at commit for phantoms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    pub namespace: String,
    pub start: String,
    pub end: String,
    pub observed: Vec<(String, Version)>,
}

/// Reads and staged writes of one transaction
#[derive(Debug, Clone, Default)]
pub struct ReadWriteSet {
    reads: BTreeMap<(String, String), Option<Version>>,
    range_reads: Vec<RangeRead>,
    writes: BTreeMap<(String, String), Vec<u8>>,
}

impl ReadWriteSet {
    /// Record the version observed for a key. The first observation wins.
    pub fn record_read(&mut self, namespace: &str, key: &str, version: Option<Version>) {
        self.reads
            .entry((namespace.to_string(), key.to_string()))
            .or_insert(version);
    }

    pub fn record_range_read(&mut self, range: RangeRead) {
        self.range_reads.push(range);
    }

    /// Stage a write. A later write to the same key replaces the earlier one.
    pub fn record_write(&mut self, namespace: &str, key: &str, value: Vec<u8>) {
        self.writes
            .insert((namespace.to_string(), key.to_string()), value);
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.len()
    }
}

/// Committed state of every namespace on the channel
#[derive(Debug, Default)]
pub struct WorldState {
    namespaces: BTreeMap<String, BTreeMap<String, VersionedValue>>,
    height: u64,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed blocks
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Number of keys committed in a namespace
    pub fn key_count(&self, namespace: &str) -> usize {
        self.namespaces.get(namespace).map_or(0, BTreeMap::len)
    }

    /// Committed value and version of a key
    pub fn get(&self, namespace: &str, key: &str) -> Option<(&[u8], Version)> {
        self.namespaces
            .get(namespace)?
            .get(key)
            .map(|v| (v.value.as_slice(), v.version))
    }

    /// Committed entries with `start <= key < end`; an empty `end` is unbounded
    pub fn range(&self, namespace: &str, start: &str, end: &str) -> Vec<VersionedEntry> {
        let Some(entries) = self.namespaces.get(namespace) else {
            return Vec::new();
        };

        let upper = if end.is_empty() {
            Bound::Unbounded
        } else if end <= start {
            return Vec::new();
        } else {
            Bound::Excluded(end)
        };

        entries
            .range::<str, _>((Bound::Included(start), upper))
            .map(|(key, v)| VersionedEntry {
                key: key.clone(),
                value: v.value.clone(),
                version: v.version,
            })
            .collect()
    }

    /// Check that everything the transaction read is still current
    pub fn validate(&self, rw_set: &ReadWriteSet) -> Result<(), LedgerError> {
        for ((namespace, key), observed) in &rw_set.reads {
            let current = self.get(namespace, key).map(|(_, version)| version);
            if current != *observed {
                return Err(LedgerError::MvccReadConflict {
                    namespace: namespace.clone(),
                    key: key.clone(),
                });
            }
        }

        for range in &rw_set.range_reads {
            let current: Vec<(String, Version)> = self
                .range(&range.namespace, &range.start, &range.end)
                .into_iter()
                .map(|entry| (entry.key, entry.version))
                .collect();
            if current != range.observed {
                return Err(LedgerError::PhantomReadConflict {
                    namespace: range.namespace.clone(),
                    start: range.start.clone(),
                    end: range.end.clone(),
                });
            }
        }

        Ok(())
    }

    /// Apply a validated write set as one new block. Returns the block number.
    pub fn commit(&mut self, rw_set: ReadWriteSet) -> u64 {
        self.height += 1;
        let version = Version {
            block_num: self.height,
            tx_num: 0,
        };

        for ((namespace, key), value) in rw_set.writes {
            self.namespaces
                .entry(namespace)
                .or_default()
                .insert(key, VersionedValue { value, version });
        }

        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(pairs: &[(&str, &str, &str)]) -> WorldState {
        let mut state = WorldState::new();
        let mut rw_set = ReadWriteSet::default();
        for (namespace, key, value) in pairs {
            rw_set.record_write(namespace, key, value.as_bytes().to_vec());
        }
        state.commit(rw_set);
        state
    }

    #[test]
    fn test_commit_assigns_block_version() {
        let state = committed(&[("events", "e1", "v1")]);

        let (value, version) = state.get("events", "e1").unwrap();
        assert_eq!(value, b"v1");
        assert_eq!(version.block_num, 1);
        assert_eq!(state.height(), 1);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let state = committed(&[("events", "k", "a")]);

        assert!(state.get("tickets", "k").is_none());
        assert_eq!(state.key_count("events"), 1);
        assert_eq!(state.key_count("tickets"), 0);
    }

    #[test]
    fn test_range_is_half_open() {
        let state = committed(&[("ns", "a", "1"), ("ns", "b", "2"), ("ns", "c", "3")]);

        let keys: Vec<String> = state
            .range("ns", "a", "c")
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        assert_eq!(state.range("ns", "b", "").len(), 2);
        assert!(state.range("ns", "c", "a").is_empty());
    }

    #[test]
    fn test_stale_read_is_rejected() {
        let mut state = committed(&[("events", "e1", "v1")]);
        let observed = state.get("events", "e1").map(|(_, v)| v);

        // Someone else updates e1
        let mut other = ReadWriteSet::default();
        other.record_write("events", "e1", b"v2".to_vec());
        state.commit(other);

        let mut mine = ReadWriteSet::default();
        mine.record_read("events", "e1", observed);
        mine.record_write("events", "e1", b"v3".to_vec());

        assert!(matches!(
            state.validate(&mine),
            Err(LedgerError::MvccReadConflict { .. })
        ));
    }

    #[test]
    fn test_absent_key_created_concurrently_is_rejected() {
        let mut state = WorldState::new();

        let mut mine = ReadWriteSet::default();
        mine.record_read("tickets", "t1", None);
        mine.record_write("tickets", "t1", b"mine".to_vec());

        let mut other = ReadWriteSet::default();
        other.record_write("tickets", "t1", b"theirs".to_vec());
        state.commit(other);

        assert!(state.validate(&mine).is_err());
    }

    #[test]
    fn test_phantom_in_scanned_range_is_rejected() {
        let mut state = committed(&[("ns", "a1", "x")]);
        let observed = state
            .range("ns", "a", "b")
            .into_iter()
            .map(|e| (e.key, e.version))
            .collect();

        let mut insert = ReadWriteSet::default();
        insert.record_write("ns", "a2", b"y".to_vec());
        state.commit(insert);

        let mut mine = ReadWriteSet::default();
        mine.record_range_read(RangeRead {
            namespace: "ns".to_string(),
            start: "a".to_string(),
            end: "b".to_string(),
            observed,
        });

        assert!(matches!(
            state.validate(&mine),
            Err(LedgerError::PhantomReadConflict { .. })
        ));
    }

    #[test]
    fn test_first_observed_version_wins() {
        let mut rw_set = ReadWriteSet::default();
        rw_set.record_read("ns", "k", None);
        rw_set.record_read(
            "ns",
            "k",
            Some(Version {
                block_num: 7,
                tx_num: 0,
            }),
        );

        assert_eq!(rw_set.read_count(), 1);
        assert!(WorldState::new().validate(&rw_set).is_ok());
    }
}
