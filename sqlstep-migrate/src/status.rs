//! Reconciliation of on-disk sources against the bookkeeping table.

use std::collections::{BTreeMap, HashSet};

use crate::error::MigrationError;
use crate::source::Source;

/// Per-invocation view of a section. Indices point into the owning source list.
#[derive(Debug, Default)]
pub struct Status {
    /// Highest applied version, clamped to the version floor.
    pub current_version: u64,
    /// The source whose version is `current_version`, if it was applied.
    pub current_applied: Option<usize>,
    /// Unapplied sources older than the current version (history gaps).
    pub before_unapplied: Vec<usize>,
    /// Unapplied sources newer than the current version (pending work).
    pub after_unapplied: Vec<usize>,
    /// Sources that opened a transaction this run, in order.
    pub processed: Vec<usize>,
    /// The bookkeeping table was absent and not created (status reads only).
    pub table_missing: bool,
    /// First error hit while applying.
    pub error: Option<MigrationError>,
}

impl Status {
    /// Whether unapplied versions exist below the current version.
    pub fn has_anomaly(&self) -> bool {
        !self.before_unapplied.is_empty()
    }
}

/// Classify `sources` (sorted by version) against persisted state.
///
/// `persisted_current` is the highest row in the bookkeeping table and `applied`
/// every row in it. Sources at or below `floor` are ignored. Every source after the
/// first one with a given version gets its `duplicate` flag set and is always pending.
pub fn reconcile(
    sources: &mut [Source],
    floor: u64,
    persisted_current: Option<u64>,
    applied: &[u64],
) -> Status {
    let current_version = persisted_current.unwrap_or(0).max(floor);

    let mut unresolved: BTreeMap<u64, usize> = BTreeMap::new();
    let mut duplicates: Vec<usize> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    for (index, source) in sources.iter_mut().enumerate() {
        source.duplicate = false;
        source.applied = false;
        if source.version <= floor {
            continue;
        }
        if seen.insert(source.version) {
            unresolved.insert(source.version, index);
        } else {
            source.duplicate = true;
            duplicates.push(index);
        }
    }

    let mut current_applied = None;
    for version in applied {
        if let Some(index) = unresolved.remove(version) {
            if *version == current_version {
                current_applied = Some(index);
            }
        }
    }

    let mut before_unapplied = Vec::new();
    let mut after_unapplied = duplicates;
    for index in unresolved.into_values() {
        if sources[index].version < current_version {
            before_unapplied.push(index);
        } else {
            after_unapplied.push(index);
        }
    }

    before_unapplied.sort_by_key(|&i| (sources[i].version, i));
    after_unapplied.sort_by_key(|&i| (sources[i].version, i));

    Status {
        current_version,
        current_applied,
        before_unapplied,
        after_unapplied,
        processed: Vec::new(),
        table_missing: false,
        error: None,
    }
}
