//! Version comparison engine.
//!
//! [`compare_versions`] diffs any two snapshots; [`compare_pending_changes`]
//! diffs a tracker's original values against its live values.

use crate::diff::model::{ChangeKind, FieldDifference, VersionComparison};
use crate::snapshot::FieldSnapshot;
use crate::tracking::{ChangeTracker, SnapshotProvider};
use serde_json::Value;
use std::collections::BTreeSet;

/// Classify one field from its value on each side (`None` = key absent).
pub fn classify_field(old: Option<&Value>, new: Option<&Value>) -> ChangeKind {
    match (old, new) {
        (None, Some(_)) => ChangeKind::Added,
        (Some(_), None) => ChangeKind::Removed,
        (None, None) => ChangeKind::Unchanged,
        (Some(a), Some(b)) if a == b => ChangeKind::Unchanged,
        (Some(_), Some(_)) => ChangeKind::Modified,
    }
}

/// Compare two snapshots field by field.
///
/// A missing snapshot is treated as empty; when both are missing the result
/// is empty. Unchanged fields are recorded only if `include_unchanged` is set.
/// Differences are sorted by field name.
pub fn compare_versions(
    from: Option<&FieldSnapshot>,
    to: Option<&FieldSnapshot>,
    include_unchanged: bool,
) -> VersionComparison {
    if from.is_none() && to.is_none() {
        return VersionComparison::empty();
    }

    let empty = FieldSnapshot::new();
    let from_fields = from.unwrap_or(&empty);
    let to_fields = to.unwrap_or(&empty);

    let all_fields: BTreeSet<&str> = from_fields
        .field_names()
        .chain(to_fields.field_names())
        .collect();

    let differences: Vec<FieldDifference> = all_fields
        .into_iter()
        .filter_map(|name| {
            let old = from_fields.get(name);
            let new = to_fields.get(name);
            let kind = classify_field(old, new);
            (include_unchanged || kind.has_changed())
                .then(|| FieldDifference::new(name, old.cloned(), new.cloned(), kind))
        })
        .collect();

    VersionComparison::new(differences, from.cloned(), to.cloned())
}

/// Compare a tracker's original values against its current values.
///
/// Returns an empty comparison when the record was never loaded or when
/// [`ChangeTracker::has_changes`] reports nothing pending. Unchanged fields
/// are never included.
pub fn compare_pending_changes<P: SnapshotProvider>(tracker: &ChangeTracker<P>) -> VersionComparison {
    let Some(original) = tracker.original_values() else {
        return VersionComparison::empty();
    };
    if !tracker.has_changes() {
        return VersionComparison::empty();
    }
    let current = tracker.current_values();
    compare_versions(Some(original), Some(&current), false)
}
