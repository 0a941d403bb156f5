//! Version comparison output types.
//!
//! Everything here is derived data: built once by the diff engine and
//! never mutated afterwards.

use crate::snapshot::FieldSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of one field between two snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Present only in the newer snapshot
    Added,
    /// Present in both with different values
    Modified,
    /// Present only in the older snapshot
    Removed,
    /// Present in both with equal values (or in neither)
    Unchanged,
}

impl ChangeKind {
    pub fn has_changed(&self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Removed => "Removed",
            ChangeKind::Unchanged => "Unchanged",
        };
        f.write_str(label)
    }
}

/// The difference for a single field.
///
/// `old_value` / `new_value` are `None` when the key is absent on that side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDifference {
    field_name: String,
    old_value: Option<Value>,
    new_value: Option<Value>,
    kind: ChangeKind,
}

impl FieldDifference {
    pub(crate) fn new(
        field_name: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
        kind: ChangeKind,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            old_value,
            new_value,
            kind,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    pub fn new_value(&self) -> Option<&Value> {
        self.new_value.as_ref()
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// True for every kind except `Unchanged`
    pub fn has_changed(&self) -> bool {
        self.kind.has_changed()
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionComparison {
    differences: Vec<FieldDifference>,
    from_snapshot: Option<FieldSnapshot>,
    to_snapshot: Option<FieldSnapshot>,
    compared_at: DateTime<Utc>,
}

impl VersionComparison {
    pub(crate) fn new(
        differences: Vec<FieldDifference>,
        from_snapshot: Option<FieldSnapshot>,
        to_snapshot: Option<FieldSnapshot>,
    ) -> Self {
        Self {
            differences,
            from_snapshot,
            to_snapshot,
            compared_at: Utc::now(),
        }
    }

    /// A comparison with no differences and no snapshots
    pub(crate) fn empty() -> Self {
        Self::new(Vec::new(), None, None)
    }

    /// All recorded differences, sorted by field name
    pub fn differences(&self) -> &[FieldDifference] {
        &self.differences
    }

    /// Difference recorded for `field_name`, if any
    pub fn difference(&self, field_name: &str) -> Option<&FieldDifference> {
        self.differences
            .iter()
            .find(|d| d.field_name == field_name)
    }

    /// True if at least one recorded difference is a real change
    pub fn has_differences(&self) -> bool {
        self.differences.iter().any(FieldDifference::has_changed)
    }

    /// Number of recorded differences that are real changes
    pub fn changed_count(&self) -> usize {
        self.differences.iter().filter(|d| d.has_changed()).count()
    }

    pub fn added(&self) -> impl Iterator<Item = &FieldDifference> {
        self.of_kind(ChangeKind::Added)
    }

    pub fn modified(&self) -> impl Iterator<Item = &FieldDifference> {
        self.of_kind(ChangeKind::Modified)
    }

    pub fn removed(&self) -> impl Iterator<Item = &FieldDifference> {
        self.of_kind(ChangeKind::Removed)
    }

    /// Only populated when the comparison was asked to include unchanged fields
    pub fn unchanged(&self) -> impl Iterator<Item = &FieldDifference> {
        self.of_kind(ChangeKind::Unchanged)
    }

    /// Number of differences of the given kind
    pub fn count_of(&self, kind: ChangeKind) -> usize {
        self.of_kind(kind).count()
    }

    fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &FieldDifference> {
        self.differences.iter().filter(move |d| d.kind == kind)
    }

    pub fn from_snapshot(&self) -> Option<&FieldSnapshot> {
        self.from_snapshot.as_ref()
    }

    pub fn to_snapshot(&self) -> Option<&FieldSnapshot> {
        self.to_snapshot.as_ref()
    }

    pub fn compared_at(&self) -> DateTime<Utc> {
        self.compared_at
    }
}
