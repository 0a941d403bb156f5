//! Change tracking for a single record.
//!
//! A [`ChangeTracker`] remembers the field values last loaded from the server
//! and compares them against the live values exposed by a [`SnapshotProvider`].
//! Comparisons never touch the network and never mutate the tracker.

use crate::diff::{compare_pending_changes, summarize_changes, VersionComparison};
use crate::snapshot::FieldSnapshot;
use std::sync::Arc;

/// Source of the live field values of a tracked record.
pub trait SnapshotProvider {
    /// Snapshot of the current values, taken now
    fn snapshot(&self) -> FieldSnapshot;
}

impl SnapshotProvider for FieldSnapshot {
    fn snapshot(&self) -> FieldSnapshot {
        self.clone()
    }
}

impl<P: SnapshotProvider + ?Sized> SnapshotProvider for &P {
    fn snapshot(&self) -> FieldSnapshot {
        (**self).snapshot()
    }
}

impl<P: SnapshotProvider + ?Sized> SnapshotProvider for Arc<P> {
    fn snapshot(&self) -> FieldSnapshot {
        (**self).snapshot()
    }
}

/// Tracks pending changes of one record against its last-loaded state.
///
/// With no original snapshot the record has never been loaded, and every
/// current value counts as pending.
#[derive(Debug, Clone)]
pub struct ChangeTracker<P> {
    original: Option<FieldSnapshot>,
    provider: P,
}

impl<P: SnapshotProvider> ChangeTracker<P> {
    /// Tracker for a record that has not been loaded yet
    pub fn new(provider: P) -> Self {
        Self {
            original: None,
            provider,
        }
    }

    /// Tracker for a record loaded with `original`
    pub fn with_original(provider: P, original: FieldSnapshot) -> Self {
        Self {
            original: Some(original),
            provider,
        }
    }

    /// Record a load event. `None` returns the tracker to the never-loaded state.
    pub fn set_original(&mut self, original: Option<FieldSnapshot>) {
        self.original = original;
    }

    /// Record a load event using the provider's current values, e.g. after a
    /// successful save has made them the server state.
    pub fn mark_loaded(&mut self) {
        self.original = Some(self.provider.snapshot());
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    /// True if any current value differs from the original.
    ///
    /// A field missing on one side counts as a change only when the other
    /// side holds a non-null value.
    pub fn has_changes(&self) -> bool {
        let Some(original) = &self.original else {
            return true;
        };
        let current = self.provider.snapshot();

        let changed_in_current = current.iter().any(|(name, value)| match original.get(name) {
            None => !value.is_null(),
            Some(old) => old != value,
        });
        if changed_in_current {
            return true;
        }

        original
            .iter()
            .any(|(name, value)| !current.contains_field(name) && !value.is_null())
    }

    /// Live values from the provider
    pub fn current_values(&self) -> FieldSnapshot {
        self.provider.snapshot()
    }

    /// Values from the last load event, if any
    pub fn original_values(&self) -> Option<&FieldSnapshot> {
        self.original.as_ref()
    }

    /// Changed fields between the original and current values
    pub fn pending_changes(&self) -> VersionComparison {
        compare_pending_changes(self)
    }

    /// One-line description of the pending changes
    pub fn changes_summary(&self) -> String {
        summarize_changes(&self.pending_changes())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
