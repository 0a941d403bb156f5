//! Field-level version diffing.
//!
//! Compares two [`FieldSnapshot`](crate::snapshot::FieldSnapshot)s and
//! produces a [`VersionComparison`]: one [`FieldDifference`] per field name,
//! classified as added, modified, removed or unchanged.
//!
//! ## Entry points
//!
//! ```
//! use listkit_core::diff::{compare_versions, summarize_changes};
//! use listkit_core::snapshot::FieldSnapshot;
//!
//! let from = FieldSnapshot::new().with_field("Title", "Draft");
//! let to = FieldSnapshot::new().with_field("Title", "Final").with_field("Owner", "kim");
//!
//! let comparison = compare_versions(Some(&from), Some(&to), false);
//! assert_eq!(summarize_changes(&comparison), "1 field(s) added, 1 field(s) modified");
//! ```
//!
//! ## Guarantees
//!
//! - **Presence-aware**: a key holding `null` is present; a missing key is absent.
//! - **Structural equality**: values are compared with `serde_json::Value`
//!   equality, so nested arrays and objects compare by content.
//! - **Determinism**: differences are sorted by field name.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{classify_field, compare_pending_changes, compare_versions};
pub use human_summary::{render_human_summary, summarize_changes, NO_CHANGES_SUMMARY};
pub use model::{ChangeKind, FieldDifference, VersionComparison};
