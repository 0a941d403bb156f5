//! Human-readable renderings of a version comparison.

use crate::diff::model::{ChangeKind, FieldDifference, VersionComparison};
use serde_json::Value;

/// Summary returned when a comparison holds no changes.
pub const NO_CHANGES_SUMMARY: &str = "No changes detected.";

/// One-line summary: counts of added, modified and removed fields.
///
/// Returns [`NO_CHANGES_SUMMARY`] when nothing changed, otherwise the
/// non-zero clauses joined by `", "`, e.g. `"1 field(s) added, 2 field(s) modified"`.
pub fn summarize_changes(comparison: &VersionComparison) -> String {
    let clauses: Vec<String> = [
        (ChangeKind::Added, "added"),
        (ChangeKind::Modified, "modified"),
        (ChangeKind::Removed, "removed"),
    ]
    .iter()
    .filter_map(|(kind, verb)| {
        let count = comparison.count_of(*kind);
        (count > 0).then(|| format!("{count} field(s) {verb}"))
    })
    .collect();

    if clauses.is_empty() {
        NO_CHANGES_SUMMARY.to_string()
    } else {
        clauses.join(", ")
    }
}

/// Render a Markdown summary of a [`VersionComparison`] for review displays.
///
/// Informational only; the structured comparison is authoritative.
pub fn render_human_summary(comparison: &VersionComparison) -> String {
    let mut out = String::new();

    out.push_str("## Field Changes\n\n");
    out.push_str(&format!(
        "**Compared at**: {}  \n**Summary**: {}\n\n",
        comparison.compared_at().to_rfc3339(),
        summarize_changes(comparison)
    ));

    if !comparison.has_differences() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    let added: Vec<&FieldDifference> = comparison.added().collect();
    if !added.is_empty() {
        out.push_str("### Added\n\n");
        for diff in added {
            out.push_str(&format!(
                "- **{}**: `{}`\n",
                diff.field_name(),
                render_value(diff.new_value())
            ));
        }
        out.push('\n');
    }

    let modified: Vec<&FieldDifference> = comparison.modified().collect();
    if !modified.is_empty() {
        out.push_str("### Modified\n\n");
        for diff in modified {
            out.push_str(&format!(
                "- **{}**: `{}` → `{}`\n",
                diff.field_name(),
                render_value(diff.old_value()),
                render_value(diff.new_value())
            ));
        }
        out.push('\n');
    }

    let removed: Vec<&FieldDifference> = comparison.removed().collect();
    if !removed.is_empty() {
        out.push_str("### Removed\n\n");
        for diff in removed {
            out.push_str(&format!(
                "- **{}** (was `{}`)\n",
                diff.field_name(),
                render_value(diff.old_value())
            ));
        }
        out.push('\n');
    }

    out
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "<absent>".to_string(),
        Some(v) => short(&v.to_string()),
    }
}

/// Truncate long rendered values for display.
fn short(s: &str) -> String {
    const MAX: usize = 60;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}…")
    }
}
