//! Officer directory: the roster rendered into every extraction prompt,
//! and the local name-normalization backstop.
//!
//! The model is instructed to emit canonical display names already;
//! [`normalize_to_display_name`] is a trailing safety net that must hold
//! regardless of model compliance. It is total: every input maps to some
//! non-empty answer, and it never fails.

use serde::{Deserialize, Serialize};

/// One directory row as the employee API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerDirectoryEntry {
    /// Casual/spoken form ("Ramlal Korram"). May be empty.
    #[serde(default)]
    pub name: String,
    /// Canonical form ("Steno"). Many casual names may map to one.
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

/// Render the roster for prompt embedding: `"casual -> display"` when the
/// casual form is present, else the display name alone. An empty directory
/// yields a two-entry placeholder so downstream prompts stay well-formed.
pub fn prompt_roster(entries: &[OfficerDirectoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["Me".to_string(), "Others".to_string()];
    }
    entries
        .iter()
        .map(|e| {
            if e.name.trim().is_empty() {
                e.display_name.clone()
            } else {
                format!("{} -> {}", e.name, e.display_name)
            }
        })
        .collect()
}

/// Map any spoken/typed name to the directory's canonical display name.
///
/// In order: blank input resolves to `default_identity`; then a
/// case-insensitive exact match on `display_name` (returned as stored);
/// then on the casual `name` (returns the paired display name); otherwise
/// the candidate passes through verbatim.
pub fn normalize_to_display_name(
    entries: &[OfficerDirectoryEntry],
    candidate: Option<&str>,
    default_identity: &str,
) -> String {
    let candidate = match candidate.map(str::trim) {
        None | Some("") => return default_identity.to_string(),
        Some(c) => c,
    };

    for entry in entries {
        if entry.display_name.eq_ignore_ascii_case(candidate) {
            return entry.display_name.clone();
        }
    }
    for entry in entries {
        if !entry.name.trim().is_empty() && entry.name.eq_ignore_ascii_case(candidate) {
            return entry.display_name.clone();
        }
    }

    candidate.to_string()
}
