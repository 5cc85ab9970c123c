// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootEntry`], the shared shape of a boot entry.
//!
//! Both adapters produce these, and frontends consume them. They are value objects that are constructed fresh on
//! every listing. Changing one does not change anything in the boot configuration store.

use serde::Serialize;

pub mod builder;

/// A bootable entry as reported by the boot configuration store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BootEntry {
    /// The platform native identifier.
    ///
    /// On Linux, this is the hexadecimal suffix of an EFI boot variable, such as `0001`. On Windows, this is a GUID,
    /// usually delimited by braces.
    pub id: String,

    /// The human readable label of the entry. This is not guaranteed to be unique.
    pub description: String,

    /// Whether this is believed to be the entry that the system was booted from.
    ///
    /// This is best effort. Where the store does not expose the current entry, a heuristic is used instead.
    pub is_current: bool,

    /// Whether this entry is scheduled for the next boot only.
    pub is_next: bool,

    /// Diagnostic information, such as the raw line the entry was parsed from.
    ///
    /// This is never used for identity or comparisons.
    #[serde(skip)]
    pub extra: Option<String>,
}

impl BootEntry {
    /// Returns true if `id` refers to this entry.
    ///
    /// GUIDs are compared without case and without their braces, since `bcdedit` accepts both forms.
    #[must_use = "Has no effect if the result is unused"]
    pub fn matches_id(&self, id: &str) -> bool {
        same_id(&self.id, id)
    }
}

/// Compares two identifiers, ignoring case and surrounding braces.
#[must_use = "Has no effect if the result is unused"]
pub fn same_id(a: &str, b: &str) -> bool {
    let trim = |x: &str| x.trim().trim_start_matches('{').trim_end_matches('}').to_owned();
    trim(a).eq_ignore_ascii_case(&trim(b))
}

/// Counts the entries flagged for the next boot.
///
/// A well formed listing has at most one.
#[must_use = "Has no effect if the result is unused"]
pub fn count_next(entries: &[BootEntry]) -> usize {
    entries.iter().filter(|entry| entry.is_next).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_id() {
        assert!(same_id("{9DEA862C-5CDD-4E70-ACC1-F32B344D4795}", "9dea862c-5cdd-4e70-acc1-f32b344d4795"));
        assert!(same_id("0005", "0005"));
        assert!(!same_id("0005", "0002"));
        assert!(!same_id("{bootmgr}", "{fwbootmgr}"));
    }

    #[test]
    fn test_json_skips_extra() -> Result<(), serde_json::Error> {
        let entry = BootEntry {
            id: "0002".to_owned(),
            description: "Ubuntu".to_owned(),
            is_current: true,
            is_next: false,
            extra: Some("Boot0002* Ubuntu".to_owned()),
        };
        let json = serde_json::to_value(&entry)?;
        assert_eq!(
            json,
            serde_json::json!({
                "id": "0002",
                "description": "Ubuntu",
                "is_current": true,
                "is_next": false,
            })
        );
        Ok(())
    }
}
