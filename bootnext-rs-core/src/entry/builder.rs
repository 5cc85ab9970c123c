// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Boot entry builder.

use crate::entry::BootEntry;

/// A builder to configure a [`BootEntry`]
///
/// # Example
///
/// ```
/// use bootnext_rs_core::entry::builder::EntryBuilder;
///
/// let entry = EntryBuilder::new("0002", "Ubuntu")
///     .current(true)
///     .extra("Boot0002* Ubuntu")
///     .build();
///
/// assert!(entry.is_current);
/// assert!(!entry.is_next);
/// ```
#[must_use = "Has no effect if the result is unused"]
pub struct EntryBuilder {
    /// The inner [`BootEntry`] that the builder operates on.
    entry: BootEntry,
}

impl EntryBuilder {
    /// Constructs a new [`BootEntry`] that is neither current nor next.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            entry: BootEntry {
                id: id.into(),
                description: description.into(),
                is_current: false,
                is_next: false,
                extra: None,
            },
        }
    }

    /// Sets if the [`BootEntry`] is the entry the system was booted from.
    pub const fn current(mut self, is_current: bool) -> Self {
        self.entry.is_current = is_current;
        self
    }

    /// Sets if the [`BootEntry`] is scheduled for the next boot.
    pub const fn next(mut self, is_next: bool) -> Self {
        self.entry.is_next = is_next;
        self
    }

    /// Sets the diagnostic payload of the [`BootEntry`].
    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.entry.extra = Some(extra.into());
        self
    }

    /// Replaces the identifier of the [`BootEntry`].
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.entry.id = id.into();
        self
    }

    /// Builds the [`BootEntry`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn build(self) -> BootEntry {
        self.entry
    }
}
