// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A parser for the boot variable dump printed by `efibootmgr` when it is run without arguments.
//!
//! Example output:
//!
//! ```text
//! BootCurrent: 0002
//! BootNext: 0005
//! Timeout: 1 seconds
//! BootOrder: 0002,0005,0001
//! Boot0001  UEFI: PXE IPv4 Intel(R) Ethernet
//! Boot0002* Ubuntu	HD(1,GPT,e09d636b-0cd9-4e84-8a39-84432cfc2b8e,0x800,0x100000)/File(\EFI\ubuntu\shimx64.efi)
//! Boot0005* Windows Boot Manager	HD(1,GPT,...)/File(\EFI\Microsoft\Boot\bootmgfw.efi)
//! ```
//!
//! The `*` marks an active entry. Recent versions of `efibootmgr` print the device path after a tab, even without
//! `-v`, so the description ends at the first tab.

use log::debug;

use crate::parsers::{Parsers, ToolOutput};

/// The label of the variable holding the entry that was booted.
const CURRENT_LABEL: &str = "BootCurrent:";

/// The label of the variable holding the one time boot entry.
const NEXT_LABEL: &str = "BootNext:";

/// The label of the variable holding the boot order.
const ORDER_LABEL: &str = "BootOrder:";

/// The label of the firmware menu timeout.
const TIMEOUT_LABEL: &str = "Timeout:";

/// The prefix of a boot entry line.
const ENTRY_PREFIX: &str = "Boot";

/// A single `Boot####` line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EfiBootLine {
    /// The hexadecimal suffix of the boot variable.
    pub id: String,

    /// The description of the entry, without any device path.
    pub description: String,

    /// The line as it was printed.
    pub raw: String,
}

impl EfiBootLine {
    /// Parses a `Boot####[*] description` line.
    ///
    /// Returns [`None`] if the line is not a boot entry. Labelled fields such as `BootCurrent:` are not entries.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(line: &str) -> Option<Self> {
        let raw = line.trim();
        let rest = raw.strip_prefix(ENTRY_PREFIX)?;

        let id_len = rest
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(rest.len());
        if id_len == 0 {
            return None;
        }
        let (id, rest) = rest.split_at(id_len);

        let rest = rest.strip_prefix('*').unwrap_or(rest);

        if !rest.starts_with(char::is_whitespace) {
            return None; // either nothing follows the id, or it is a label like "BootCurrent:"
        }

        let description = rest
            .trim_start()
            .split('\t')
            .next()
            .unwrap_or_default()
            .trim();
        if description.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_owned(),
            description: description.to_owned(),
            raw: raw.to_owned(),
        })
    }
}

/// The state of the EFI boot variables as printed by `efibootmgr`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EfiBootDump {
    /// The entry that the system was booted from, if reported.
    pub current: Option<String>,

    /// The entry scheduled for the next boot only, if there is one.
    pub next: Option<String>,

    /// The permanent boot order.
    pub order: Vec<String>,

    /// The firmware menu timeout in seconds, if reported.
    pub timeout: Option<u32>,

    /// Every boot entry, in the order they were printed.
    pub entries: Vec<EfiBootLine>,
}

impl EfiBootDump {
    /// Creates a new [`EfiBootDump`], parsing it from the output of `efibootmgr`.
    ///
    /// Lines that are not recognized are skipped.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(content: &str) -> Self {
        let mut dump = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            dump.assign_line(line);
        }

        dump
    }

    /// Assign a line to the [`EfiBootDump`], either as a labelled field or as an entry.
    fn assign_line(&mut self, line: &str) {
        if let Some(value) = field_value(line, CURRENT_LABEL) {
            self.current = first_token(value);
        } else if let Some(value) = field_value(line, NEXT_LABEL) {
            self.next = first_token(value);
        } else if let Some(value) = field_value(line, ORDER_LABEL) {
            self.order = value
                .split(',')
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .map(str::to_owned)
                .collect();
        } else if let Some(value) = field_value(line, TIMEOUT_LABEL) {
            self.timeout = value.split_whitespace().next().and_then(|x| x.parse().ok());
        } else if let Some(entry) = EfiBootLine::new(line) {
            self.entries.push(entry);
        } else {
            debug!("[EFIBOOTMGR PARSER]: Skipping unrecognized line {line}");
        }
    }

    /// Returns true if nothing at all was recognized.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
            && self.next.is_none()
            && self.order.is_empty()
            && self.timeout.is_none()
            && self.entries.is_empty()
    }
}

impl ToolOutput for EfiBootDump {
    const PARSER: Parsers = Parsers::EfiBootMgr;

    fn parse(text: &str) -> Option<Self> {
        let dump = Self::new(text);
        (!dump.is_empty()).then_some(dump)
    }
}

/// Returns the text following `label` if the line starts with it.
fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label).map(str::trim)
}

/// Returns the first whitespace separated token of a value.
fn first_token(value: &str) -> Option<String> {
    value.split_whitespace().next().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_basic_dump() {
        let dump = EfiBootDump::new(
            "BootCurrent: 0002
            Timeout: 1 seconds
            BootNext: 0005
            BootOrder: 0002,0005,0001
            Boot0001  UEFI: PXE IPv4
            Boot0002* Ubuntu
            Boot0005* Windows",
        );
        assert_eq!(dump.current.as_deref(), Some("0002"));
        assert_eq!(dump.next.as_deref(), Some("0005"));
        assert_eq!(dump.order, ["0002", "0005", "0001"]);
        assert_eq!(dump.timeout, Some(1));

        let ids: Vec<_> = dump.entries.iter().map(|x| x.id.as_str()).collect();
        assert_eq!(ids, ["0001", "0002", "0005"]);
        assert_eq!(dump.entries[0].description, "UEFI: PXE IPv4");
        assert_eq!(dump.entries[1].description, "Ubuntu");
        assert_eq!(dump.entries[2].raw, "Boot0005* Windows");
    }

    #[test]
    fn test_device_path_is_not_description() {
        let line = EfiBootLine::new(
            "Boot0000* ubuntu\tHD(1,GPT,e09d636b-0cd9-4e84-8a39-84432cfc2b8e,0x800,0x100000)/File(\\EFI\\ubuntu\\shimx64.efi)",
        );
        let line = line.expect("Failed to parse a valid boot entry line in test");
        assert_eq!(line.id, "0000");
        assert_eq!(line.description, "ubuntu");
        assert!(line.raw.contains("shimx64.efi"));
    }

    #[test]
    fn test_labels_are_not_entries() {
        assert_eq!(EfiBootLine::new("BootCurrent: 0002"), None);
        assert_eq!(EfiBootLine::new("BootNext: 0005"), None);
        assert_eq!(EfiBootLine::new("BootOrder: 0002,0005"), None);
        assert_eq!(EfiBootLine::new("Boot0002*"), None);
        assert_eq!(EfiBootLine::new("Bootable thing"), None);
    }

    #[test]
    fn test_no_next() {
        let dump = EfiBootDump::new("BootCurrent: 0001\nBoot0001* Fedora\n");
        assert_eq!(dump.next, None);
        assert_eq!(dump.entries.len(), 1);
    }

    #[test]
    fn test_unrecognized_output() {
        assert_eq!(
            EfiBootDump::parse("EFI variables are not supported on this system."),
            None
        );
    }

    proptest! {
        #[test]
        fn doesnt_panic(x in any::<String>()) {
            let _ = EfiBootDump::new(&x);
        }

        #[test]
        fn parses_any_hex_entry(id in "[0-9A-F]{4}", desc in "[A-Za-z][A-Za-z0-9 ]{0,30}") {
            let line = format!("Boot{id}* {desc}");
            let entry = EfiBootLine::new(&line);
            prop_assert!(entry.is_some());
            if let Some(entry) = entry {
                prop_assert_eq!(entry.id, id);
                prop_assert_eq!(entry.description, desc.trim());
            }
        }
    }
}
