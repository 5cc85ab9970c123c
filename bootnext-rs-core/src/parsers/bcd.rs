// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A parser for the object listings printed by `bcdedit /enum`.
//!
//! Example output:
//!
//! ```text
//! Firmware Boot Manager
//! ---------------------
//! identifier              {fwbootmgr}
//! displayorder            {bootmgr}
//!                         {9dea862c-5cdd-4e70-acc1-f32b344d4795}
//! bootsequence            {9dea862c-5cdd-4e70-acc1-f32b344d4795}
//! timeout                 2
//! ```
//!
//! Objects are separated by blank lines. The heading of an object is the line above a row of dashes. Every other line
//! is a label followed by a value, and lines starting with whitespace continue the value of the line above them.
//!
//! Both the headings and the labels are localized by `bcdedit`, so every label is matched against a list of synonyms.

use std::sync::LazyLock;

use regex::Regex;

use crate::parsers::{Parsers, ToolOutput};

/// Matches a brace delimited GUID.
static GUID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{[0-9a-fA-F-]{36}\}").ok());

/// Matches any brace delimited token, including well known aliases such as `{bootmgr}`.
static BRACE_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{[^}]+\}").ok());

/// The path of the Windows Boot Manager on the EFI system partition.
const BOOTMGFW_PATH: &str = r"\efi\microsoft\boot\bootmgfw.efi";

/// The labels that are read from an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// The identifier of the object.
    Identifier,

    /// The default entry of a boot manager.
    Default,

    /// The description of the object.
    Description,

    /// The display order of a boot manager.
    DisplayOrder,

    /// The one time boot sequence of a boot manager.
    BootSequence,

    /// The path of the boot application.
    Path,
}

impl Label {
    /// The label as printed in each known locale.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Identifier => &["identifier", "标识符"],
            Self::Default => &["default", "默认"],
            Self::Description => &["description", "描述", "说明", "說明"],
            Self::DisplayOrder => &["displayorder"],
            Self::BootSequence => &["bootsequence"],
            Self::Path => &["path", "路径"],
        }
    }

    /// Returns true if `key` is this label in any known locale.
    #[must_use = "Has no effect if the result is unused"]
    pub fn matches(self, key: &str) -> bool {
        self.synonyms()
            .iter()
            .any(|synonym| synonym.eq_ignore_ascii_case(key))
    }
}

/// The kinds of object that are recognized by heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    /// The firmware boot manager, `{fwbootmgr}`.
    FirmwareBootManager,

    /// The Windows Boot Manager, `{bootmgr}`.
    WindowsBootManager,

    /// Any other firmware application.
    FirmwareApplication,
}

impl Heading {
    /// The heading as printed in each known locale.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::FirmwareBootManager => &["Firmware Boot Manager", "固件启动管理器"],
            Self::WindowsBootManager => &["Windows Boot Manager", "Windows 启动管理器"],
            Self::FirmwareApplication => &["Firmware Application", "固件应用程序"],
        }
    }

    /// Returns true if `heading` is this heading in any known locale.
    #[must_use = "Has no effect if the result is unused"]
    pub fn matches(self, heading: &str) -> bool {
        let heading = heading.trim();
        self.synonyms().iter().any(|synonym| heading.starts_with(synonym))
    }
}

/// A single labelled field of an object, with every value line that belongs to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcdField {
    /// The label, as printed.
    pub key: String,

    /// The value lines, trimmed.
    pub values: Vec<String>,
}

/// A single object in the listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcdBlock {
    /// The heading of the object, if it had one.
    pub heading: Option<String>,

    /// The fields of the object, in order.
    pub fields: Vec<BcdField>,

    /// The block as it was printed.
    pub raw: String,
}

impl BcdBlock {
    /// Parses a single block of non blank lines.
    ///
    /// Returns [`None`] if the block has no heading and no fields.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(text: &str) -> Option<Self> {
        let lines: Vec<&str> = text.lines().filter(|x| !x.trim().is_empty()).collect();

        let (heading, body) = match lines.as_slice() {
            [first, second, rest @ ..] if is_rule(second) => (Some(first.trim().to_owned()), rest),
            all => (None, all),
        };

        let mut fields: Vec<BcdField> = Vec::new();
        for line in body {
            if line.starts_with(char::is_whitespace) {
                if let Some(field) = fields.last_mut() {
                    field.values.push(line.trim().to_owned());
                    continue;
                }
            }

            let line = line.trim();
            let (key, value) = line
                .split_once(char::is_whitespace)
                .map_or((line, ""), |(key, value)| (key, value.trim()));

            let values = if value.is_empty() {
                Vec::new()
            } else {
                vec![value.to_owned()]
            };
            fields.push(BcdField {
                key: key.to_owned(),
                values,
            });
        }

        if heading.is_none() && fields.is_empty() {
            return None;
        }

        Some(Self {
            heading,
            fields,
            raw: text.trim_matches(['\r', '\n']).to_owned(),
        })
    }

    /// Returns the first field with a label, in any locale.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get(&self, label: Label) -> Option<&BcdField> {
        self.fields.iter().find(|field| label.matches(&field.key))
    }

    /// Returns the first value of a field, if it exists and is not empty.
    #[must_use = "Has no effect if the result is unused"]
    pub fn value(&self, label: Label) -> Option<&str> {
        self.get(label)
            .and_then(|field| field.values.first())
            .map(String::as_str)
    }

    /// Returns every GUID in a field, in order.
    #[must_use = "Has no effect if the result is unused"]
    pub fn guids(&self, label: Label) -> Vec<String> {
        self.get(label)
            .map(|field| field.values.iter().flat_map(|x| find_guids(x)).collect())
            .unwrap_or_default()
    }

    /// Returns every brace delimited token in a field, in order. Unlike [`BcdBlock::guids`], this includes aliases.
    #[must_use = "Has no effect if the result is unused"]
    pub fn tokens(&self, label: Label) -> Vec<String> {
        self.get(label)
            .map(|field| field.values.iter().flat_map(|x| find_tokens(x)).collect())
            .unwrap_or_default()
    }

    /// Returns true if the heading of the block is a certain [`Heading`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn is(&self, heading: Heading) -> bool {
        self.heading.as_deref().is_some_and(|x| heading.matches(x))
    }

    /// Returns true if the block mentions a [`Heading`] anywhere, not only in its heading.
    #[must_use = "Has no effect if the result is unused"]
    pub fn mentions(&self, heading: Heading) -> bool {
        heading.synonyms().iter().any(|synonym| self.raw.contains(synonym))
    }

    /// Returns the identifier of the block, or the first GUID anywhere in it.
    #[must_use = "Has no effect if the result is unused"]
    pub fn identity(&self) -> Option<String> {
        self.guids(Label::Identifier)
            .into_iter()
            .next()
            .or_else(|| find_guids(&self.raw).into_iter().next())
    }

    /// Returns true if the block describes the Windows Boot Manager, by name or by the path it loads.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_windows_boot_manager(&self) -> bool {
        self.mentions(Heading::WindowsBootManager)
            || self
                .value(Label::Path)
                .is_some_and(|path| path.eq_ignore_ascii_case(BOOTMGFW_PATH))
    }

    /// Returns true if the block describes the firmware boot manager.
    #[must_use = "Has no effect if the result is unused"]
    pub fn is_firmware_boot_manager(&self) -> bool {
        self.is(Heading::FirmwareBootManager) || self.raw.to_lowercase().contains("{fwbootmgr}")
    }
}

/// Every object in a `bcdedit /enum` listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcdDocument {
    /// The objects, in the order they were printed.
    pub blocks: Vec<BcdBlock>,
}

impl BcdDocument {
    /// Creates a new [`BcdDocument`], parsing it from the output of `bcdedit`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(content: &str) -> Self {
        let content = content.replace("\r\n", "\n");
        let mut blocks = Vec::new();
        let mut current = String::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                blocks.extend(BcdBlock::new(&current));
                current.clear();
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        blocks.extend(BcdBlock::new(&current));

        Self { blocks }
    }

    /// Returns the firmware boot manager object, `{fwbootmgr}`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn firmware_manager(&self) -> Option<&BcdBlock> {
        self.blocks.iter().find(|block| block.is_firmware_boot_manager())
    }

    /// Returns the Windows Boot Manager object, usually printed under its real GUID in a verbose listing.
    #[must_use = "Has no effect if the result is unused"]
    pub fn windows_boot_manager(&self) -> Option<&BcdBlock> {
        self.blocks
            .iter()
            .find(|block| block.is_windows_boot_manager())
    }
}

impl ToolOutput for BcdDocument {
    const PARSER: Parsers = Parsers::Bcd;

    fn parse(text: &str) -> Option<Self> {
        let document = Self::new(text);
        (!document.blocks.is_empty()).then_some(document)
    }
}

/// Returns every brace delimited GUID in some text.
#[must_use = "Has no effect if the result is unused"]
pub fn find_guids(text: &str) -> Vec<String> {
    find_all(&GUID, text)
}

/// Returns every brace delimited token in some text.
#[must_use = "Has no effect if the result is unused"]
pub fn find_tokens(text: &str) -> Vec<String> {
    find_all(&BRACE_TOKEN, text)
}

/// Returns every match of a pattern in some text.
fn find_all(pattern: &LazyLock<Option<Regex>>, text: &str) -> Vec<String> {
    pattern
        .as_ref()
        .map(|re| re.find_iter(text).map(|m| m.as_str().to_owned()).collect())
        .unwrap_or_default()
}

/// Returns true if a line is the rule printed under a heading.
fn is_rule(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '-')
}
