// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Parses the text output of boot configuration tools into structured records.
//!
//! The currently supported output shapes are as follows:
//! - The boot variable dump printed by `efibootmgr`
//! - The environment block printed by `grub-editenv list`
//! - The object blocks printed by `bcdedit /enum`
//!
//! None of these parsers fail. Fields that cannot be found are simply absent from the record, because the shape of
//! the output varies between tool versions and locales.

/// The `bcdedit` parser.
pub mod bcd;

/// The `efibootmgr` parser.
pub mod efibootmgr;

/// The `grub-editenv` parser.
pub mod grubenv;

/// The parsers that exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parsers {
    /// The `bcdedit /enum` parser.
    Bcd,

    /// The `efibootmgr` parser.
    EfiBootMgr,

    /// The `grub-editenv list` parser.
    GrubEnv,
}

impl Parsers {
    /// Convert a [`Parsers`] type into an [`&str`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bcd => "bcd",
            Self::EfiBootMgr => "efibootmgr",
            Self::GrubEnv => "grubenv",
        }
    }
}

/// Parses the output of a tool.
pub trait ToolOutput: Sized {
    /// The parser this record belongs to.
    const PARSER: Parsers;

    /// Parses the text printed by a tool.
    ///
    /// Returns [`None`] if nothing recognizable was found in the text.
    fn parse(text: &str) -> Option<Self>;
}

/// Parses the output of a tool, logging if nothing was recognized.
pub(crate) fn parse_logged<T: ToolOutput>(text: &str) -> Option<T> {
    let record = T::parse(text);
    if record.is_none() {
        log::debug!(
            "[{} PARSER]: Nothing recognizable in tool output",
            T::PARSER.as_str().to_ascii_uppercase()
        );
    }
    record
}
