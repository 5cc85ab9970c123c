// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A parser for the environment block printed by `grub-editenv list`.
//!
//! Example output:
//!
//! ```text
//! saved_entry=0
//! next_entry=Windows Boot Manager (on /dev/nvme0n1p1)
//! boot_success=1
//! ```

use log::debug;

use crate::parsers::{Parsers, ToolOutput};

/// The GRUB environment block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrubEnv {
    /// The variables, in the order they were printed.
    pub vars: Vec<(String, String)>,
}

impl GrubEnv {
    /// Creates a new [`GrubEnv`], parsing it from the output of `grub-editenv list`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(content: &str) -> Self {
        let vars = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let pair = line.split_once('=');
                if pair.is_none() {
                    debug!("[GRUBENV PARSER]: Skipping line without a value {line}");
                }
                pair
            })
            .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
            .collect();

        Self { vars }
    }

    /// Returns the value of a variable. If it is set more than once, the last value wins.
    #[must_use = "Has no effect if the result is unused"]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The saved default entry.
    #[must_use = "Has no effect if the result is unused"]
    pub fn saved_entry(&self) -> Option<&str> {
        self.get("saved_entry")
    }

    /// The entry set for the next boot by `grub-reboot`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn next_entry(&self) -> Option<&str> {
        self.get("next_entry").filter(|x| !x.is_empty())
    }
}

impl ToolOutput for GrubEnv {
    const PARSER: Parsers = Parsers::GrubEnv;

    fn parse(text: &str) -> Option<Self> {
        let env = Self::new(text);
        (!env.vars.is_empty()).then_some(env)
    }
}
