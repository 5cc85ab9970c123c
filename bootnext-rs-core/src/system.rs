// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! System re-exports, and the [`Host`] that the boot manager adapters run against.

use std::time::Duration;

use crate::system::{
    command::{CommandRunner, ProcessRunner},
    locate::{PathLocator, ToolLocator},
    privilege::{PrivilegeOracle, SystemPrivilege},
};

pub mod command;
pub mod locate;
pub mod log_backend;
pub mod privilege;

#[cfg(test)]
pub(crate) mod testing;

/// The process level services used by an adapter.
///
/// Adapters never spawn processes, check privileges or search the `PATH` by themselves. They go through a [`Host`],
/// which allows the real system to be swapped for a scripted one.
pub struct Host {
    /// Runs external programs.
    pub runner: Box<dyn CommandRunner>,

    /// Reports whether the process is elevated.
    pub privilege: Box<dyn PrivilegeOracle>,

    /// Searches the `PATH` for executables.
    pub locator: Box<dyn ToolLocator>,
}

impl Host {
    /// Constructs a [`Host`] backed by the running system.
    ///
    /// Every invocation made through the runner will be killed if it runs for longer than `timeout`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn native(timeout: Duration) -> Self {
        Self {
            runner: Box::new(ProcessRunner::new(timeout)),
            privilege: Box::new(SystemPrivilege),
            locator: Box::new(PathLocator),
        }
    }
}
