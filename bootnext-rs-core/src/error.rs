// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootError`], which encapsulates other errors

use thiserror::Error;

/// An `Error` resulting from a boot manager operation.
///
/// Fields that could not be found in the output of a tool are not errors. They simply result in a
/// [`crate::entry::BootEntry`] that lacks the corresponding flag, since the shape of that output varies between
/// tool versions and locales.
#[derive(Error, Debug)]
pub enum BootError {
    /// A required external tool is not present in the search path.
    #[error("No supported boot manager tool found ({0})")]
    ToolNotFound(String),

    /// The operation requires administrator or root privileges, which the process does not have.
    #[error("Administrator or root privileges are required to run {0}")]
    PermissionDenied(String),

    /// The external tool ran, but exited with a nonzero status.
    #[error("{tool} failed{}: {message}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ToolExecutionFailed {
        /// The name of the tool.
        tool: String,

        /// The exit code, if the tool was not killed by a signal.
        code: Option<i32>,

        /// The output of the tool, verbatim.
        message: String,
    },

    /// Every strategy of a fallback chain failed.
    #[error("{}", crate::boot::fallback::combine(.0))]
    StrategiesExhausted(Vec<(&'static str, BootError)>),

    /// The tool could not be started or waited on, or it did not exit in time.
    #[error("Command Error: {0}")]
    Command(#[from] crate::system::command::CommandError),

    /// The configuration file could not be read.
    #[error("Config Error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
