// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`BootManager`], the contract shared by the platform adapters, and [`manager_for`] to select one.

use std::{fmt, path::Path};

use crate::{
    BootResult,
    config::Options,
    entry::BootEntry,
    error::BootError,
    features,
    system::{
        Host,
        command::{CommandOutput, Invocation},
    },
};

pub mod fallback;

#[cfg(feature = "linux")]
pub mod linux;

#[cfg(feature = "windows")]
pub mod windows;

/// The platforms that have an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// EFI boot variables through `efibootmgr`, or GRUB.
    Linux,

    /// The BCD store through `bcdedit`.
    Windows,
}

impl Platform {
    /// Detects the platform from the compile target.
    ///
    /// Every target other than Windows is treated as Linux, whose adapter simply reports itself unavailable if its
    /// tools are missing.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn detect() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Convert a [`Platform`] into an [`&str`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful mutation did to the boot configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Only the next boot will use the entry.
    OneTimeBoot,

    /// The entry was made the permanent default, because a one time boot could not be set.
    PermanentDefault,

    /// The one time boot was removed.
    Cleared,

    /// The system is restarting.
    Rebooting,
}

/// The result of a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// What changed.
    pub effect: Effect,

    /// A human readable description of the change.
    pub message: String,
}

impl Outcome {
    /// Constructs a new [`Outcome`].
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(effect: Effect, message: impl Into<String>) -> Self {
        Self {
            effect,
            message: message.into(),
        }
    }
}

/// An adapter over the boot configuration store of a platform.
///
/// Every method queries or mutates the live store. Nothing is cached between calls.
pub trait BootManager {
    /// The platform of the adapter.
    fn platform(&self) -> Platform;

    /// Returns true if the tools the adapter relies on are present and usable.
    fn available(&self) -> bool;

    /// Lists the boot entries in the order the store reports them.
    ///
    /// # Errors
    ///
    /// May return an `Error` if no tool is present, or if the tool failed to run.
    fn list_entries(&self) -> BootResult<Vec<BootEntry>>;

    /// Schedules the entry with the identifier `id` for the next boot.
    ///
    /// # Errors
    ///
    /// May return an `Error` if no tool is present, the process is not elevated, or every strategy failed.
    fn set_next(&self, id: &str) -> BootResult<Outcome>;

    /// Removes the one time boot override, if there is one.
    ///
    /// # Errors
    ///
    /// May return an `Error` if no tool is present, the process is not elevated, or every strategy failed.
    fn clear_next(&self) -> BootResult<Outcome>;

    /// Restarts the system immediately.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the process is not elevated, or the restart command failed.
    fn reboot_now(&self) -> BootResult<Outcome>;
}

/// Constructs the adapter for a platform.
///
/// If the adapter was disabled through its cargo feature, a stub is returned that is never available.
#[must_use = "Has no effect if the result is unused"]
pub fn manager_for(platform: Platform, options: &Options, host: Host) -> Box<dyn BootManager> {
    match platform {
        Platform::Linux => Box::new(features::linux::LinuxBootManager::new(options, host)),
        Platform::Windows => Box::new(features::windows::WindowsBootManager::new(options, host)),
    }
}

/// Flattens the result of a mutation into a success flag and a message.
#[must_use = "Has no effect if the result is unused"]
pub fn report(result: &BootResult<Outcome>) -> (bool, String) {
    match result {
        Ok(outcome) => (true, outcome.message.clone()),
        Err(e) => (false, e.to_string()),
    }
}

/// Runs an invocation, treating a nonzero exit as a [`BootError::ToolExecutionFailed`].
pub(crate) fn run_checked(host: &Host, tool: &str, invocation: &Invocation) -> BootResult<CommandOutput> {
    let output = host.runner.run(invocation)?;
    if output.success() {
        Ok(output)
    } else {
        Err(BootError::ToolExecutionFailed {
            tool: tool.to_owned(),
            code: output.code,
            message: output.message().to_owned(),
        })
    }
}

/// The name of a located tool, for messages.
pub(crate) fn tool_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::testing::TestHost;

    #[test]
    fn test_report() {
        let ok: BootResult<Outcome> = Ok(Outcome::new(Effect::OneTimeBoot, "Next boot set to 0005"));
        assert_eq!(report(&ok), (true, "Next boot set to 0005".to_owned()));

        let err: BootResult<Outcome> = Err(BootError::PermissionDenied("bcdedit".to_owned()));
        let (success, message) = report(&err);
        assert!(!success);
        assert!(message.contains("bcdedit"));
    }

    #[test]
    fn test_run_checked() {
        let test = TestHost::new();
        test.reply_ok("efibootmgr", "BootCurrent: 0001");
        test.reply_err("efibootmgr -n 9999", 5, "Could not set BootNext: No such file or directory");
        let host = test.host();

        assert!(run_checked(&host, "efibootmgr", &Invocation::new("efibootmgr")).is_ok());
        let result = run_checked(&host, "efibootmgr", &Invocation::new("efibootmgr").args(["-n", "9999"]));
        assert!(matches!(
            result,
            Err(BootError::ToolExecutionFailed { code: Some(5), ref message, .. }) if message.contains("BootNext")
        ));
    }

    #[test]
    fn test_tool_name() {
        assert_eq!(tool_name(Path::new("/usr/sbin/grub2-reboot")), "grub2-reboot");
        assert_eq!(tool_name(Path::new("efibootmgr")), "efibootmgr");
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Platform::Windows.as_str(), "windows");
    }
}
