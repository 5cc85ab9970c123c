// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Reports whether the process is running with administrator or root privileges.
//!
//! Any failure of the underlying platform API is reported as "not elevated", so that privileged operations are refused
//! up front instead of failing later with a less obvious error from the tool.

/// Reports whether the current process is elevated.
pub trait PrivilegeOracle {
    /// Returns true if the process holds administrator or root privileges.
    fn is_elevated(&self) -> bool;
}

/// A [`PrivilegeOracle`] that asks the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPrivilege;

impl PrivilegeOracle for SystemPrivilege {
    fn is_elevated(&self) -> bool {
        is_elevated()
    }
}

/// Checks if the effective user is root.
#[cfg(unix)]
#[must_use = "Has no effect if the result is unused"]
pub fn is_elevated() -> bool {
    // SAFETY: geteuid takes no arguments, has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Checks if the process token belongs to the Administrators group.
#[cfg(windows)]
#[must_use = "Has no effect if the result is unused"]
pub fn is_elevated() -> bool {
    #[link(name = "shell32")]
    unsafe extern "system" {
        /// Returns nonzero if the user is a member of the Administrators group.
        fn IsUserAnAdmin() -> i32;
    }

    // SAFETY: IsUserAnAdmin takes no arguments and only reads the token of the calling process.
    unsafe { IsUserAnAdmin() != 0 }
}

/// Elevation cannot be determined on this platform, so it is assumed to be absent.
#[cfg(not(any(unix, windows)))]
#[must_use = "Has no effect if the result is unused"]
pub fn is_elevated() -> bool {
    false
}
