// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Finds executables in the search path.

use std::path::PathBuf;

use log::debug;

/// Resolves executable names into paths.
pub trait ToolLocator {
    /// Returns the path of the executable, or [`None`] if it is not in the search path.
    ///
    /// This never executes anything.
    fn locate(&self, name: &str) -> Option<PathBuf>;

    /// Returns the first of several alternative executable names that can be found.
    fn locate_any(&self, names: &[&str]) -> Option<PathBuf> {
        names.iter().find_map(|name| self.locate(name))
    }
}

/// A [`ToolLocator`] that searches the `PATH` of the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let path = which::which(name).ok();
        debug!("Located {name}: {path:?}");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        assert_eq!(
            PathLocator.locate("bootnext-rs-definitely-not-a-real-program"),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_any_falls_through() {
        let found = PathLocator.locate_any(&["bootnext-rs-definitely-not-a-real-program", "sh"]);
        assert!(found.is_some_and(|path| path.ends_with("sh")));
    }
}
