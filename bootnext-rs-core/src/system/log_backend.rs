// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Simple stderr backend for the [`log`] crate.

use std::io::Write;

use log::{LevelFilter, Metadata, Record};

/// A simple logging backend that writes to standard error.
///
/// Standard output is left alone, so that listings printed by a frontend can still be piped into other programs.
#[derive(Debug)]
pub struct StderrLogger {
    /// The most verbose level that is written.
    level: LevelFilter,
}

impl StderrLogger {
    /// Constructs a new [`StderrLogger`].
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Constructs a new [`StderrLogger`], then immediately leaks it so that it can be used with `set_logger`.
    #[must_use = "Has no effect if the result is unused"]
    pub fn static_new(level: LevelFilter) -> &'static Self {
        Box::leak(Box::new(Self::new(level)))
    }

    /// Installs a [`StderrLogger`] as the global logger, and sets the max level to match.
    ///
    /// If a logger was already installed, this has no effect.
    pub fn install(level: LevelFilter) {
        let _ = log::set_logger(Self::static_new(level)).map(|()| log::set_max_level(level));
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(LevelFilter::Warn)
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = record.level();
            let file = record.file().unwrap_or_default();
            let line = record.line().unwrap_or_default();
            let args = record.args();
            let _ = writeln!(std::io::stderr().lock(), "[{level} {file}:{line}] - {args}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use log::{Level, Log};

    use super::*;

    #[test]
    fn test_level_filter() {
        let logger = StderrLogger::new(LevelFilter::Info);
        let enabled = |level| logger.enabled(&Metadata::builder().level(level).build());
        assert!(enabled(Level::Error));
        assert!(enabled(Level::Info));
        assert!(!enabled(Level::Debug));
    }

    #[test]
    fn test_off_disables_everything() {
        let logger = StderrLogger::new(LevelFilter::Off);
        assert!(!logger.enabled(&Metadata::builder().level(Level::Error).build()));
    }
}
