// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Provides [`Options`], the settings that an adapter is constructed with.
//!
//! These can be built in code, or parsed from a file of space separated key value pairs.
//!
//! Example configuration:
//!
//! ```text
//! # Force an adapter instead of detecting it from the running system
//! platform auto
//!
//! # Include Windows Recovery Environment entries in listings
//! show_recovery false
//!
//! # Kill any tool that runs for longer than this many seconds
//! timeout 60
//!
//! # The level of log messages written to stderr
//! log_level warn
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use log::{LevelFilter, warn};
use thiserror::Error;

use crate::{BootResult, boot::Platform, system::command::DEFAULT_TIMEOUT};

/// The name of the configuration file.
const CONFIG_NAME: &str = "bootnext-rs.conf";

/// Errors that may result from loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists, but could not be read.
    #[error("Could not read \"{}\": {source}", .path.display())]
    Read {
        /// The path of the configuration file.
        path: PathBuf,

        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Which adapter to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlatformChoice {
    /// Detect the platform from the running system.
    #[default]
    Auto,

    /// Always use the Linux adapter.
    Linux,

    /// Always use the Windows adapter.
    Windows,
}

impl PlatformChoice {
    /// Resolves the choice into a [`Platform`], detecting it if required.
    #[must_use = "Has no effect if the result is unused"]
    pub fn resolve(self) -> Platform {
        match self {
            Self::Auto => Platform::detect(),
            Self::Linux => Platform::Linux,
            Self::Windows => Platform::Windows,
        }
    }
}

impl FromStr for PlatformChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &*s.to_ascii_lowercase() {
            "auto" => Ok(Self::Auto),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            _ => Err(format!("unknown platform \"{s}\"")),
        }
    }
}

/// The settings of the boot manager adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// The platform whose adapter is used.
    pub platform: PlatformChoice,

    /// Include recovery environment entries in Windows listings.
    pub show_recovery: bool,

    /// The time any single tool invocation may take before it is killed.
    pub timeout: Duration,

    /// The maximum level of log messages.
    pub log_level: LevelFilter,
}

impl Options {
    /// Loads the [`Options`] from a configuration file.
    ///
    /// If `path` is [`None`], then the file is searched for at [`default_path`]. A file that does not exist results in
    /// the default [`Options`].
    ///
    /// # Errors
    ///
    /// May return an `Error` if the file exists, but could not be read.
    pub fn load(path: Option<&Path>) -> BootResult<Self> {
        let path = path.map_or_else(default_path, Path::to_path_buf);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }.into()),
        }
    }

    /// Parses the contents of a configuration file.
    ///
    /// Unknown keys and values that cannot be parsed are ignored.
    #[must_use = "Has no effect if the result is unused"]
    pub fn parse(content: &str) -> Self {
        let mut options = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(char::is_whitespace) {
                options.assign(key, value.trim());
            } else {
                warn!("Config line \"{line}\" has no value");
            }
        }

        options
    }

    /// Assigns a single key value pair.
    fn assign(&mut self, key: &str, value: &str) {
        match &*key.to_ascii_lowercase() {
            "platform" => {
                if let Ok(value) = value.parse() {
                    self.platform = value;
                }
            }
            "show_recovery" => {
                if let Ok(value) = value.parse() {
                    self.show_recovery = value;
                }
            }
            "timeout" => {
                if let Ok(value) = value.parse() {
                    self.timeout = Duration::from_secs(value);
                }
            }
            "log_level" => {
                if let Ok(value) = value.parse() {
                    self.log_level = value;
                }
            }
            _ => warn!("Unknown config key \"{key}\""),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            platform: PlatformChoice::Auto,
            show_recovery: false,
            timeout: DEFAULT_TIMEOUT,
            log_level: LevelFilter::Warn,
        }
    }
}

/// The path where the configuration file is searched for by default.
#[must_use = "Has no effect if the result is unused"]
pub fn default_path() -> PathBuf {
    if cfg!(windows) {
        let base = std::env::var_os("ProgramData").unwrap_or_else(|| r"C:\ProgramData".into());
        PathBuf::from(base).join("bootnext-rs").join(CONFIG_NAME)
    } else {
        Path::new("/etc").join(CONFIG_NAME)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_full_config() {
        let options = Options::parse(
            r"
            # comment
            platform windows
            show_recovery true
            timeout 5
            log_level debug
        ",
        );
        assert_eq!(options.platform, PlatformChoice::Windows);
        assert!(options.show_recovery);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let options = Options::parse(
            "platform macos\nshow_recovery maybe\ntimeout -1\nlog_level loud\ncolor blue\nlonely",
        );
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_platform_choice() {
        assert_eq!("LINUX".parse::<PlatformChoice>(), Ok(PlatformChoice::Linux));
        assert_eq!(PlatformChoice::Linux.resolve(), Platform::Linux);
        assert_eq!(PlatformChoice::Windows.resolve(), Platform::Windows);
        assert_eq!(PlatformChoice::Auto.resolve(), Platform::detect());
        assert!("beos".parse::<PlatformChoice>().is_err());
    }

    #[test]
    fn test_missing_file_is_default() -> BootResult<()> {
        let options = Options::load(Some(Path::new("/bootnext-rs/definitely/not/here.conf")))?;
        assert_eq!(options, Options::default());
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join(format!("bootnext-rs-test-{}.conf", std::process::id()));
        fs::write(&path, "show_recovery true\n")?;
        let options = Options::load(Some(&path));
        fs::remove_file(&path)?;
        assert!(options?.show_recovery);
        Ok(())
    }

    #[test]
    fn test_default_path_name() {
        assert!(default_path().ends_with(CONFIG_NAME));
    }

    proptest! {
        #[test]
        fn doesnt_panic(x in any::<String>()) {
            let _ = Options::parse(&x);
        }
    }
}
