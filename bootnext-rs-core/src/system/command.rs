// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Runs external programs and captures their output.
//!
//! A nonzero exit status is not treated as an error here. The caller inspects [`CommandOutput::code`] and decides
//! what the status means for the tool it ran. Only a failure to start or wait on the program, or a program that does
//! not exit within the timeout, results in a [`CommandError`].

use std::{io, time::Duration};

use duct::cmd;
use log::{debug, warn};
use thiserror::Error;

/// The default time an invocation may run for before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Process creation flag that prevents a console window from being allocated for the child.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// An `Error` that may result from running an external program.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be started at all.
    #[error("Could not start \"{program}\": {source}")]
    Spawn {
        /// The program that was being started.
        program: String,

        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The program was started, but waiting on it failed.
    #[error("Could not wait for \"{program}\": {source}")]
    Wait {
        /// The program that was being waited on.
        program: String,

        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The program did not exit in time, and was killed.
    #[error("\"{program}\" did not exit within {} seconds", .timeout.as_secs())]
    Timeout {
        /// The program that was killed.
        program: String,

        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

/// A description of a single program invocation.
///
/// # Example
///
/// ```
/// use bootnext_rs_core::system::command::Invocation;
///
/// let invocation = Invocation::new("bcdedit")
///     .args(["/enum", "firmware"])
///     .shell(true)
///     .hide_window(true);
///
/// assert_eq!(invocation.command_line(), "bcdedit /enum firmware");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use = "Has no effect if the result is unused"]
pub struct Invocation {
    /// The program to run.
    program: String,

    /// The arguments passed to the program.
    args: Vec<String>,

    /// Run the program through the platform command shell.
    shell: bool,

    /// Ask for the console window of the child to be suppressed.
    hide_window: bool,

    /// Environment variables set on top of the inherited environment.
    env: Vec<(String, String)>,
}

impl Invocation {
    /// Constructs a new [`Invocation`] of a program, with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets whether the program is run through the platform command shell.
    ///
    /// On Windows this is `cmd.exe /d /c`, which sidesteps the argument binding of other shells (braces in GUIDs
    /// are a common casualty). Elsewhere it is `sh -c` with the arguments joined by spaces.
    pub const fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Sets whether the console window of the child should be suppressed.
    ///
    /// This only has an effect on Windows.
    pub const fn hide_window(mut self, hide_window: bool) -> Self {
        self.hide_window = hide_window;
        self
    }

    /// Sets an environment variable for the child, on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Returns the program that is invoked, before any shell wrapping.
    #[must_use = "Has no effect if the result is unused"]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments of the program, before any shell wrapping.
    #[must_use = "Has no effect if the result is unused"]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Returns whether the program is run through the command shell.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn is_shell(&self) -> bool {
        self.shell
    }

    /// Returns whether the console window is suppressed.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn hides_window(&self) -> bool {
        self.hide_window
    }

    /// Returns the program and its arguments joined by spaces, for logging and diagnostics.
    #[must_use = "Has no effect if the result is unused"]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Resolves the program and arguments that are actually executed, after shell wrapping.
    #[must_use = "Has no effect if the result is unused"]
    pub fn resolve(&self) -> (String, Vec<String>) {
        if !self.shell {
            return (self.program.clone(), self.args.clone());
        }

        if cfg!(windows) {
            let mut args = vec!["/d".to_owned(), "/c".to_owned(), self.program.clone()];
            args.extend(self.args.iter().cloned());
            ("cmd.exe".to_owned(), args)
        } else {
            ("sh".to_owned(), vec!["-c".to_owned(), self.command_line()])
        }
    }
}

/// The captured result of a program that ran to completion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The exit code, or [`None`] if the program was terminated by a signal.
    pub code: Option<i32>,

    /// Everything written to standard output.
    pub stdout: String,

    /// Everything written to standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Constructs a [`CommandOutput`] from captured output.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the program exited with a status of zero.
    #[must_use = "Has no effect if the result is unused"]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The most useful human readable message in the output.
    ///
    /// This is the standard error if anything was written there, otherwise the standard output.
    #[must_use = "Has no effect if the result is unused"]
    pub fn message(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl From<&std::process::Output> for CommandOutput {
    fn from(output: &std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs an [`Invocation`].
pub trait CommandRunner {
    /// Runs the program to completion, capturing its output.
    ///
    /// # Errors
    ///
    /// May return an `Error` if the program could not be started or waited on, or did not exit in time. A nonzero exit
    /// status is not an error.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// A [`CommandRunner`] that spawns real child processes.
#[derive(Clone, Copy, Debug)]
pub struct ProcessRunner {
    /// How long a child may run before it is killed.
    timeout: Duration,
}

impl ProcessRunner {
    /// Constructs a new [`ProcessRunner`] with a timeout for every invocation.
    #[must_use = "Has no effect if the result is unused"]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        let (program, args) = invocation.resolve();
        debug!("Running {}", invocation.command_line());

        let mut expression = cmd(program.as_str(), args.iter().map(String::as_str))
            .stdout_capture()
            .stderr_capture()
            .unchecked();

        for (key, value) in &invocation.env {
            expression = expression.env(key, value);
        }

        #[cfg(windows)]
        {
            if invocation.hide_window {
                expression = expression.before_spawn(|command| {
                    use std::os::windows::process::CommandExt;
                    command.creation_flags(CREATE_NO_WINDOW);
                    Ok(())
                });
            }
        }

        let handle = expression.start().map_err(|source| CommandError::Spawn {
            program: program.clone(),
            source,
        })?;

        match handle.wait_timeout(self.timeout) {
            Ok(Some(output)) => {
                let output = CommandOutput::from(output);
                debug!("{} exited with {:?}", invocation.program, output.code);
                Ok(output)
            }
            Ok(None) => {
                if let Err(e) = handle.kill() {
                    warn!("Failed to kill {program} after timeout: {e}");
                }
                Err(CommandError::Timeout {
                    program,
                    timeout: self.timeout,
                })
            }
            Err(source) => Err(CommandError::Wait { program, source }),
        }
    }
}
