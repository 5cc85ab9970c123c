// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A scripted [`Host`] for exercising the adapters without touching the real system.
//!
//! Every invocation is recorded by its command line (before shell wrapping). Replies are looked up by that same
//! command line. Anything that was not scripted exits with a status of 1.

use std::{cell::RefCell, collections::HashMap, io, path::PathBuf, rc::Rc};

use crate::system::{
    Host,
    command::{CommandError, CommandOutput, CommandRunner, Invocation},
    locate::ToolLocator,
    privilege::PrivilegeOracle,
};

/// Shared state between a [`TestHost`] and the fakes handed out through [`TestHost::host`].
#[derive(Default)]
struct State {
    /// Every invocation made so far.
    calls: Vec<Invocation>,

    /// Replies keyed by command line. [`None`] makes the spawn fail.
    replies: HashMap<String, Option<CommandOutput>>,
}

/// A scripted host.
#[derive(Clone, Default)]
pub(crate) struct TestHost {
    /// The state shared with the fakes.
    state: Rc<RefCell<State>>,

    /// The tools that the locator will find.
    tools: Vec<String>,

    /// What the privilege oracle will report.
    elevated: bool,
}

impl TestHost {
    /// Constructs a host with no tools that is not elevated.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes a tool locatable. It is located under its bare name.
    pub(crate) fn tool(mut self, name: &str) -> Self {
        self.tools.push(name.to_owned());
        self
    }

    /// Sets what the privilege oracle reports.
    pub(crate) const fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    /// Scripts a reply for a command line.
    pub(crate) fn reply(&self, command_line: &str, output: CommandOutput) {
        self.state
            .borrow_mut()
            .replies
            .insert(command_line.to_owned(), Some(output));
    }

    /// Scripts a successful reply with the given standard output.
    pub(crate) fn reply_ok(&self, command_line: &str, stdout: &str) {
        self.reply(command_line, CommandOutput::new(Some(0), stdout, ""));
    }

    /// Scripts a failing reply with the given exit code and standard error.
    pub(crate) fn reply_err(&self, command_line: &str, code: i32, stderr: &str) {
        self.reply(command_line, CommandOutput::new(Some(code), "", stderr));
    }

    /// Makes the spawn of a command line fail.
    pub(crate) fn fail_spawn(&self, command_line: &str) {
        self.state
            .borrow_mut()
            .replies
            .insert(command_line.to_owned(), None);
    }

    /// Returns the command lines of every invocation so far.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Returns every invocation so far.
    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.state.borrow().calls.clone()
    }

    /// Builds a [`Host`] backed by this script.
    pub(crate) fn host(&self) -> Host {
        Host {
            runner: Box::new(ScriptedRunner(Rc::clone(&self.state))),
            privilege: Box::new(FixedPrivilege(self.elevated)),
            locator: Box::new(FixedLocator(self.tools.clone())),
        }
    }
}

/// Replies to invocations from the script.
struct ScriptedRunner(Rc<RefCell<State>>);

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(invocation.clone());
        let line = invocation.command_line();
        match state.replies.get(&line) {
            Some(Some(output)) => Ok(output.clone()),
            Some(None) => Err(CommandError::Spawn {
                program: invocation.program().to_owned(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
            None => Ok(CommandOutput::new(
                Some(1),
                "",
                format!("unscripted command: {line}"),
            )),
        }
    }
}

/// Always reports the same elevation.
struct FixedPrivilege(bool);

impl PrivilegeOracle for FixedPrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

/// Finds only the listed tools.
struct FixedLocator(Vec<String>);

impl ToolLocator for FixedLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.0
            .iter()
            .any(|tool| tool == name)
            .then(|| PathBuf::from(name))
    }
}
