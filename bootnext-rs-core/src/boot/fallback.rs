// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Runs an ordered list of strategies until one of them succeeds.
//!
//! Some stores can be changed in more than one way, and not every way works on every system. Each [`Strategy`] is
//! tried in order. If all of them fail, the failures are combined into a single
//! [`BootError::StrategiesExhausted`].

use log::warn;

use crate::{BootResult, boot::Outcome, error::BootError};

/// A named way of performing a mutation.
pub struct Strategy<'a> {
    /// The name of the strategy, for diagnostics.
    name: &'static str,

    /// Performs the mutation.
    run: Box<dyn FnOnce() -> BootResult<Outcome> + 'a>,
}

impl<'a> Strategy<'a> {
    /// Constructs a new [`Strategy`].
    pub fn new(name: &'static str, run: impl FnOnce() -> BootResult<Outcome> + 'a) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }
}

/// Runs strategies in order, returning the first success.
///
/// If only one strategy was given, its error is returned as is.
///
/// # Errors
///
/// May return an `Error` if every strategy failed, or if there were no strategies at all.
pub fn first_success(strategies: Vec<Strategy<'_>>) -> BootResult<Outcome> {
    let mut failures = Vec::new();

    for strategy in strategies {
        match (strategy.run)() {
            Ok(outcome) => {
                if !failures.is_empty() {
                    warn!("Fell back to {} after {} failed strategies", strategy.name, failures.len());
                }
                return Ok(outcome);
            }
            Err(e) => {
                warn!("{} failed: {e}", strategy.name);
                failures.push((strategy.name, e));
            }
        }
    }

    match failures.len() {
        0 => Err(BootError::ToolNotFound("no strategy is applicable".to_owned())),
        1 => Err(failures.remove(0).1),
        _ => Err(BootError::StrategiesExhausted(failures)),
    }
}

/// Combines the failures of several strategies into one message, one line per strategy.
#[must_use = "Has no effect if the result is unused"]
pub fn combine(failures: &[(&'static str, BootError)]) -> String {
    failures
        .iter()
        .map(|(name, e)| format!("{name} failed: {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
