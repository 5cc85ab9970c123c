// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The Windows adapter, over `bcdedit`.
//!
//! The listing follows the display order of the firmware boot manager, `{fwbootmgr}`. Every firmware application in
//! that order becomes an entry, and the Windows Boot Manager is followed by the OS loaders that it can start.
//!
//! The firmware boot manager does not expose the entry that the system was booted from. The first entry in display
//! order is reported as the current entry instead, which is only correct if the firmware booted the first entry that
//! it tried. This is a heuristic, and should not be relied upon.
//!
//! `bcdedit` is always run through `cmd.exe`, since braces in GUIDs are mangled by the argument binding of other
//! shells.

use std::path::PathBuf;

use log::{debug, warn};

use crate::{
    BootResult,
    boot::{
        BootManager, Effect, Outcome, Platform,
        fallback::{Strategy, first_success},
        run_checked,
    },
    config::Options,
    entry::{BootEntry, builder::EntryBuilder, same_id},
    error::BootError,
    parsers::{
        bcd::{BcdBlock, BcdDocument, Label},
        parse_logged,
    },
    system::{Host, command::Invocation},
};

/// The name of the BCD tool.
const BCDEDIT: &str = "bcdedit";

/// The alias of the Windows Boot Manager.
const BOOTMGR_ALIAS: &str = "{bootmgr}";

/// The alias of the firmware boot manager.
const FWBOOTMGR_ALIAS: &str = "{fwbootmgr}";

/// Descriptions that mark an entry as a recovery environment.
const RECOVERY_DESCRIPTIONS: &[&str] = &["windows recovery environment", "recovery", "winre", "恢复"];

/// Paths in an object that mark it as a recovery environment.
const RECOVERY_PATHS: &[&str] = &["winre.wim", r"\recovery\"];

/// The adapter over the BCD store.
pub struct WindowsBootManager {
    /// The process level services.
    host: Host,

    /// Include recovery environment entries in listings.
    show_recovery: bool,

    /// The path of `bcdedit`.
    bcdedit: Option<PathBuf>,
}

impl WindowsBootManager {
    /// Constructs a new [`WindowsBootManager`], locating `bcdedit` once.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(options: &Options, host: Host) -> Self {
        let bcdedit = host.locator.locate(BCDEDIT);
        debug!("Windows tools: bcdedit={bcdedit:?}");

        Self {
            host,
            show_recovery: options.show_recovery,
            bcdedit,
        }
    }

    /// Runs `bcdedit` with some arguments, failing on a nonzero exit.
    fn bcdedit(&self, args: &[&str]) -> BootResult<String> {
        let output = run_checked(&self.host, BCDEDIT, &bcd_invocation(args))?;
        Ok(output.stdout)
    }

    /// Runs `bcdedit` and parses its listing.
    fn enumerate(&self, args: &[&str]) -> BootResult<BcdDocument> {
        let text = self.bcdedit(args)?;
        Ok(parse_logged::<BcdDocument>(&text).unwrap_or_default())
    }

    /// Queries a single object of the display order.
    fn describe(&self, token: &str) -> Option<BcdBlock> {
        let query = if token.eq_ignore_ascii_case(BOOTMGR_ALIAS) || token.eq_ignore_ascii_case(FWBOOTMGR_ALIAS) {
            token.trim_start_matches('{').trim_end_matches('}')
        } else {
            token
        };

        match self.enumerate(&["/enum", query]) {
            Ok(document) => document.blocks.into_iter().next(),
            Err(e) => {
                debug!("Could not describe {token}: {e}");
                None
            }
        }
    }

    /// Resolves `{bootmgr}` to the real GUID of the Windows Boot Manager.
    fn bootmgr_guid(&self) -> Option<String> {
        let document = self
            .enumerate(&["/v", "/enum", "firmware"])
            .inspect_err(|e| debug!("Could not resolve {BOOTMGR_ALIAS}: {e}"))
            .ok()?;
        document.windows_boot_manager().and_then(BcdBlock::identity)
    }

    /// Resolves the GUID of the firmware boot manager, which is the object that the one time boot is set on.
    ///
    /// # Errors
    ///
    /// May return an `Error` if `bcdedit` failed, or if the firmware boot manager has no identifier in its output.
    pub fn firmware_manager_guid(&self) -> BootResult<String> {
        let document = self.enumerate(&["/v", "/enum", "firmware"])?;
        document
            .firmware_manager()
            .and_then(|block| block.guids(Label::Identifier).into_iter().next())
            .ok_or_else(|| BootError::ToolExecutionFailed {
                tool: BCDEDIT.to_owned(),
                code: None,
                message: "Could not find the identifier of the firmware boot manager".to_owned(),
            })
    }

    /// Lists the OS loaders of the Windows Boot Manager.
    fn os_loaders(&self) -> Vec<BootEntry> {
        let default = self
            .enumerate(&["/v", "/enum", BOOTMGR_ALIAS])
            .ok()
            .and_then(|document| {
                document
                    .blocks
                    .iter()
                    .find_map(|block| block.guids(Label::Default).into_iter().next())
            });
        if default.is_none() {
            debug!("The Windows Boot Manager has no default");
        }

        let document = match self.enumerate(&["/v", "/enum", "osloader"]) {
            Ok(document) => document,
            Err(e) => {
                warn!("Could not list OS loaders: {e}");
                return Vec::new();
            }
        };

        document
            .blocks
            .into_iter()
            .filter_map(|block| {
                let id = block.identity()?;
                let description = block.value(Label::Description).unwrap_or(&id).to_owned();
                if self.hidden(&description, &block.raw) {
                    return None;
                }

                let is_current = default.as_deref().is_some_and(|x| same_id(x, &id));
                Some(
                    EntryBuilder::new(id, description)
                        .current(is_current)
                        .extra(block.raw)
                        .build(),
                )
            })
            .collect()
    }

    /// Returns true if an entry should be excluded from listings.
    fn hidden(&self, description: &str, raw: &str) -> bool {
        let recovery = is_recovery(description, raw);
        if recovery && !self.show_recovery {
            debug!("Hiding recovery entry {description}");
        }
        recovery && !self.show_recovery
    }

    /// Checks that `bcdedit` is present and that the process is elevated.
    fn require(&self) -> BootResult<()> {
        if self.bcdedit.is_none() {
            return Err(BootError::ToolNotFound(BCDEDIT.to_owned()));
        }

        if self.host.privilege.is_elevated() {
            Ok(())
        } else {
            Err(BootError::PermissionDenied(BCDEDIT.to_owned()))
        }
    }
}

impl BootManager for WindowsBootManager {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn available(&self) -> bool {
        if self.bcdedit.is_none() {
            return false;
        }

        match self.host.runner.run(&bcd_invocation(&["/enum", "firmware"])) {
            Ok(output) => output.success() && !output.stdout.trim().is_empty(),
            Err(e) => {
                debug!("bcdedit is not usable: {e}");
                false
            }
        }
    }

    fn list_entries(&self) -> BootResult<Vec<BootEntry>> {
        if self.bcdedit.is_none() {
            return Err(BootError::ToolNotFound(BCDEDIT.to_owned()));
        }

        let firmware = self.enumerate(&["/enum", "firmware"])?;
        let Some(manager) = firmware.firmware_manager() else {
            debug!("No firmware boot manager in bcdedit output");
            return Ok(Vec::new());
        };

        let tokens = manager.tokens(Label::DisplayOrder);
        let next = manager.tokens(Label::BootSequence).into_iter().next();
        if let Some(default) = manager.value(Label::Default) {
            debug!("Firmware default is {default}");
        }

        let mut entries = Vec::new();
        let mut next_taken = false;
        for (index, token) in tokens.iter().enumerate() {
            let is_bootmgr = token.eq_ignore_ascii_case(BOOTMGR_ALIAS);
            let block = self.describe(token);

            let description = block
                .as_ref()
                .and_then(|x| x.value(Label::Description))
                .map_or_else(
                    || {
                        if is_bootmgr {
                            "Windows Boot Manager".to_owned()
                        } else {
                            token.clone()
                        }
                    },
                    str::to_owned,
                );
            let raw = block.map(|x| x.raw).unwrap_or_default();
            if self.hidden(&description, &raw) {
                continue;
            }

            let id = if is_bootmgr {
                self.bootmgr_guid().unwrap_or_else(|| token.clone())
            } else {
                token.clone()
            };

            let is_next = !next_taken
                && next
                    .as_deref()
                    .is_some_and(|x| same_id(x, &id) || same_id(x, token));
            next_taken |= is_next;

            entries.push(
                EntryBuilder::new(id, description)
                    .current(index == 0)
                    .next(is_next)
                    .extra(raw)
                    .build(),
            );

            if is_bootmgr && index == 0 {
                entries.extend(self.os_loaders());
            }
        }

        Ok(entries)
    }

    fn set_next(&self, id: &str) -> BootResult<Outcome> {
        self.require()?;

        let manager = self.firmware_manager_guid()?;
        let target = braced(id);

        first_success(vec![
            Strategy::new("bootsequence", || {
                self.bcdedit(&["/set", &manager, "bootsequence", &target])?;
                Ok(Outcome::new(Effect::OneTimeBoot, format!("Next boot set to {id}")))
            }),
            Strategy::new("displayorder", || {
                self.bcdedit(&["/set", &manager, "displayorder", &target, "/addfirst"])?;
                Ok(Outcome::new(
                    Effect::PermanentDefault,
                    format!("Moved {id} to the front of the display order. This change is persistent, not one time"),
                ))
            }),
        ])
    }

    fn clear_next(&self) -> BootResult<Outcome> {
        self.require()?;

        let manager = self.firmware_manager_guid()?;
        self.bcdedit(&["/deletevalue", &manager, "bootsequence"])?;
        Ok(Outcome::new(Effect::Cleared, "Boot sequence removed"))
    }

    fn reboot_now(&self) -> BootResult<Outcome> {
        if !self.host.privilege.is_elevated() {
            return Err(BootError::PermissionDenied("shutdown".to_owned()));
        }

        let invocation = Invocation::new("shutdown")
            .args(["/r", "/t", "0"])
            .shell(true)
            .hide_window(true);
        run_checked(&self.host, "shutdown", &invocation)?;
        Ok(Outcome::new(Effect::Rebooting, "Rebooting"))
    }
}

/// Builds a shell wrapped, windowless invocation of `bcdedit`.
fn bcd_invocation(args: &[&str]) -> Invocation {
    Invocation::new(BCDEDIT)
        .args(args.iter().copied())
        .shell(true)
        .hide_window(true)
}

/// Wraps an identifier in braces, if it is not already.
fn braced(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('{') {
        id.to_owned()
    } else {
        format!("{{{id}}}")
    }
}

/// Returns true if an object looks like a recovery environment.
///
/// Only path like markers are searched for in the raw object, since ordinary loaders carry fields such as
/// `recoverysequence` and `recoveryenabled`.
#[must_use = "Has no effect if the result is unused"]
pub fn is_recovery(description: &str, raw: &str) -> bool {
    let description = description.to_lowercase();
    let raw = raw.to_lowercase();
    RECOVERY_DESCRIPTIONS.iter().any(|x| description.contains(x)) || RECOVERY_PATHS.iter().any(|x| raw.contains(x))
}
