// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The Linux adapter, over `efibootmgr` and the GRUB environment tools.
//!
//! EFI boot variables are preferred. When `efibootmgr` is absent but `grub-reboot` is present, the adapter falls back
//! to GRUB. GRUB menu entries live in `grub.cfg`, which is not parsed, so the GRUB listing is a single placeholder
//! entry.
//!
//! Distributions that prefix the GRUB tools with `grub2-` are handled by searching for both names.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    BootResult,
    boot::{
        BootManager, Effect, Outcome, Platform,
        fallback::{Strategy, first_success},
        run_checked, tool_name,
    },
    config::Options,
    entry::{BootEntry, builder::EntryBuilder, same_id},
    error::BootError,
    parsers::{efibootmgr::EfiBootDump, grubenv::GrubEnv, parse_logged},
    system::{Host, command::Invocation},
};

/// The names of the EFI boot variable tool.
const EFIBOOTMGR: &[&str] = &["efibootmgr"];

/// The names of the GRUB one time boot tool.
const GRUB_REBOOT: &[&str] = &["grub-reboot", "grub2-reboot"];

/// The names of the GRUB default entry tool.
const GRUB_SET_DEFAULT: &[&str] = &["grub-set-default", "grub2-set-default"];

/// The names of the GRUB environment block tool.
const GRUB_EDITENV: &[&str] = &["grub-editenv", "grub2-editenv"];

/// The identifier of the GRUB placeholder entry.
const GRUB_PLACEHOLDER_ID: &str = "0";

/// The adapter over EFI boot variables and GRUB.
pub struct LinuxBootManager {
    /// The process level services.
    host: Host,

    /// The path of `efibootmgr`.
    efibootmgr: Option<PathBuf>,

    /// The path of `grub-reboot`.
    grub_reboot: Option<PathBuf>,

    /// The path of `grub-set-default`. It is detected, but never run.
    grub_set_default: Option<PathBuf>,

    /// The path of `grub-editenv`.
    grub_editenv: Option<PathBuf>,
}

impl LinuxBootManager {
    /// Constructs a new [`LinuxBootManager`], locating its tools once.
    #[must_use = "Has no effect if the result is unused"]
    pub fn new(_options: &Options, host: Host) -> Self {
        let efibootmgr = host.locator.locate_any(EFIBOOTMGR);
        let grub_reboot = host.locator.locate_any(GRUB_REBOOT);
        let grub_set_default = host.locator.locate_any(GRUB_SET_DEFAULT);
        let grub_editenv = host.locator.locate_any(GRUB_EDITENV);

        debug!(
            "Linux tools: efibootmgr={efibootmgr:?} grub-reboot={grub_reboot:?} grub-set-default={grub_set_default:?} grub-editenv={grub_editenv:?}"
        );

        Self {
            host,
            efibootmgr,
            grub_reboot,
            grub_set_default,
            grub_editenv,
        }
    }

    /// Returns the located `grub-set-default`, if there is one.
    #[must_use = "Has no effect if the result is unused"]
    pub fn grub_set_default(&self) -> Option<&PathBuf> {
        self.grub_set_default.as_ref()
    }

    /// Runs `efibootmgr` with no arguments and parses the boot variable dump.
    ///
    /// # Errors
    ///
    /// May return an `Error` if `efibootmgr` is absent, could not be run, or failed without printing anything
    /// recognizable.
    pub fn boot_variables(&self) -> BootResult<EfiBootDump> {
        let path = self
            .efibootmgr
            .as_ref()
            .ok_or_else(|| BootError::ToolNotFound("efibootmgr".to_owned()))?;

        let output = self.host.runner.run(&invocation(path))?;
        match parse_logged::<EfiBootDump>(&output.stdout) {
            Some(dump) => {
                if !output.success() {
                    warn!("efibootmgr exited with {:?}, using its partial output", output.code);
                }
                Ok(dump)
            }
            None if output.success() => Ok(EfiBootDump::default()),
            None => Err(BootError::ToolExecutionFailed {
                tool: tool_name(path),
                code: output.code,
                message: output.message().to_owned(),
            }),
        }
    }

    /// Lists the EFI boot variables.
    fn list_efi(&self) -> BootResult<Vec<BootEntry>> {
        let dump = self.boot_variables()?;

        if dump.current.is_none() {
            debug!("efibootmgr did not report BootCurrent");
        }
        debug!("BootOrder is {:?}, timeout is {:?}", dump.order, dump.timeout);

        let mut next_taken = false;
        let entries = dump
            .entries
            .into_iter()
            .map(|line| {
                let is_current = dump.current.as_deref().is_some_and(|x| same_id(x, &line.id));
                let is_next = !next_taken && dump.next.as_deref().is_some_and(|x| same_id(x, &line.id));
                next_taken |= is_next;

                EntryBuilder::new(line.id, line.description)
                    .current(is_current)
                    .next(is_next)
                    .extra(line.raw)
                    .build()
            })
            .collect();

        Ok(entries)
    }

    /// Lists the single GRUB placeholder entry.
    fn list_grub(&self) -> BootResult<Vec<BootEntry>> {
        warn!("efibootmgr is not available, GRUB menu entries cannot be enumerated");

        let Some(editenv) = &self.grub_editenv else {
            debug!("grub-editenv is not available, returning no entries");
            return Ok(Vec::new());
        };

        let output = self.host.runner.run(&invocation(editenv).arg("list"))?;
        let env = parse_logged::<GrubEnv>(&output.stdout).unwrap_or_default();
        let saved = env.saved_entry();
        if saved.is_none() {
            debug!("grub-editenv did not report saved_entry");
        }

        let mut note = "efibootmgr not found, GRUB menu entries are not enumerated".to_owned();
        if let Some(next) = env.next_entry() {
            note.push_str(&format!(", next_entry is {next}"));
        }

        Ok(vec![
            EntryBuilder::new(GRUB_PLACEHOLDER_ID, "GRUB default entry")
                .next(saved == Some(GRUB_PLACEHOLDER_ID))
                .extra(note)
                .build(),
        ])
    }

    /// Checks that at least one of `tools` is present and that the process is elevated.
    ///
    /// Each tool is paired with the name it is reported under when every tool is missing.
    fn require(&self, tools: &[(&str, Option<&PathBuf>)]) -> BootResult<()> {
        let Some(tool) = tools.iter().find_map(|(_, path)| *path) else {
            let names: Vec<&str> = tools.iter().map(|(name, _)| *name).collect();
            return Err(BootError::ToolNotFound(names.join(" or ")));
        };

        if self.host.privilege.is_elevated() {
            Ok(())
        } else {
            Err(BootError::PermissionDenied(tool_name(tool)))
        }
    }
}

impl BootManager for LinuxBootManager {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn available(&self) -> bool {
        self.efibootmgr.is_some() || self.grub_reboot.is_some()
    }

    fn list_entries(&self) -> BootResult<Vec<BootEntry>> {
        if self.efibootmgr.is_some() {
            self.list_efi()
        } else if self.grub_reboot.is_some() {
            self.list_grub()
        } else {
            Err(BootError::ToolNotFound("efibootmgr or grub-reboot".to_owned()))
        }
    }

    fn set_next(&self, id: &str) -> BootResult<Outcome> {
        self.require(&[
            (EFIBOOTMGR[0], self.efibootmgr.as_ref()),
            (GRUB_REBOOT[0], self.grub_reboot.as_ref()),
        ])?;

        let mut strategies = Vec::new();
        if let Some(path) = &self.efibootmgr {
            strategies.push(Strategy::new("efibootmgr", move || {
                run_checked(&self.host, &tool_name(path), &invocation(path).args(["-n", id]))?;
                Ok(Outcome::new(Effect::OneTimeBoot, format!("Next boot set to {id}")))
            }));
        }
        if let Some(path) = &self.grub_reboot {
            strategies.push(Strategy::new("grub-reboot", move || {
                run_checked(&self.host, &tool_name(path), &invocation(path).arg(id))?;
                Ok(Outcome::new(Effect::OneTimeBoot, format!("Next GRUB boot set to {id}")))
            }));
        }

        first_success(strategies)
    }

    fn clear_next(&self) -> BootResult<Outcome> {
        self.require(&[
            (EFIBOOTMGR[0], self.efibootmgr.as_ref()),
            (GRUB_EDITENV[0], self.grub_editenv.as_ref()),
        ])?;

        let mut strategies = Vec::new();
        if let Some(path) = &self.efibootmgr {
            strategies.push(Strategy::new("efibootmgr", move || {
                run_checked(&self.host, &tool_name(path), &invocation(path).arg("-N"))?;
                Ok(Outcome::new(Effect::Cleared, "BootNext removed"))
            }));
        }
        if let Some(path) = &self.grub_editenv {
            strategies.push(Strategy::new("grub-editenv", move || {
                run_checked(
                    &self.host,
                    &tool_name(path),
                    &invocation(path).args(["-", "unset", "next_entry"]),
                )?;
                Ok(Outcome::new(Effect::Cleared, "GRUB next_entry removed"))
            }));
        }

        first_success(strategies)
    }

    fn reboot_now(&self) -> BootResult<Outcome> {
        if !self.host.privilege.is_elevated() {
            return Err(BootError::PermissionDenied("systemctl reboot".to_owned()));
        }

        run_checked(&self.host, "systemctl", &Invocation::new("systemctl").arg("reboot"))?;
        Ok(Outcome::new(Effect::Rebooting, "Rebooting"))
    }
}

/// Starts an invocation of a located tool.
fn invocation(path: &Path) -> Invocation {
    Invocation::new(path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entry::count_next, system::testing::TestHost};

    const DUMP: &str = "BootCurrent: 0002
Timeout: 1 seconds
BootNext: 0005
BootOrder: 0002,0005
Boot0002* Ubuntu
Boot0005* Windows
";

    fn manager(test: &TestHost) -> LinuxBootManager {
        LinuxBootManager::new(&Options::default(), test.host())
    }

    fn flags(entries: &[BootEntry]) -> Vec<(&str, bool, bool)> {
        entries
            .iter()
            .map(|x| (x.id.as_str(), x.is_current, x.is_next))
            .collect()
    }

    #[test]
    fn test_efi_listing() -> BootResult<()> {
        let test = TestHost::new().tool("efibootmgr");
        test.reply_ok("efibootmgr", DUMP);
        let entries = manager(&test).list_entries()?;

        assert_eq!(flags(&entries), [("0002", true, false), ("0005", false, true)]);
        assert_eq!(entries[0].description, "Ubuntu");
        assert_eq!(entries[1].extra.as_deref(), Some("Boot0005* Windows"));
        Ok(())
    }

    #[test]
    fn test_at_most_one_next() -> BootResult<()> {
        let test = TestHost::new().tool("efibootmgr");
        test.reply_ok("efibootmgr", "BootNext: 0001\nBoot0001* A\nBoot0001* A again\n");
        let entries = manager(&test).list_entries()?;
        assert_eq!(entries.len(), 2);
        assert_eq!(count_next(&entries), 1);
        Ok(())
    }

    #[test]
    fn test_efi_failure() {
        let test = TestHost::new().tool("efibootmgr");
        test.reply_err("efibootmgr", 2, "EFI variables are not supported on this system.");
        let result = manager(&test).list_entries();
        assert!(matches!(
            result,
            Err(BootError::ToolExecutionFailed { ref message, .. }) if message.contains("not supported")
        ));
    }

    #[test]
    fn test_no_tools() {
        let test = TestHost::new().elevated(true);
        let manager = manager(&test);
        assert!(!manager.available());
        assert!(matches!(manager.list_entries(), Err(BootError::ToolNotFound(_))));
        assert!(matches!(
            manager.set_next("0001"),
            Err(BootError::ToolNotFound(ref x)) if x == "efibootmgr or grub-reboot"
        ));
        assert!(matches!(
            manager.clear_next(),
            Err(BootError::ToolNotFound(ref x)) if x == "efibootmgr or grub-editenv"
        ));
        assert!(test.calls().is_empty());
    }

    #[test]
    fn test_grub_placeholder() -> BootResult<()> {
        let test = TestHost::new().tool("grub2-reboot").tool("grub2-editenv");
        test.reply_ok("grub2-editenv list", "saved_entry=0\nboot_success=1\n");
        let manager = manager(&test);
        assert!(manager.available());

        let entries = manager.list_entries()?;
        assert_eq!(flags(&entries), [("0", false, true)]);
        assert_eq!(entries[0].description, "GRUB default entry");
        assert!(entries[0].extra.is_some());
        Ok(())
    }

    #[test]
    fn test_grub_placeholder_not_next() -> BootResult<()> {
        let test = TestHost::new().tool("grub-reboot").tool("grub-editenv");
        test.reply_ok("grub-editenv list", "saved_entry=gnulinux-advanced\nnext_entry=2\n");
        let entries = manager(&test).list_entries()?;
        assert_eq!(flags(&entries), [("0", false, false)]);
        assert!(entries[0].extra.as_deref().is_some_and(|x| x.contains("next_entry is 2")));

        let test = TestHost::new().tool("grub-reboot").tool("grub-editenv");
        test.reply_ok("grub-editenv list", "boot_success=1\n");
        let entries = manager(&test).list_entries()?;
        assert_eq!(count_next(&entries), 0);
        Ok(())
    }

    #[test]
    fn test_grub_without_editenv() -> BootResult<()> {
        let test = TestHost::new().tool("grub-reboot").tool("grub-set-default");
        let manager = manager(&test);
        assert!(manager.list_entries()?.is_empty());
        assert!(manager.grub_set_default().is_some());
        assert!(test.calls().is_empty());
        Ok(())
    }

    #[test]
    fn test_privilege_gating() {
        let test = TestHost::new().tool("efibootmgr").elevated(false);
        let manager = manager(&test);
        assert!(matches!(
            manager.set_next("0005"),
            Err(BootError::PermissionDenied(ref tool)) if tool == "efibootmgr"
        ));
        assert!(matches!(manager.clear_next(), Err(BootError::PermissionDenied(_))));
        assert!(matches!(manager.reboot_now(), Err(BootError::PermissionDenied(_))));
        assert!(test.calls().is_empty());
    }

    #[test]
    fn test_set_next_round_trip() -> BootResult<()> {
        let test = TestHost::new().tool("efibootmgr").elevated(true);
        test.reply_ok("efibootmgr", "BootCurrent: 0002\nBoot0002* Ubuntu\nBoot0005* Windows\n");
        test.reply_ok("efibootmgr -n 0005", "BootNext: 0005\n");
        let manager = manager(&test);

        let outcome = manager.set_next("0005")?;
        assert_eq!(outcome.effect, Effect::OneTimeBoot);
        assert!(outcome.message.contains("0005"));

        test.reply_ok("efibootmgr", DUMP);
        let entries = manager.list_entries()?;
        assert!(entries.iter().any(|x| x.id == "0005" && x.is_next));
        Ok(())
    }

    #[test]
    fn test_set_next_falls_back_to_grub() -> BootResult<()> {
        let test = TestHost::new().tool("efibootmgr").tool("grub-reboot").elevated(true);
        test.reply_err("efibootmgr -n 2", 5, "Could not set BootNext");
        test.reply_ok("grub-reboot 2", "");
        let outcome = manager(&test).set_next("2")?;
        assert!(outcome.message.contains("GRUB"));
        assert_eq!(test.calls(), ["efibootmgr -n 2", "grub-reboot 2"]);
        Ok(())
    }

    #[test]
    fn test_set_next_total_failure() {
        let test = TestHost::new().tool("efibootmgr").tool("grub-reboot").elevated(true);
        test.reply_err("efibootmgr -n 7", 5, "efibootmgr says no");
        test.reply_err("grub-reboot 7", 1, "grub says no");
        let message = manager(&test)
            .set_next("7")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(message.contains("efibootmgr says no"));
        assert!(message.contains("grub says no"));
    }

    #[test]
    fn test_clear_next() -> BootResult<()> {
        let test = TestHost::new().tool("grub-reboot").tool("grub-editenv").elevated(true);
        test.reply_ok("grub-editenv - unset next_entry", "");
        let outcome = manager(&test).clear_next()?;
        assert_eq!(outcome.effect, Effect::Cleared);

        let test = TestHost::new().tool("efibootmgr").elevated(true);
        test.reply_ok("efibootmgr -N", "");
        assert_eq!(manager(&test).clear_next()?.effect, Effect::Cleared);
        Ok(())
    }

    #[test]
    fn test_reboot() -> BootResult<()> {
        let test = TestHost::new().elevated(true);
        test.reply_ok("systemctl reboot", "");
        assert_eq!(manager(&test).reboot_now()?.effect, Effect::Rebooting);

        let test = TestHost::new().elevated(true);
        test.reply_err("systemctl reboot", 1, "Failed to reboot");
        assert!(manager(&test).reboot_now().is_err());
        Ok(())
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let test = TestHost::new().tool("efibootmgr");
        test.fail_spawn("efibootmgr");
        assert!(matches!(manager(&test).list_entries(), Err(BootError::Command(_))));
    }
}
