// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! The `bootnext-rs` library crate.
//!
//! This exposes the boot manager adapters, the tool output parsers and the process helpers that the adapters are
//! built on, so that frontends (such as the command line interface in `bootnext-rs-cli`) and the fuzzers can use
//! them.
//!
//! Two boot configuration stores are supported:
//! - EFI boot variables on Linux, through `efibootmgr` (with a degraded GRUB fallback through `grub-reboot`)
//! - The Windows BCD store, through `bcdedit`
//!
//! Both are presented as an ordered list of [`entry::BootEntry`], each of which may be flagged as the current
//! entry or as the entry for the next boot.
//!
//! ```no_run
//! use bootnext_rs_core::{boot::manager_for, config::Options, system::Host};
//!
//! let options = Options::default();
//! let manager = manager_for(options.platform.resolve(), &options, Host::native(options.timeout));
//! if manager.available() {
//!     for entry in manager.list_entries().unwrap_or_default() {
//!         println!("{} {}", entry.id, entry.description);
//!     }
//! }
//! ```
//!
//! ## MSRV
//!
//! The minimum supported rust version is 1.88.0.

/// The primary result type that wraps around [`crate::error::BootError`].
pub type BootResult<T> = Result<T, crate::error::BootError>;

pub mod boot;
pub mod config;
pub mod entry;
pub mod error;
pub mod parsers;
pub mod system;

mod features;
