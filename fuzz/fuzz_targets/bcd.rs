// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

#![no_main]

use bootnext_rs_core::parsers::bcd::{BcdDocument, Label};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let document = BcdDocument::new(data);
    if let Some(manager) = document.firmware_manager() {
        let _ = manager.tokens(Label::DisplayOrder);
        let _ = manager.guids(Label::BootSequence);
    }
    let _ = document.windows_boot_manager().map(|block| block.identity());
});
