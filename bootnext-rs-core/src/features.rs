// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Stubs for features that are disabled

/// Creates an optional adapter.
///
/// For an adapter that implements `BootManager`, one should add the adapter to this features file in order to allow it
/// to be disabled or enabled through the features.
///
/// This macro takes four parameters. The first of these is the feature as a string literal, like "linux".
/// The second is the feature as an identifier, and should be the name of the adapter module under `boot`.
/// The third is the name of the adapter struct, such as `LinuxBootManager`.
/// The fourth is the [`crate::boot::Platform`] variant that the adapter serves.
/// The final macro invocation should look something like
/// `optional_adapter!("linux", linux, LinuxBootManager, Linux)`.
macro_rules! optional_adapter {
    ($feature:literal, $name:ident, $manager:ident, $platform:ident) => {
        /// The adapter for $manager
        #[cfg(feature = $feature)]
        pub(crate) mod $name {
            pub(crate) use crate::boot::$name::$manager;
        }

        /// The disabled adapter for $manager
        #[cfg(not(feature = $feature))]
        pub(crate) mod $name {
            use crate::{
                BootResult,
                boot::{BootManager, Outcome, Platform},
                config::Options,
                entry::BootEntry,
                error::BootError,
                system::Host,
            };

            /// An adapter that was compiled out.
            pub(crate) struct $manager;

            impl $manager {
                /// Constructs the stub, discarding its arguments.
                pub(crate) fn new(_options: &Options, _host: Host) -> Self {
                    Self
                }

                /// The error returned by every operation.
                fn disabled() -> BootError {
                    BootError::ToolNotFound(concat!("the ", $feature, " adapter is disabled").to_owned())
                }
            }

            impl BootManager for $manager {
                fn platform(&self) -> Platform {
                    Platform::$platform
                }

                fn available(&self) -> bool {
                    false
                }

                fn list_entries(&self) -> BootResult<Vec<BootEntry>> {
                    Err(Self::disabled())
                }

                fn set_next(&self, _id: &str) -> BootResult<Outcome> {
                    Err(Self::disabled())
                }

                fn clear_next(&self) -> BootResult<Outcome> {
                    Err(Self::disabled())
                }

                fn reboot_now(&self) -> BootResult<Outcome> {
                    Err(Self::disabled())
                }
            }
        }
    };
}

optional_adapter!("linux", linux, LinuxBootManager, Linux);
optional_adapter!("windows", windows, WindowsBootManager, Windows);
