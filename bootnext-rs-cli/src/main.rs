// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A command line interface frontend to `bootnext-rs`.

use std::{fmt::Write, path::PathBuf, process::ExitCode};

use bootnext_rs_core::{
    BootResult,
    boot::{Outcome, manager_for, report},
    config::{Options, PlatformChoice},
    entry::BootEntry,
    system::{Host, log_backend::StderrLogger},
};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

/// The exit code used when no supported boot manager is available.
const EXIT_UNAVAILABLE: u8 = 2;

/// Query and change the entry that the next boot will use.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force a platform instead of detecting it (auto, linux, windows)
    #[arg(long, global = true)]
    platform: Option<PlatformChoice>,

    /// Include recovery environment entries in listings
    #[arg(long, global = true, default_value_t = false)]
    show_recovery: bool,

    /// Increase the log level, may be repeated
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// The operations of the program.
#[derive(Subcommand)]
enum Commands {
    /// List boot entries (the default)
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        output: Format,
    },

    /// Boot the given entry on the next boot only
    Set {
        /// The identifier of the entry, as shown by list
        id: String,
    },

    /// Remove the one time boot entry
    Clear,

    /// Reboot immediately
    Reboot,
}

/// The output format of a listing.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Tab separated columns
    Text,

    /// A JSON array
    Json,
}

/// The actual main function of the program, which returns an [`anyhow::Result`].
///
/// # Errors
///
/// May return an `Error` if the configuration file could not be read, or the entries could not be listed.
fn main_func() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut options = Options::load(args.config.as_deref())?;
    if let Some(platform) = args.platform {
        options.platform = platform;
    }
    if args.show_recovery {
        options.show_recovery = true;
    }

    StderrLogger::install(raise(options.log_level, args.verbose));

    let manager = manager_for(
        options.platform.resolve(),
        &options,
        Host::native(options.timeout),
    );
    if !manager.available() {
        eprintln!(
            "Error: No supported boot manager was found for {}",
            manager.platform()
        );
        return Ok(ExitCode::from(EXIT_UNAVAILABLE));
    }

    let command = args.command.unwrap_or(Commands::List {
        output: Format::Text,
    });

    let code = match command {
        Commands::List { output } => {
            let entries = manager.list_entries()?;
            match output {
                Format::Text => print!("{}", render_text(&entries)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            }
            ExitCode::SUCCESS
        }
        Commands::Set { id } => finish(&manager.set_next(&id)),
        Commands::Clear => finish(&manager.clear_next()),
        Commands::Reboot => finish(&manager.reboot_now()),
    };

    Ok(code)
}

/// Prints the result of a mutation and converts it into an exit code.
fn finish(result: &BootResult<Outcome>) -> ExitCode {
    let (success, message) = report(result);
    if success {
        println!("{message}");
        ExitCode::SUCCESS
    } else {
        eprintln!("Error: {message}");
        ExitCode::FAILURE
    }
}

/// Renders entries as tab separated columns, under a header.
fn render_text(entries: &[BootEntry]) -> String {
    let mut out = String::from("ID\tCURRENT\tNEXT\tDESCRIPTION\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            entry.id,
            u8::from(entry.is_current),
            u8::from(entry.is_next),
            entry.description
        );
    }
    out
}

/// Raises a log level by a number of steps, saturating at [`LevelFilter::Trace`].
fn raise(level: LevelFilter, steps: u8) -> LevelFilter {
    LevelFilter::iter()
        .skip_while(|x| *x < level)
        .nth(usize::from(steps))
        .unwrap_or(LevelFilter::Trace)
}

/// The main function of the program.
///
/// Errors are printed rather than panicking, and result in an exit code of 1.
fn main() -> ExitCode {
    main_func().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    })
}
