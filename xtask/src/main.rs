use clap::{Parser, Subcommand};

use crate::fuzz::Fuzz;

mod build;
mod doc;
mod fuzz;
mod test;

#[derive(Parser)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build all crates in workspace
    Build {
        /// Build with release profile
        #[arg(short, long, default_value_t = false)]
        release: bool,

        /// Space separated list of features
        #[arg(short, long)]
        features: Option<Vec<String>>,

        /// Build with no default features (neither adapter)
        #[arg(long, default_value_t = false)]
        no_default_features: bool,
    },

    /// Build docs for bootnext-rs crates
    Doc {
        /// Document private items in crate
        #[arg(short, long, default_value_t = false)]
        private: bool,

        /// Open in web browser after documenting
        #[arg(short, long, default_value_t = false)]
        open: bool,
    },

    /// Run unit tests and clippy on host
    Test {
        /// Also check that the crate builds with each adapter disabled
        #[arg(long, default_value_t = false)]
        features: bool,
    },

    Fuzz {
        #[command(subcommand)]
        command: Fuzz,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Build {
            release,
            features,
            no_default_features,
        } => build::build_all_crates(release, features, no_default_features)?,
        Commands::Doc { private, open } => doc::doc_crate(private, open)?,
        Commands::Test { features } => test::test_on_host(features)?,
        Commands::Fuzz { command } => fuzz::fuzz_parsers(command)?,
    }
    Ok(())
}
