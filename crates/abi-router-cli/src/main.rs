// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use clap::*;
use colored::Colorize;
use log::debug;
use simplelog::{Config, LevelFilter, TermLogger, TerminalMode};

mod describe;
mod manifest;

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Command-line tool for ARC-4 method selectors and contract descriptors",
    rename_all = "kebab-case",
    author,
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// General options
    #[clap(flatten)]
    pub general_config: GeneralConfig,

    #[clap(subcommand)]
    pub command: Commands,
}

/// General options
#[derive(Args)]
#[clap(next_help_heading = "General Options")]
pub struct GeneralConfig {
    /// Display debug logs
    #[clap(name = "verbose", long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the selector of each method signature
    Selector {
        /// Method signatures such as `add(uint64,uint64)uint64`
        #[clap(required = true)]
        signatures: Vec<String>,
    },
    /// Print the ARC-4 contract descriptor as JSON
    Describe(describe::DescribeArgs),
}

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let level = if cli.general_config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed);

    debug!("abi-router CLI version: {}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Selector { signatures } => describe::print_selectors(&signatures),
        Commands::Describe(args) => describe::execute(args),
    };

    match result {
        Ok(_) => (),
        Err(err) => {
            let err = format!("{:?}", err);
            println!("{}", err.bold().red());
            std::process::exit(1);
        }
    }
}
