// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! gqlcache CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still raise it
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let store = &cli.store;
    match cli.command {
        Commands::Version => {
            println!("{} {}", "gqlcache".bold().green(), gqlcache::VERSION);
            println!("Normalized GraphQL client cache");
            Ok(())
        }

        Commands::Normalize {
            operation,
            response,
            variables,
            format,
        } => cli::handle_normalize(store, operation, response, variables, format),

        Commands::Read {
            operation,
            variables,
            format,
        } => cli::handle_read(store, operation, variables, format),

        Commands::Records { format } => cli::handle_records(store, format),

        Commands::Remove { key, pattern } => cli::handle_remove(store, key, pattern),

        Commands::Clear { yes } => cli::handle_clear(store, yes),
    }
}
