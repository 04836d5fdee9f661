// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gqlcache", version, about = "Normalized GraphQL client cache")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store lives and how objects are identified
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store directory
    #[arg(long, global = true, default_value = "./gqlcache_db")]
    pub path: PathBuf,

    /// JSON store configuration; overrides --path and --key-fields
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fields identifying an object together with __typename, e.g. `id`
    #[arg(long, global = true, value_delimiter = ',')]
    pub key_fields: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// Normalize a saved server response and merge it into the store
    Normalize {
        /// Operation JSON (name, kind, selections)
        #[arg(long)]
        operation: PathBuf,

        /// Server response JSON ({data, errors, extensions})
        #[arg(long)]
        response: PathBuf,

        /// Variables JSON object
        #[arg(long)]
        variables: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Read an operation from the store
    Read {
        /// Operation JSON (name, kind, selections)
        #[arg(long)]
        operation: PathBuf,

        /// Variables JSON object
        #[arg(long)]
        variables: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// List stored records
    Records {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove one record, or every record whose key contains a pattern
    Remove {
        /// Exact record key
        #[arg(required_unless_present = "pattern", conflicts_with = "pattern")]
        key: Option<String>,

        /// Case-insensitive key substring
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Remove every record
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
