// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers

use super::commands::{OutputFormat, StoreArgs};
use super::output::ResultFormatter;
use colored::*;
use gqlcache::selection::Variables;
use gqlcache::{GraphQLResponse, Operation, Store, StoreConfig};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Handle the normalize command
pub fn handle_normalize(
    store_args: &StoreArgs,
    operation: PathBuf,
    response: PathBuf,
    variables: Option<PathBuf>,
    format: OutputFormat,
) -> CliResult {
    let operation: Operation = read_json(&operation)?;
    let variables = read_variables(variables.as_deref())?;
    let response = GraphQLResponse::from_slice(&fs::read(&response)?)?;
    let store = open_store(store_args)?;

    let (result, records) =
        match response.parse_result(&operation, &variables, store.cache_key_resolver()) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{}", format!("Error: {}", e).red());
                return Err(e.into());
            }
        };

    let record_count = records.as_ref().map(|r| r.len()).unwrap_or(0);
    let changed = match records {
        Some(records) => store.publish(records, None)?,
        None => Default::default(),
    };

    print!(
        "{}",
        ResultFormatter::format_normalized(&result, record_count, &changed, format)
    );
    Ok(())
}

/// Handle the read command
pub fn handle_read(
    store_args: &StoreArgs,
    operation: PathBuf,
    variables: Option<PathBuf>,
    format: OutputFormat,
) -> CliResult {
    let operation: Operation = read_json(&operation)?;
    let variables = read_variables(variables.as_deref())?;
    let store = open_store(store_args)?;

    match store.load(&operation, &variables) {
        Ok(result) => {
            print!("{}", ResultFormatter::format_result(&result, format));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            Err(e.into())
        }
    }
}

/// Handle the records command
pub fn handle_records(store_args: &StoreArgs, format: OutputFormat) -> CliResult {
    let store = open_store(store_args)?;
    let records = store.records()?;
    print!("{}", ResultFormatter::format_records(&records, format));
    Ok(())
}

/// Handle the remove command
pub fn handle_remove(store_args: &StoreArgs, key: Option<String>, pattern: Option<String>) -> CliResult {
    let store = open_store(store_args)?;
    let before = store.records()?.len();

    store.within_read_write_transaction(|transaction| match (&key, &pattern) {
        (_, Some(pattern)) => transaction.remove_objects(pattern),
        (Some(key), None) => transaction.remove_object(key),
        (None, None) => Ok(()),
    })?;

    let removed = before.saturating_sub(store.records()?.len());
    println!("{}", format!("Removed {} record(s)", removed).green());
    Ok(())
}

/// Handle the clear command
pub fn handle_clear(store_args: &StoreArgs, yes: bool) -> CliResult {
    if !yes {
        println!(
            "{}",
            format!("This removes every record in {:?}. Re-run with --yes.", store_args.path)
                .yellow()
        );
        return Ok(());
    }

    let store = open_store(store_args)?;
    store.clear_cache()?;
    println!("{}", "Store cleared".green());
    Ok(())
}

fn open_store(args: &StoreArgs) -> Result<Store, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => read_json::<StoreConfig>(path)?,
        None => StoreConfig::persistent(&args.path).with_cache_key_fields(args.key_fields.clone()),
    };
    log::debug!("Opening store with {:?}", config);
    Ok(Store::open(config)?)
}

fn read_variables(path: Option<&Path>) -> Result<Variables, Box<dyn std::error::Error>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Variables::new()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Could not read {:?}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid JSON in {:?}: {}", path, e).into())
}
