// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use gqlcache::{CacheKey, GraphQLResult, RecordSet};
use std::collections::HashSet;

/// Result formatter for the table and JSON formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format the outcome of normalizing a response
    pub fn format_normalized(
        result: &GraphQLResult,
        record_count: usize,
        changed: &HashSet<CacheKey>,
        format: OutputFormat,
    ) -> String {
        let mut changed: Vec<&CacheKey> = changed.iter().collect();
        changed.sort();

        match format {
            OutputFormat::Json => {
                let status = if result.data.is_some() { "success" } else { "no_data" };
                Self::to_pretty_json(serde_json::json!({
                    "status": status,
                    "records": record_count,
                    "changed_keys": changed,
                    "errors": result.errors,
                }))
            }
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("{}\n", "Response normalized".bold().green()));
                output.push_str(&format!("Records merged: {}\n", record_count));
                output.push_str(&format!("Fields changed: {}\n", changed.len()));

                if !changed.is_empty() {
                    let mut table = Table::new();
                    table.load_preset(UTF8_FULL);
                    table.set_header(vec![Cell::new("Changed key").fg(Color::Green)]);
                    for key in changed {
                        table.add_row(vec![key.as_str()]);
                    }
                    output.push_str(&table.to_string());
                    output.push('\n');
                }

                output.push_str(&Self::format_errors(result));
                output
            }
        }
    }

    /// Format data read from the store
    pub fn format_result(result: &GraphQLResult, format: OutputFormat) -> String {
        let data = result
            .data
            .clone()
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Null);

        match format {
            OutputFormat::Json => Self::to_pretty_json(data),
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("{}\n", "Cached result".bold().green()));
                if let Some(received_at) = result.metadata.first_received_at {
                    output.push_str(&format!("Oldest record: {}\n", received_at.to_rfc3339()));
                }

                let mut keys: Vec<&CacheKey> =
                    result.dependent_keys.iter().flatten().collect();
                keys.sort();
                output.push_str(&format!("Dependent keys: {}\n\n", keys.len()));
                output.push_str(&Self::to_pretty_json(data));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![Cell::new("Dependent key").fg(Color::Green)]);
                for key in keys {
                    table.add_row(vec![key.as_str()]);
                }
                output.push_str(&table.to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Format stored records
    pub fn format_records(records: &RecordSet, format: OutputFormat) -> String {
        let mut rows: Vec<_> = records.rows().collect();
        rows.sort_by(|a, b| a.key().cmp(b.key()));

        match format {
            OutputFormat::Json => {
                let mut map = serde_json::Map::new();
                for row in rows {
                    let fields: serde_json::Map<String, serde_json::Value> = row
                        .record
                        .fields
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect();
                    map.insert(
                        row.key().to_string(),
                        serde_json::json!({
                            "fields": fields,
                            "last_received_at": row.last_received_at.to_rfc3339(),
                        }),
                    );
                }
                Self::to_pretty_json(serde_json::Value::Object(map))
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    return format!("{}\n", "No records found".yellow());
                }

                let mut output = String::new();
                output.push_str(&format!("{}\n", "Records".bold().green()));
                output.push_str(&format!("Records stored: {}\n\n", rows.len()));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![
                    Cell::new("Key").fg(Color::Green),
                    Cell::new("Field").fg(Color::Green),
                    Cell::new("Value").fg(Color::Green),
                ]);
                for row in rows {
                    for (name, value) in &row.record.fields {
                        table.add_row(vec![row.key().to_string(), name.clone(), value.to_string()]);
                    }
                }

                output.push_str(&table.to_string());
                output.push('\n');
                output
            }
        }
    }

    fn format_errors(result: &GraphQLResult) -> String {
        if !result.has_errors() {
            return String::new();
        }

        let mut output = format!("\n{}\n", "Server errors:".bold().yellow());
        for (i, error) in result.errors.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, error.to_string().yellow()));
        }
        output
    }

    fn to_pretty_json(value: serde_json::Value) -> String {
        let mut rendered = serde_json::to_string_pretty(&value).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}".to_string()
        });
        rendered.push('\n');
        rendered
    }
}
