use std::io::Read;

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::client::QueryParams;
use crate::error::ApiError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.insert("message".into(), json!(message));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".into(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a client error in the appropriate format.
///
/// Text mode only adds the backend's field errors; the message itself is
/// printed by the binary.
pub fn output_error(output_format: &OutputFormat, error: &ApiError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = error.to_json();
            response["success"] = json!(false);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            for detail in server_error_details(error) {
                eprintln!("  - {}", detail);
            }
        }
    }
    Ok(())
}

fn server_error_details(error: &ApiError) -> Vec<String> {
    error
        .payload()
        .and_then(|p| p.get("errors"))
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a list of records, one summary line each in text mode
pub fn output_records(
    output_format: &OutputFormat,
    collection_name: &str,
    records: Vec<Value>,
) -> anyhow::Result<()> {
    if records.is_empty() {
        return output_empty_collection(
            output_format,
            collection_name,
            &format!("No {} found", collection_name),
        );
    }
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: records
            }))?);
        }
        OutputFormat::Text => {
            for record in &records {
                println!("{}", summary_line(record));
            }
            println!("{} {}", records.len(), collection_name);
        }
    }
    Ok(())
}

/// Output a single payload as-is
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::String(s) => println!("{}", s),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        },
    }
    Ok(())
}

fn summary_line(record: &Value) -> String {
    let id = record
        .get("_id")
        .or_else(|| record.get("id"))
        .map(display_scalar)
        .unwrap_or_else(|| "-".to_string());
    let label = ["name", "title", "subject", "email"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .unwrap_or("");
    format!("{}\t{}", id, label)
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a JSON document from stdin
pub fn read_stdin_json() -> anyhow::Result<Value> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    if input.trim().is_empty() {
        return Err(anyhow::anyhow!("Expected a JSON object on stdin"));
    }
    serde_json::from_str(&input).map_err(|e| anyhow::anyhow!("Invalid JSON on stdin: {}", e))
}

/// Parse a `--filter` JSON object into query parameters
pub fn parse_filter(filter: Option<&str>) -> anyhow::Result<QueryParams> {
    match filter {
        None => Ok(QueryParams::new()),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Invalid --filter JSON: {}", e))?;
            if !value.is_object() {
                return Err(anyhow::anyhow!("--filter must be a JSON object"));
            }
            Ok(QueryParams::from_json(&value))
        }
    }
}
