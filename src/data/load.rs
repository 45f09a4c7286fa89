//! Dataset loading
//!
//! Reads a dataset from a local file or an http(s) URL, in CSV, JSON
//! array, or GeoJSON form, and applies the configured transforms.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::{Dataset, Record};
use crate::config::{DatasetConfig, SortOrder};

/// Supported dataset formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of objects, or a GeoJSON FeatureCollection
    Json,
}

/// Guess the format from a file name or URL
pub fn infer_format(name: &str) -> Option<DataFormat> {
    let lower = name.to_lowercase();
    let trimmed = lower.split(['?', '#']).next().unwrap_or(&lower);
    if trimmed.ends_with(".csv") {
        Some(DataFormat::Csv)
    } else if trimmed.ends_with(".json") || trimmed.ends_with(".geojson") {
        Some(DataFormat::Json)
    } else {
        None
    }
}

/// Load a dataset as described by the config
pub async fn load(config: &DatasetConfig) -> Result<Dataset> {
    let (name, text) = fetch_text(config).await?;

    let format = config
        .format
        .or_else(|| infer_format(&name))
        .unwrap_or(DataFormat::Csv);

    let mut dataset = match format {
        DataFormat::Csv => parse_csv(&name, &text, &config.label_column, &config.value_column)?,
        DataFormat::Json => parse_json(&name, &text, &config.label_column, &config.value_column)?,
    };

    if config.group_sum {
        dataset = dataset.group_sum();
    }
    if let Some(order) = &config.sort {
        dataset.sort_by_value(*order == SortOrder::Descending);
    }
    if let Some(limit) = config.limit {
        dataset.truncate(limit);
    }

    log::debug!("loaded dataset '{}' with {} records", name, dataset.len());
    Ok(dataset)
}

async fn fetch_text(config: &DatasetConfig) -> Result<(String, String)> {
    match (&config.path, &config.url) {
        (Some(path), None) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read dataset file {:?}", path))?;
            Ok((path.clone(), text))
        }
        (None, Some(url)) => {
            let response = reqwest::get(url)
                .await
                .with_context(|| format!("failed to fetch dataset from {}", url))?;
            if !response.status().is_success() {
                bail!("dataset server returned status {}", response.status());
            }
            let text = response.text().await.context("failed to read dataset body")?;
            Ok((url.clone(), text))
        }
        _ => bail!("dataset needs exactly one of 'path' or 'url'"),
    }
}

/// Parse CSV text with a header row
fn parse_csv(name: &str, text: &str, label_column: &str, value_column: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .with_context(|| format!("CSV has no column '{}'", label_column))?;
    let value_idx = headers
        .iter()
        .position(|h| h == value_column)
        .with_context(|| format!("CSV has no column '{}'", value_column))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", row + 2))?;
        let label = record.get(label_idx).unwrap_or("").to_string();
        let raw = record.get(value_idx).unwrap_or("");

        match raw.parse::<f64>() {
            Ok(value) => records.push(Record::new(label, value)),
            Err(_) => log::warn!(
                "dropping row {} of '{}': '{}' is not numeric",
                row + 2,
                name,
                raw
            ),
        }
    }

    Ok(Dataset::new(name, records))
}

/// Parse a JSON array of objects, or a GeoJSON FeatureCollection whose
/// feature properties carry the columns
fn parse_json(name: &str, text: &str, label_column: &str, value_column: &str) -> Result<Dataset> {
    let root: serde_json::Value = serde_json::from_str(text).context("invalid JSON")?;

    let objects: Vec<&serde_json::Map<String, serde_json::Value>> =
        if root.get("type").and_then(|t| t.as_str()) == Some("FeatureCollection") {
            root.get("features")
                .and_then(|f| f.as_array())
                .context("FeatureCollection without a features array")?
                .iter()
                .filter_map(|f| f.get("properties").and_then(|p| p.as_object()))
                .collect()
        } else if let Some(array) = root.as_array() {
            array.iter().filter_map(|v| v.as_object()).collect()
        } else {
            bail!("expected a JSON array of objects or a GeoJSON FeatureCollection");
        };

    let mut records = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        let label = match obj.get(label_column) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                log::warn!("dropping object {} of '{}': no '{}'", i, name, label_column);
                continue;
            }
        };

        let value = match obj.get(value_column) {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match value {
            Some(value) => records.push(Record::new(label, value)),
            None => log::warn!(
                "dropping object {} of '{}': '{}' is not numeric",
                i,
                name,
                value_column
            ),
        }
    }

    Ok(Dataset::new(name, records))
}
