//! Numbered source lists.
//!
//! Citation `[n]` refers to the n-th source, counting from one. Sources are
//! loaded from a JSON array, an API response envelope holding a `citations`
//! or `sources` array, or JSONL (one entry per line). An entry is either a
//! bare URL string or an object with `url` and an optional `title`.
//!
//! Entries without a usable url keep their slot as `None`, so the numbering
//! of later entries never shifts.

use std::fs;
use std::path::Path;

use log::warn;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors that can occur when loading sources.
#[derive(Error, Debug)]
pub enum RefsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSONL at line {line}: {message}")]
    JsonlError { line: usize, message: String },

    #[error("Sources must be a JSON array or an object with a 'citations' or 'sources' array")]
    InvalidShape,
}

/// A cited source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    /// Display title; the domain when the input has none
    pub title: String,
    /// Host without a leading `www.`
    pub domain: String,
    /// Whether the domain belongs to one of the configured official domains
    pub is_official: bool,
}

impl Source {
    /// Builds a source, deriving the domain and official flag from the URL.
    pub fn new(url: &str, title: Option<&str>, official_domains: &[String]) -> Self {
        let domain = extract_domain(url);
        let is_official = official_domains
            .iter()
            .any(|official| !official.is_empty() && domain.contains(official.as_str()));
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => domain.clone(),
        };
        Source {
            url: url.to_string(),
            title,
            domain,
            is_official,
        }
    }
}

/// Host of a URL without a leading `www.`, or the input itself when it
/// cannot be parsed.
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Loads sources from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has an unsupported shape.
pub fn load_sources(
    path: &Path,
    official_domains: &[String],
) -> Result<Vec<Option<Source>>, RefsError> {
    let content = fs::read_to_string(path)?;
    parse_sources(&content, official_domains)
}

/// Parses sources from JSON, an API envelope, or JSONL.
///
/// Slot `n - 1` of the result belongs to citation `[n]`; it is `None` when
/// that entry has no url.
pub fn parse_sources(
    content: &str,
    official_domains: &[String],
) -> Result<Vec<Option<Source>>, RefsError> {
    let entries = normalize_entries(content)?;

    let sources: Vec<Option<Source>> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let source = entry_to_source(entry, official_domains);
            if source.is_none() {
                warn!("source entry {} has no url", index + 1);
            }
            source
        })
        .collect();

    Ok(sources)
}

fn entry_to_source(entry: &Value, official_domains: &[String]) -> Option<Source> {
    match entry {
        Value::String(url) if !url.trim().is_empty() => {
            Some(Source::new(url.trim(), None, official_domains))
        }
        Value::Object(map) => {
            let url = map.get("url").and_then(Value::as_str)?.trim();
            if url.is_empty() {
                return None;
            }
            let title = map.get("title").and_then(Value::as_str);
            Some(Source::new(url, title, official_domains))
        }
        _ => None,
    }
}

/// Normalizes content to the list of raw entries.
fn normalize_entries(content: &str) -> Result<Vec<Value>, RefsError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed)? {
            Value::Array(items) => Ok(items),
            _ => Err(RefsError::InvalidShape),
        };
    }

    // A single JSON document that is an object: look for an envelope.
    if let Ok(Value::Object(mut map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["citations", "sources"] {
            if let Some(Value::Array(items)) = map.remove(key) {
                return Ok(items);
            }
        }
        // A one-line JSONL file with a single source object.
        if map.contains_key("url") {
            return Ok(vec![Value::Object(map)]);
        }
        return Err(RefsError::InvalidShape);
    }

    let mut entries = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => entries.push(value),
            Err(e) => {
                return Err(RefsError::JsonlError {
                    line: line_num + 1,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(entries)
}
