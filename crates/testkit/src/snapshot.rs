//! Golden-file checks for serialized assets.
//!
//! Documents are compared as canonical pretty JSON (object keys sorted), so
//! field order in the writer does not matter. Set `PWA_UPDATE_SNAPSHOTS=1`
//! to rewrite the golden files from the current output.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "PWA_UPDATE_SNAPSHOTS";

/// Assert that `value` matches the JSON snapshot stored at `path`.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if update_requested() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("writing snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "snapshot missing at {} (rerun with {UPDATE_SNAPSHOTS_ENV}=1 to create it)",
            path.display()
        )
    })?;
    // Goldens may be checked out with CRLF line endings.
    if expected.replace("\r\n", "\n") != actual {
        anyhow::bail!(
            "snapshot mismatch at {} (rerun with {UPDATE_SNAPSHOTS_ENV}=1 to update)\n--- expected\n{expected}\n--- actual\n{actual}",
            path.display()
        );
    }
    Ok(())
}

/// Assert two JSON documents are equal ignoring object key order.
pub fn assert_same_json<A: Serialize, B: Serialize>(actual: &A, expected: &B) -> Result<()> {
    let actual = canonical_json(actual)?;
    let expected = canonical_json(expected)?;
    if actual != expected {
        anyhow::bail!("JSON differs\n--- expected\n{expected}\n--- actual\n{actual}");
    }
    Ok(())
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Pretty JSON with every object's keys sorted and a trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("serializing snapshot value")?;
    let mut text = serde_json::to_string_pretty(&sort_keys(value))
        .context("formatting snapshot JSON")?;
    text.push('\n');
    Ok(text)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
