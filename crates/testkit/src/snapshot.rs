//! Deterministic snapshot testing utilities.
//!
//! This module provides a minimal "golden value" snapshot helper for tests.
//! Snapshots are serialized as canonical pretty JSON with object keys sorted,
//! so two runs of the same deterministic simulation produce byte-identical
//! strings that can be compared directly.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Serialize `value` as canonical pretty JSON (object keys sorted).
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

/// Assert that two serializable values have identical canonical JSON forms.
pub fn assert_same_snapshot<A: Serialize, B: Serialize>(a: &A, b: &B) -> Result<()> {
    let a = canonical_json(a)?;
    let b = canonical_json(b)?;
    if a != b {
        anyhow::bail!("Snapshot mismatch:\nleft:\n{a}\nright:\n{b}");
    }
    Ok(())
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
