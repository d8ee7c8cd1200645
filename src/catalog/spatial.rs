//! Canonical encoding of the `spatial` extra.
//!
//! The catalog rejects updates whose `spatial` extra carries a geometry with extra nested
//! members, so before writing a dataset back the geometry is reduced to its `type` and
//! `coordinates` and re-encoded as compact JSON text.

use log::debug;
use serde_json::Value;

use super::models::Dataset;

pub const SPATIAL_KEY: &str = "spatial";

/// Canonical text for a geometry value, or `None` when it cannot be normalized.
/// Accepts either JSON text or an already-structured object.
pub fn canonical_geometry(value: &Value) -> Option<String> {
    let parsed;
    let geometry = match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(e) => {
                debug!("spatial value is not valid JSON, leaving it untouched: {}", e);
                return None;
            }
        },
        other => other,
    };

    let geometry_type = geometry.get("type").filter(|t| t.is_string())?;
    let coordinates = geometry.get("coordinates").filter(|c| c.is_array())?;

    Some(format!(
        "{{\"type\":{},\"coordinates\":{}}}",
        geometry_type, coordinates
    ))
}

/// Rewrites the first `spatial` extra of the document in canonical form.
/// Returns the canonical text when a rewrite happened.
pub fn normalize_spatial_extra(dataset: &mut Dataset) -> Option<String> {
    let slot = dataset.extras.get_mut(SPATIAL_KEY)?;
    let canonical = canonical_geometry(slot)?;
    *slot = Value::String(canonical.clone());
    Some(canonical)
}

/// Mirrors an already normalized geometry onto the top-level `spatial` field.
pub fn finalize_spatial(dataset: &mut Dataset, canonical: &str) {
    dataset.set_field(SPATIAL_KEY, Value::String(canonical.to_string()));
}
