use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::{nulls_to_nan, TimeFormat};
use crate::models::LightCurve;

/// Raw JSON structure for a light curve
#[derive(Debug, Deserialize)]
struct RawLightCurve {
    target: String,
    #[serde(default)]
    time_format: TimeFormat,
    time: Vec<f64>,
    flux: Vec<Option<f64>>,
    flux_err: Vec<Option<f64>>,
}

/// Parse a light curve from a JSON file
pub fn parse_light_curve_json(json_path: &Path) -> Result<LightCurve> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;

    parse_light_curve_json_str(&json_content)
        .with_context(|| format!("Failed to parse light curve from {}", json_path.display()))
}

/// Parse a light curve from a JSON string
///
/// Expected shape:
/// `{"target": "...", "time": [...], "flux": [...], "flux_err": [...]}` with
/// an optional `"time_format": "jd" | "bkjd"`.
pub fn parse_light_curve_json_str(json_str: &str) -> Result<LightCurve> {
    let raw: RawLightCurve = serde_json::from_str(json_str).with_context(|| {
        let preview: String = json_str.chars().take(200).collect();
        format!("Invalid light curve JSON. First 200 chars: {}", preview)
    })?;

    if raw.target.trim().is_empty() {
        anyhow::bail!("Light curve has an empty target name");
    }

    let time = raw.time_format.to_jd(raw.time);
    let flux = nulls_to_nan(raw.flux);
    let flux_err = nulls_to_nan(raw.flux_err);

    LightCurve::from_columns(raw.target, &time, &flux, &flux_err)
        .context("Light curve columns are inconsistent")
}
