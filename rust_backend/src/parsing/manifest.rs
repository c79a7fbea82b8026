use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::{nulls_to_nan, TimeFormat};
use crate::models::{ApertureMask, Cadence, DatasetDescriptor, PixelFile};

#[derive(Debug, Deserialize)]
struct RawManifest {
    datasets: Vec<RawDataset>,
}

/// One dataset: the search descriptor plus its pixel cubes
#[derive(Debug, Deserialize)]
struct RawDataset {
    target: String,
    description: String,
    #[serde(default)]
    cadence: Cadence,
    /// Overrides the quarter parsed from `description`
    quarter: Option<u32>,
    #[serde(default)]
    time_format: TimeFormat,
    time: Vec<f64>,
    flux: Vec<Vec<Vec<Option<f64>>>>,
    flux_err: Vec<Vec<Vec<Option<f64>>>>,
    pipeline_mask: Vec<Vec<bool>>,
}

/// Parse an archive manifest from a JSON file
pub fn parse_archive_manifest(json_path: &Path) -> Result<Vec<(DatasetDescriptor, PixelFile)>> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read manifest file: {}", json_path.display()))?;

    parse_archive_manifest_str(&json_content)
}

/// Parse an archive manifest from a JSON string
pub fn parse_archive_manifest_str(json_str: &str) -> Result<Vec<(DatasetDescriptor, PixelFile)>> {
    let manifest: RawManifest =
        serde_json::from_str(json_str).context("Invalid archive manifest JSON")?;

    manifest
        .datasets
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            convert_dataset(raw).with_context(|| format!("Dataset #{} in manifest", idx))
        })
        .collect()
}

fn convert_dataset(raw: RawDataset) -> Result<(DatasetDescriptor, PixelFile)> {
    let mut descriptor = DatasetDescriptor::new(raw.target, raw.description, raw.cadence);
    if raw.quarter.is_some() {
        descriptor.quarter = raw.quarter;
    }
    let quarter = descriptor.quarter.with_context(|| {
        format!(
            "No quarter given and none found in description '{}'",
            descriptor.description
        )
    })?;

    let to_frames = |cube: Vec<Vec<Vec<Option<f64>>>>| -> Vec<Vec<Vec<f64>>> {
        cube.into_iter()
            .map(|frame| frame.into_iter().map(nulls_to_nan).collect())
            .collect()
    };
    let mask = ApertureMask::from_rows(&raw.pipeline_mask).context("Invalid pipeline mask")?;
    let pixels = PixelFile::from_frames(
        descriptor.target.clone(),
        quarter,
        descriptor.cadence,
        raw.time_format.to_jd(raw.time),
        &to_frames(raw.flux),
        &to_frames(raw.flux_err),
        mask,
    )
    .context("Invalid pixel data")?;

    Ok((descriptor, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(description: &str, extra: &str) -> String {
        format!(
            r#"{{"target": "Kepler-8", "description": "{}", {}
                "time": [0.0, 1.0],
                "flux": [[[1.0, null]], [[2.0, 3.0]]],
                "flux_err": [[[0.1, 0.1]], [[0.1, 0.1]]],
                "pipeline_mask": [[true, false]]}}"#,
            description, extra
        )
    }

    #[test]
    fn test_parse_manifest() {
        let json = format!(r#"{{"datasets": [{}]}}"#, dataset("KTL Q7", r#""cadence": "short","#));
        let entries = parse_archive_manifest_str(&json).unwrap();
        assert_eq!(entries.len(), 1);
        let (descriptor, pixels) = &entries[0];
        assert_eq!(descriptor.quarter, Some(7));
        assert_eq!(descriptor.cadence, Cadence::Short);
        assert_eq!(pixels.quarter, 7);
        assert_eq!(pixels.image_shape(), (1, 2));
        assert!(pixels.flux()[[0, 0, 1]].is_nan());
    }

    #[test]
    fn test_explicit_quarter_and_bkjd() {
        let json = format!(
            r#"{{"datasets": [{}]}}"#,
            dataset("no marker", r#""quarter": 3, "time_format": "bkjd","#)
        );
        let entries = parse_archive_manifest_str(&json).unwrap();
        let (descriptor, pixels) = &entries[0];
        assert_eq!(descriptor.quarter, Some(3));
        assert_eq!(pixels.time()[1], 2_454_834.0);
    }

    #[test]
    fn test_missing_quarter_fails() {
        let json = format!(r#"{{"datasets": [{}]}}"#, dataset("no marker", ""));
        let err = parse_archive_manifest_str(&json).unwrap_err();
        assert!(format!("{:#}", err).contains("No quarter"));
    }

    #[test]
    fn test_bad_cube_shape_fails() {
        let json = r#"{"datasets": [{"target": "Kepler-8", "description": "Q1",
            "time": [0.0], "flux": [[[1.0]]], "flux_err": [[[0.1]]],
            "pipeline_mask": [[true, true]]}]}"#;
        let err = parse_archive_manifest_str(json).unwrap_err();
        assert!(format!("{:#}", err).contains("Dataset #0"));
    }
}
