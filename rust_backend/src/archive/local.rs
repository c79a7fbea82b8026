//! In-memory archive.
//!
//! Datasets are registered up front (by tests, by the Python bindings after
//! they downloaded the data, or from a JSON manifest) and served back by
//! search and download without any I/O.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Archive;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{Cadence, DatasetDescriptor, PixelFile, SearchResult};
use crate::parsing::manifest::parse_archive_manifest;

/// In-memory archive.
///
/// Cloning shares the underlying store.
///
/// # Example
/// ```
/// use keeplerite::archive::{Archive, LocalArchive};
/// use keeplerite::models::Cadence;
///
/// let archive = LocalArchive::new();
/// let result = archive.search("Kepler-8", Cadence::Long).unwrap();
/// assert!(result.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalArchive {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Debug, Default)]
struct LocalData {
    entries: Vec<(DatasetDescriptor, PixelFile)>,
}

impl LocalArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every dataset listed in a JSON manifest.
    pub fn from_manifest_file(path: &Path) -> ExplorerResult<Self> {
        let entries = parse_archive_manifest(path).map_err(|e| {
            ExplorerError::retrieval_with_context(
                format!("{:#}", e),
                ErrorContext::new("load_manifest").with_details(path.display().to_string()),
            )
        })?;
        let archive = Self::new();
        for (descriptor, pixels) in entries {
            archive.register(descriptor, pixels)?;
        }
        log::info!(
            "Loaded {} datasets from {}",
            archive.dataset_count()?,
            path.display()
        );
        Ok(archive)
    }

    /// Add a dataset. Registering the same descriptor twice replaces the
    /// earlier pixel file.
    pub fn register(&self, descriptor: DatasetDescriptor, pixels: PixelFile) -> ExplorerResult<()> {
        let mut data = self.write()?;
        match data.entries.iter_mut().find(|(d, _)| *d == descriptor) {
            Some(entry) => entry.1 = pixels,
            None => data.entries.push((descriptor, pixels)),
        }
        Ok(())
    }

    pub fn dataset_count(&self) -> ExplorerResult<usize> {
        Ok(self.read()?.entries.len())
    }

    /// Remove every dataset.
    pub fn clear(&self) -> ExplorerResult<()> {
        self.write()?.entries.clear();
        Ok(())
    }

    fn read(&self) -> ExplorerResult<RwLockReadGuard<'_, LocalData>> {
        self.data
            .read()
            .map_err(|_| ExplorerError::retrieval("local archive lock poisoned"))
    }

    fn write(&self) -> ExplorerResult<RwLockWriteGuard<'_, LocalData>> {
        self.data
            .write()
            .map_err(|_| ExplorerError::retrieval("local archive lock poisoned"))
    }
}

fn same_target(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl Archive for LocalArchive {
    fn search(&self, target: &str, cadence: Cadence) -> ExplorerResult<SearchResult> {
        let data = self.read()?;
        let datasets = data
            .entries
            .iter()
            .filter(|(d, _)| d.cadence == cadence && same_target(&d.target, target))
            .map(|(d, _)| d.clone())
            .collect();
        Ok(SearchResult::new(target, cadence, datasets))
    }

    fn download(&self, descriptor: &DatasetDescriptor) -> ExplorerResult<PixelFile> {
        let data = self.read()?;
        data.entries
            .iter()
            .find(|(d, _)| d == descriptor)
            .map(|(_, pixels)| pixels.clone())
            .ok_or_else(|| {
                let mut context = ErrorContext::new("download")
                    .with_target(descriptor.target.clone())
                    .with_details(descriptor.description.clone());
                context.quarter = descriptor.quarter;
                ExplorerError::retrieval_with_context("dataset is not in the local archive", context)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApertureMask;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pixels(quarter: u32, value: f64) -> PixelFile {
        PixelFile::from_frames(
            "Kepler-8",
            quarter,
            Cadence::Long,
            vec![0.0],
            &[vec![vec![value]]],
            &[vec![vec![1.0]]],
            ApertureMask::all((1, 1)),
        )
        .unwrap()
    }

    #[test]
    fn test_search_filters_target_and_cadence() {
        let archive = LocalArchive::new();
        let q1 = DatasetDescriptor::new("Kepler-8", "Q1", Cadence::Long);
        let q2_short = DatasetDescriptor::new("Kepler-8", "Q2", Cadence::Short);
        let other = DatasetDescriptor::new("Kepler-10", "Q1", Cadence::Long);
        archive.register(q1.clone(), pixels(1, 1.0)).unwrap();
        archive.register(q2_short, pixels(2, 1.0)).unwrap();
        archive.register(other, pixels(1, 1.0)).unwrap();

        let result = archive.search(" kepler-8 ", Cadence::Long).unwrap();
        assert_eq!(result.datasets, vec![q1]);
        assert!(archive.search("Kepler-99", Cadence::Long).unwrap().is_empty());
    }

    #[test]
    fn test_register_replaces_same_descriptor() {
        let archive = LocalArchive::new();
        let q1 = DatasetDescriptor::new("Kepler-8", "Q1", Cadence::Long);
        archive.register(q1.clone(), pixels(1, 1.0)).unwrap();
        archive.register(q1.clone(), pixels(1, 7.0)).unwrap();
        assert_eq!(archive.dataset_count().unwrap(), 1);
        assert_eq!(archive.download(&q1).unwrap().flux()[[0, 0, 0]], 7.0);
    }

    #[test]
    fn test_download_unknown_is_retrieval_error() {
        let archive = LocalArchive::new();
        let missing = DatasetDescriptor::new("Kepler-8", "Q3", Cadence::Long);
        let err = archive.download(&missing).unwrap_err();
        assert!(matches!(err, ExplorerError::Retrieval { .. }));
        assert_eq!(err.context().quarter, Some(3));
    }

    #[test]
    fn test_clones_share_store() {
        let archive = LocalArchive::new();
        let handle = archive.clone();
        handle
            .register(DatasetDescriptor::new("Kepler-8", "Q1", Cadence::Long), pixels(1, 1.0))
            .unwrap();
        assert_eq!(archive.dataset_count().unwrap(), 1);
        archive.clear().unwrap();
        assert_eq!(handle.dataset_count().unwrap(), 0);
    }

    #[test]
    fn test_from_manifest_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"datasets": [{{
                "target": "Kepler-8",
                "description": "Target Pixel Long Cadence Q1",
                "cadence": "long",
                "time": [0.0, 0.02],
                "flux": [[[1.0]], [[2.0]]],
                "flux_err": [[[0.1]], [[0.1]]],
                "pipeline_mask": [[true]]
            }}]}}"#
        )
        .unwrap();
        let archive = LocalArchive::from_manifest_file(file.path()).unwrap();
        let result = archive.search("Kepler-8", Cadence::Long).unwrap();
        assert_eq!(result.quarters(), vec![1]);
    }

    #[test]
    fn test_from_manifest_file_missing() {
        let err = LocalArchive::from_manifest_file(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, ExplorerError::Retrieval { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("load_manifest"));
    }
}
