//! Single-slot session cache.
//!
//! The interactive frontend reruns its whole script on every widget change.
//! Keeping the last [`TargetSession`] around, keyed by what was searched,
//! means only a new target or cadence triggers a new archive search.

use super::session::TargetSession;
use crate::archive::Archive;
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, ExplorerResult};
use crate::models::Cadence;
use crate::periodogram::{LombScargle, SpectralTransform};
use crate::photometry::{Photometry, SimpleAperturePhotometry};

/// What the cached session was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub target: String,
    pub cadence: Cadence,
}

impl SessionKey {
    pub fn new(target: &str, cadence: Cadence) -> Self {
        Self {
            target: target.trim().to_string(),
            cadence,
        }
    }
}

/// Holds at most one open session.
pub struct SessionCache<A, P = SimpleAperturePhotometry, T = LombScargle> {
    archive: A,
    photometry: P,
    transform: T,
    config: ExplorerConfig,
    slot: Option<(SessionKey, TargetSession<A, P, T>)>,
}

impl<A: Archive + Clone> SessionCache<A> {
    pub fn new(archive: A, config: ExplorerConfig) -> Self {
        Self::with_collaborators(archive, SimpleAperturePhotometry, LombScargle, config)
    }
}

impl<A, P, T> SessionCache<A, P, T>
where
    A: Archive + Clone,
    P: Photometry + Clone,
    T: SpectralTransform + Clone,
{
    pub fn with_collaborators(archive: A, photometry: P, transform: T, config: ExplorerConfig) -> Self {
        Self {
            archive,
            photometry,
            transform,
            config,
            slot: None,
        }
    }

    /// Return the cached session for `(target, cadence)`, opening a new one
    /// (and dropping the old) on a key change.
    ///
    /// If opening fails the previously cached session is kept.
    pub fn get_or_open(
        &mut self,
        target: &str,
        cadence: Cadence,
    ) -> ExplorerResult<&mut TargetSession<A, P, T>> {
        let key = SessionKey::new(target, cadence);
        let hit = matches!(&self.slot, Some((cached, _)) if *cached == key);
        if !hit {
            log::info!("Session cache: opening '{}' ({} cadence)", key.target, key.cadence);
            let session = TargetSession::open_with(
                self.archive.clone(),
                self.photometry.clone(),
                self.transform.clone(),
                &key.target,
                cadence,
                self.config.clone(),
            )?;
            self.slot = Some((key, session));
        }
        self.slot
            .as_mut()
            .map(|(_, session)| session)
            .ok_or_else(|| ExplorerError::missing_product("session cache is empty"))
    }

    /// The cached session, if any.
    pub fn current(&mut self) -> Option<&mut TargetSession<A, P, T>> {
        self.slot.as_mut().map(|(_, session)| session)
    }

    pub fn current_key(&self) -> Option<&SessionKey> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    /// Drop the cached session, returning it.
    pub fn invalidate(&mut self) -> Option<TargetSession<A, P, T>> {
        if let Some((key, _)) = &self.slot {
            log::debug!("Session cache: dropping '{}'", key.target);
        }
        self.slot.take().map(|(_, session)| session)
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Replace the configuration used for sessions opened from now on.
    pub fn set_config(&mut self, config: ExplorerConfig) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::LocalArchive;
    use crate::error::ExplorerError;
    use crate::models::{ApertureMask, DatasetDescriptor, PixelFile};

    fn archive() -> LocalArchive {
        let archive = LocalArchive::new();
        for (target, cadence) in [("Kepler-8", Cadence::Long), ("Kepler-8", Cadence::Short), ("Kepler-10", Cadence::Long)] {
            let pixels = PixelFile::from_frames(
                target,
                1,
                cadence,
                vec![0.0, 0.02],
                &[vec![vec![1.0]], vec![vec![1.0]]],
                &[vec![vec![0.1]], vec![vec![0.1]]],
                ApertureMask::all((1, 1)),
            )
            .unwrap();
            archive
                .register(DatasetDescriptor::new(target, "Q1", cadence), pixels)
                .unwrap();
        }
        archive
    }

    #[test]
    fn test_hit_keeps_session_state() {
        let mut cache = SessionCache::new(archive(), ExplorerConfig::default());
        cache.get_or_open("Kepler-8", Cadence::Long).unwrap().load_pixel_file(1).unwrap();
        let session = cache.get_or_open(" Kepler-8 ", Cadence::Long).unwrap();
        assert!(session.pixel_file().is_some());
    }

    #[test]
    fn test_key_includes_cadence() {
        let mut cache = SessionCache::new(archive(), ExplorerConfig::default());
        cache.get_or_open("Kepler-8", Cadence::Long).unwrap().load_pixel_file(1).unwrap();
        let session = cache.get_or_open("Kepler-8", Cadence::Short).unwrap();
        assert!(session.pixel_file().is_none());
        assert_eq!(cache.current_key(), Some(&SessionKey::new("Kepler-8", Cadence::Short)));
    }

    #[test]
    fn test_failed_open_keeps_previous_session() {
        let mut cache = SessionCache::new(archive(), ExplorerConfig::default());
        cache.get_or_open("Kepler-10", Cadence::Long).unwrap();
        let result = cache.get_or_open("Kepler-404", Cadence::Long);
        assert!(matches!(result, Err(ExplorerError::NoData { .. })));
        assert_eq!(cache.current_key().map(|k| k.target.as_str()), Some("Kepler-10"));
    }

    #[test]
    fn test_invalidate_empties_slot() {
        let mut cache = SessionCache::new(archive(), ExplorerConfig::default());
        cache.get_or_open("Kepler-10", Cadence::Long).unwrap();
        let dropped = cache.invalidate();
        assert_eq!(dropped.map(|s| s.target().to_string()), Some("Kepler-10".to_string()));
        assert!(cache.current_key().is_none());
        assert!(cache.current().is_none());
        assert!(cache.invalidate().is_none());
    }
}
