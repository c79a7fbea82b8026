//! Explorer configuration file support.
//!
//! Settings are read from a TOML file. Every section and field is optional
//! and falls back to the interactive tool's defaults.
//!
//! ```toml
//! [search]
//! cadence = "long"
//! ambiguity_policy = "reject"
//!
//! [periodogram]
//! min_frequency = 1.0
//! max_frequency = 150.0
//! fap_realizations = 10
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::archive::AmbiguityPolicy;
use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{Aperture, AperturePolicy, Cadence, Normalization};
use crate::periodogram::{FrequencyBounds, PeriodogramRequest};
use crate::services::view::{DisplayOptions, Scale};

/// Name of the configuration file looked up by
/// [`ExplorerConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "keeplerite.toml";

/// Explorer configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub light_curve: LightCurveSettings,
    #[serde(default)]
    pub periodogram: PeriodogramSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

/// Archive search settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub cadence: Cadence,
    #[serde(default)]
    pub ambiguity_policy: AmbiguityPolicy,
}

impl SearchSettings {
    /// Parse an explicitly requested cadence, or fall back to the
    /// configured one.
    pub fn resolve_cadence(&self, requested: Option<&str>) -> ExplorerResult<Cadence> {
        match requested {
            Some(name) => name.parse::<Cadence>().map_err(|message| {
                ExplorerError::invalid_input_with_context(message, ErrorContext::new("resolve_cadence"))
            }),
            None => Ok(self.cadence),
        }
    }
}

/// Aperture choice as offered in the sidebar: a named policy, or `custom`
/// for a threshold mask at a user-chosen sigma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApertureSetting {
    #[default]
    Pipeline,
    Threshold,
    All,
    Custom,
}

impl FromStr for ApertureSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pipeline" => Ok(Self::Pipeline),
            "threshold" => Ok(Self::Threshold),
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown aperture: {}", s)),
        }
    }
}

impl fmt::Display for ApertureSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pipeline => "pipeline",
            Self::Threshold => "threshold",
            Self::All => "all",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl ApertureSetting {
    /// The named policy for this setting, `None` for `custom` which needs
    /// the pixel data to build its mask.
    pub fn named_policy(&self) -> Option<AperturePolicy> {
        match self {
            Self::Pipeline => Some(AperturePolicy::Pipeline),
            Self::Threshold => Some(AperturePolicy::Threshold),
            Self::All => Some(AperturePolicy::All),
            Self::Custom => None,
        }
    }

    pub fn named_aperture(&self) -> Option<Aperture> {
        self.named_policy().map(Aperture::Named)
    }
}

/// Light-curve construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurveSettings {
    #[serde(default)]
    pub aperture: ApertureSetting,
    /// Sigma used when `aperture = "custom"`
    #[serde(default = "default_threshold_sigma")]
    pub threshold_sigma: f64,
    #[serde(default)]
    pub stitch: bool,
    #[serde(default = "default_filter_outliers")]
    pub filter_outliers: bool,
    #[serde(default = "default_outlier_filter_percent")]
    pub outlier_filter_percent: f64,
}

/// Periodogram and FAP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodogramSettings {
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f64,
    #[serde(default = "default_fap_realizations")]
    pub fap_realizations: usize,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: f64,
    /// Fixed seed for reproducible FAP curves; fresh entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Plot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default)]
    pub signal_to_noise: bool,
}

fn default_threshold_sigma() -> f64 {
    1.0
}

fn default_filter_outliers() -> bool {
    true
}

fn default_outlier_filter_percent() -> f64 {
    20.0
}

fn default_min_frequency() -> f64 {
    1.0
}

fn default_max_frequency() -> f64 {
    150.0
}

fn default_fap_realizations() -> usize {
    10
}

fn default_oversample_factor() -> f64 {
    1.0
}

fn default_smoothing() -> f64 {
    10.0
}

impl Default for LightCurveSettings {
    fn default() -> Self {
        Self {
            aperture: ApertureSetting::default(),
            threshold_sigma: default_threshold_sigma(),
            stitch: false,
            filter_outliers: default_filter_outliers(),
            outlier_filter_percent: default_outlier_filter_percent(),
        }
    }
}

impl LightCurveSettings {
    /// Outlier band to apply, `None` when filtering is off.
    pub fn outlier_filter(&self) -> Option<f64> {
        self.filter_outliers.then_some(self.outlier_filter_percent)
    }
}

impl Default for PeriodogramSettings {
    fn default() -> Self {
        Self {
            min_frequency: default_min_frequency(),
            max_frequency: default_max_frequency(),
            fap_realizations: default_fap_realizations(),
            normalization: Normalization::default(),
            oversample_factor: default_oversample_factor(),
            seed: None,
        }
    }
}

impl PeriodogramSettings {
    pub fn request(&self) -> PeriodogramRequest {
        PeriodogramRequest::default()
            .with_normalization(self.normalization)
            .with_bounds(FrequencyBounds::new(self.min_frequency, self.max_frequency))
            .with_oversample_factor(self.oversample_factor)
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            scale: Scale::default(),
            signal_to_noise: false,
        }
    }
}

impl DisplaySettings {
    pub fn options(&self) -> DisplayOptions {
        DisplayOptions {
            smoothing: self.smoothing,
            scale: self.scale,
            signal_to_noise: self.signal_to_noise,
        }
    }
}

impl ExplorerConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ExplorerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e), path))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ExplorerError::Configuration { message, .. } => config_error(message, path),
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ExplorerResult<Self> {
        let config: ExplorerConfig = toml::from_str(content)
            .map_err(|e| ExplorerError::configuration(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `keeplerite.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> ExplorerResult<Self> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("rust_backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in &search_paths {
            if path.exists() {
                log::info!("Using configuration from {}", path.display());
                return Self::from_file(path);
            }
        }

        Err(ExplorerError::configuration(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    /// Reject settings no pipeline stage could run with.
    pub fn validate(&self) -> ExplorerResult<()> {
        let p = &self.periodogram;
        if !(p.min_frequency.is_finite() && p.min_frequency > 0.0) {
            return Err(ExplorerError::configuration(format!(
                "periodogram.min_frequency must be positive, got {}",
                p.min_frequency
            )));
        }
        if !p.max_frequency.is_finite() || p.max_frequency <= p.min_frequency {
            return Err(ExplorerError::configuration(format!(
                "periodogram.max_frequency ({}) must exceed min_frequency ({})",
                p.max_frequency, p.min_frequency
            )));
        }
        if p.fap_realizations == 0 {
            return Err(ExplorerError::configuration(
                "periodogram.fap_realizations must be at least 1",
            ));
        }
        if !(p.oversample_factor.is_finite() && p.oversample_factor > 0.0) {
            return Err(ExplorerError::configuration(format!(
                "periodogram.oversample_factor must be positive, got {}",
                p.oversample_factor
            )));
        }

        let lc = &self.light_curve;
        if !(lc.threshold_sigma.is_finite() && lc.threshold_sigma > 0.0) {
            return Err(ExplorerError::configuration(format!(
                "light_curve.threshold_sigma must be positive, got {}",
                lc.threshold_sigma
            )));
        }
        if !(lc.outlier_filter_percent > 0.0 && lc.outlier_filter_percent <= 100.0) {
            return Err(ExplorerError::configuration(format!(
                "light_curve.outlier_filter_percent must be in (0, 100], got {}",
                lc.outlier_filter_percent
            )));
        }

        if !(self.display.smoothing.is_finite() && self.display.smoothing > 0.0) {
            return Err(ExplorerError::configuration(format!(
                "display.smoothing must be positive, got {}",
                self.display.smoothing
            )));
        }
        Ok(())
    }
}

fn config_error(message: String, path: &Path) -> ExplorerError {
    ExplorerError::Configuration {
        message,
        context: ErrorContext::new("load_config").with_details(path.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ExplorerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.search.ambiguity_policy, AmbiguityPolicy::Reject);
        assert_eq!(config.periodogram.fap_realizations, 10);
        assert_eq!(config.periodogram.max_frequency, 150.0);
        assert_eq!(config.display.scale, Scale::Log);
        assert_eq!(config.light_curve.outlier_filter(), Some(20.0));
    }

    #[test]
    fn test_outlier_filter_can_be_disabled() {
        let config = ExplorerConfig::from_toml_str("[light_curve]\nfilter_outliers = false").unwrap();
        assert_eq!(config.light_curve.outlier_filter(), None);
    }

    #[test]
    fn test_resolve_cadence_falls_back_to_config() {
        let config = ExplorerConfig::from_toml_str("[search]\ncadence = \"short\"").unwrap();
        assert_eq!(config.search.resolve_cadence(None).unwrap(), Cadence::Short);
        assert_eq!(config.search.resolve_cadence(Some("Fast")).unwrap(), Cadence::Fast);
        assert!(matches!(
            config.search.resolve_cadence(Some("hourly")),
            Err(ExplorerError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_partial_sections() {
        let config = ExplorerConfig::from_toml_str(
            r#"
            [search]
            cadence = "short"
            ambiguity_policy = "prompt-caller"

            [light_curve]
            aperture = "custom"
            threshold_sigma = 2.5
            outlier_filter_percent = 15.0

            [periodogram]
            max_frequency = 40.0
            seed = 7
            normalization = "standard"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.cadence, Cadence::Short);
        assert_eq!(config.search.ambiguity_policy, AmbiguityPolicy::PromptCaller);
        assert_eq!(config.light_curve.aperture, ApertureSetting::Custom);
        assert_eq!(config.light_curve.outlier_filter(), Some(15.0));
        assert_eq!(config.periodogram.min_frequency, 1.0);
        assert_eq!(config.periodogram.seed, Some(7));

        let request = config.periodogram.request();
        assert_eq!(request.bounds, FrequencyBounds::new(1.0, 40.0));
        assert_eq!(request.normalization, Normalization::Standard);
    }

    #[test]
    fn test_validation_failures() {
        for bad in [
            "[periodogram]\nmin_frequency = 0.0",
            "[periodogram]\nmin_frequency = 5.0\nmax_frequency = 5.0",
            "[periodogram]\nfap_realizations = 0",
            "[periodogram]\noversample_factor = -1.0",
            "[light_curve]\noutlier_filter_percent = 0.0",
            "[light_curve]\nthreshold_sigma = 0.0",
            "[display]\nsmoothing = 0.0",
        ] {
            let result = ExplorerConfig::from_toml_str(bad);
            assert!(
                matches!(result, Err(ExplorerError::Configuration { .. })),
                "accepted: {}",
                bad
            );
        }
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let result = ExplorerConfig::from_toml_str("[display]\nscale = \"cubic\"");
        assert!(matches!(result, Err(ExplorerError::Configuration { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nsmoothing = 2.5\nsignal_to_noise = true").unwrap();
        let config = ExplorerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.display.options().smoothing, 2.5);
        assert!(config.display.signal_to_noise);
    }

    #[test]
    fn test_from_file_errors_carry_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[periodogram]\nfap_realizations = 0").unwrap();
        let err = ExplorerConfig::from_file(file.path()).unwrap_err();
        let details = err.context().details.clone().unwrap_or_default();
        assert!(details.contains(&file.path().display().to_string()));

        let missing = ExplorerConfig::from_file("/nonexistent/keeplerite.toml");
        assert!(matches!(missing, Err(ExplorerError::Configuration { .. })));
    }

    #[test]
    fn test_aperture_setting_maps_to_policy() {
        assert_eq!(
            ApertureSetting::Threshold.named_aperture(),
            Some(Aperture::Named(AperturePolicy::Threshold))
        );
        assert_eq!(ApertureSetting::Custom.named_policy(), None);
        assert_eq!("ALL".parse::<ApertureSetting>().unwrap(), ApertureSetting::All);
    }
}
