use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker character preceding the quarter number in a dataset description.
pub const QUARTER_MARKER: char = 'Q';

/// Exposure cadence of a Kepler product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// ~30 minute exposures
    #[default]
    Long,
    /// ~1 minute exposures
    Short,
    /// 20 second exposures
    Fast,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::Fast => "fast",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = String;

    /// Parse a cadence from its name ("long", "short", "fast").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "fast" => Ok(Self::Fast),
            _ => Err(format!("Unknown cadence: {}", s)),
        }
    }
}

/// Extract the observation quarter from a dataset description.
///
/// Looks at the first occurrence of [`QUARTER_MARKER`] only and reads the
/// digits that immediately follow it. Returns `None` when there is no marker,
/// when no digit follows it, or when the number does not fit in a `u32`.
///
/// ```
/// use keeplerite::models::parse_quarter;
///
/// assert_eq!(parse_quarter("Kepler Q05 long cadence"), Some(5));
/// assert_eq!(parse_quarter("Quicklook"), None);
/// ```
pub fn parse_quarter(description: &str) -> Option<u32> {
    let start = description.find(QUARTER_MARKER)? + QUARTER_MARKER.len_utf8();
    let digits: String = description[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// One entry of an archive search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub target: String,
    pub description: String,
    pub cadence: Cadence,
    /// Quarter parsed from `description`, if it carries one.
    pub quarter: Option<u32>,
}

impl DatasetDescriptor {
    /// Build a descriptor, deriving the quarter from the description label.
    pub fn new(target: impl Into<String>, description: impl Into<String>, cadence: Cadence) -> Self {
        let description = description.into();
        let quarter = parse_quarter(&description);
        Self {
            target: target.into(),
            description,
            cadence,
            quarter,
        }
    }
}

impl fmt::Display for DatasetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.description, self.target, self.cadence)
    }
}

/// All datasets an archive returned for one (target, cadence) query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub target: String,
    pub cadence: Cadence,
    pub datasets: Vec<DatasetDescriptor>,
}

impl SearchResult {
    pub fn new(target: impl Into<String>, cadence: Cadence, datasets: Vec<DatasetDescriptor>) -> Self {
        Self {
            target: target.into(),
            cadence,
            datasets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Sorted, de-duplicated list of quarters present in the result.
    pub fn quarters(&self) -> Vec<u32> {
        let mut quarters: Vec<u32> = self.datasets.iter().filter_map(|d| d.quarter).collect();
        quarters.sort_unstable();
        quarters.dedup();
        quarters
    }

    /// Datasets observed in `quarter`, in archive order.
    pub fn filter_quarter(&self, quarter: u32) -> Vec<&DatasetDescriptor> {
        self.datasets
            .iter()
            .filter(|d| d.quarter == Some(quarter))
            .collect()
    }
}
