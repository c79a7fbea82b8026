//! Archive access: searching for datasets and fetching pixel files.
//!
//! The [`Archive`] trait is the retrieval seam. Network archives live
//! outside this crate (the Python frontend does the download and hands
//! the data over); [`LocalArchive`] keeps registered datasets in memory.

pub mod local;

pub use local::LocalArchive;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorContext, ExplorerError, ExplorerResult};
use crate::models::{Cadence, DatasetDescriptor, PixelFile, SearchResult};

/// Retrieval collaborator.
pub trait Archive {
    /// All datasets for `target` at `cadence`, in archive order.
    ///
    /// An unknown target is an empty result, not an error.
    fn search(&self, target: &str, cadence: Cadence) -> ExplorerResult<SearchResult>;

    /// Fetch the pixel file a search entry points at.
    fn download(&self, descriptor: &DatasetDescriptor) -> ExplorerResult<PixelFile>;
}

/// What to do when several datasets match where one was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Take the first match in archive order
    First,
    /// Fail with [`ExplorerError::AmbiguousData`]
    #[default]
    Reject,
    /// Fail with [`ExplorerError::SelectionRequired`] carrying the candidates
    PromptCaller,
}

impl AmbiguityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Reject => "reject",
            Self::PromptCaller => "prompt-caller",
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbiguityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "reject" => Ok(Self::Reject),
            "prompt-caller" | "prompt_caller" | "prompt" => Ok(Self::PromptCaller),
            _ => Err(format!("Unknown ambiguity policy: {}", s)),
        }
    }
}

/// Pick exactly one dataset out of `matches`.
///
/// Zero matches is [`ExplorerError::NoData`]; more than one is resolved by
/// `policy`.
pub fn select_dataset<'a>(
    matches: &[&'a DatasetDescriptor],
    policy: AmbiguityPolicy,
    context: ErrorContext,
) -> ExplorerResult<&'a DatasetDescriptor> {
    match matches {
        [] => Err(ExplorerError::no_data_with_context(
            "no dataset matches the request",
            context,
        )),
        [only] => Ok(*only),
        [first, ..] => match policy {
            AmbiguityPolicy::First => {
                log::warn!(
                    "{} datasets matched, taking the first: {}",
                    matches.len(),
                    first
                );
                Ok(*first)
            }
            AmbiguityPolicy::Reject => Err(ExplorerError::ambiguous(matches.len(), context)),
            AmbiguityPolicy::PromptCaller => Err(ExplorerError::selection_required(
                matches.iter().map(|d| (*d).clone()).collect(),
                context,
            )),
        },
    }
}
