//! Error types for the exploration pipeline.
//!
//! Every stage (retrieval, photometry, light-curve processing, transform,
//! FAP estimation) returns an [`ExplorerResult`]. The variants are kept
//! distinct so callers can tell *which* failure happened instead of showing a
//! single generic warning.

use std::fmt;

use crate::models::DatasetDescriptor;

/// Result type for pipeline operations
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Structured context for pipeline errors.
///
/// Records where the error happened and for which target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "load_pixel_file", "estimate_fap")
    pub operation: Option<String>,
    /// Target name the operation was running for
    pub target: Option<String>,
    /// Observation quarter, when one was involved
    pub quarter: Option<u32>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the target name.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the quarter.
    pub fn with_quarter(mut self, quarter: u32) -> Self {
        self.quarter = Some(quarter);
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref target) = self.target {
            parts.push(format!("target={}", target));
        }
        if let Some(quarter) = self.quarter {
            parts.push(format!("quarter={}", quarter));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// Bad parameters or degenerate data (repetition count, uncertainties,
    /// frequency bounds, aperture shape, ...).
    #[error("Invalid input: {message} {context}")]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    /// The archive returned zero datasets for the request.
    #[error("No data: {message} {context}")]
    NoData {
        message: String,
        context: ErrorContext,
    },

    /// Several datasets matched where exactly one was expected and the
    /// configured policy rejects the ambiguity.
    #[error("Ambiguous data: {count} datasets matched {context}")]
    AmbiguousData { count: usize, context: ErrorContext },

    /// Several datasets matched and the policy hands the choice back to the
    /// caller. The candidates are returned in archive order.
    #[error("Selection required: {} candidate datasets {context}", candidates.len())]
    SelectionRequired {
        candidates: Vec<DatasetDescriptor>,
        context: ErrorContext,
    },

    /// A stage was requested before the product it depends on exists and the
    /// product could not be derived.
    #[error("Missing product: {message} {context}")]
    MissingProduct {
        message: String,
        context: ErrorContext,
    },

    /// Failure inside the retrieval collaborator.
    #[error("Retrieval error: {message} {context}")]
    Retrieval {
        message: String,
        context: ErrorContext,
    },

    /// Failure inside the photometry collaborator.
    #[error("Photometry error: {message} {context}")]
    Photometry {
        message: String,
        context: ErrorContext,
    },

    /// Failure inside the spectral transform collaborator.
    #[error("Transform error: {message} {context}")]
    Transform {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

impl ExplorerError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an invalid input error with context.
    pub fn invalid_input_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context,
        }
    }

    /// Create a no-data error.
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a no-data error with context.
    pub fn no_data_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NoData {
            message: message.into(),
            context,
        }
    }

    /// Create an ambiguous-data error.
    pub fn ambiguous(count: usize, context: ErrorContext) -> Self {
        Self::AmbiguousData { count, context }
    }

    /// Create a selection-required error carrying the candidates.
    pub fn selection_required(candidates: Vec<DatasetDescriptor>, context: ErrorContext) -> Self {
        Self::SelectionRequired {
            candidates,
            context,
        }
    }

    /// Create a missing-product error.
    pub fn missing_product(message: impl Into<String>) -> Self {
        Self::MissingProduct {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a retrieval error with context.
    pub fn retrieval_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Retrieval {
            message: message.into(),
            context,
        }
    }

    /// Create a photometry error.
    pub fn photometry(message: impl Into<String>) -> Self {
        Self::Photometry {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InvalidInput { context, .. }
            | Self::NoData { context, .. }
            | Self::AmbiguousData { context, .. }
            | Self::SelectionRequired { context, .. }
            | Self::MissingProduct { context, .. }
            | Self::Retrieval { context, .. }
            | Self::Photometry { context, .. }
            | Self::Transform { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InvalidInput { context, .. }
            | Self::NoData { context, .. }
            | Self::AmbiguousData { context, .. }
            | Self::SelectionRequired { context, .. }
            | Self::MissingProduct { context, .. }
            | Self::Retrieval { context, .. }
            | Self::Photometry { context, .. }
            | Self::Transform { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Attach the target name unless one is already recorded.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        let context = self.context_mut();
        if context.target.is_none() {
            context.target = Some(target.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display_lists_set_fields() {
        let context = ErrorContext::new("load_pixel_file")
            .with_target("Kepler-8")
            .with_quarter(4);
        assert_eq!(
            context.to_string(),
            "[operation=load_pixel_file, target=Kepler-8, quarter=4]"
        );
    }

    #[test]
    fn test_empty_context_display() {
        assert_eq!(ErrorContext::default().to_string(), "[]");
    }

    #[test]
    fn test_with_operation_overrides() {
        let err = ExplorerError::invalid_input("bad").with_operation("estimate_fap");
        assert_eq!(err.context().operation.as_deref(), Some("estimate_fap"));
        assert!(matches!(err, ExplorerError::InvalidInput { .. }));
    }

    #[test]
    fn test_with_target_keeps_existing() {
        let err = ExplorerError::no_data_with_context(
            "nothing",
            ErrorContext::new("search").with_target("KIC 1"),
        )
        .with_target("KIC 2");
        assert_eq!(err.context().target.as_deref(), Some("KIC 1"));
    }

    #[test]
    fn test_ambiguous_message_contains_count() {
        let err = ExplorerError::ambiguous(3, ErrorContext::new("select_dataset"));
        assert!(err.to_string().contains("3 datasets matched"));
    }
}
