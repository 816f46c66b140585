//! Error types for segment definition

use thiserror::Error;

/// Errors raised while turning a segment specification into declarations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// Route target kind outside the supported set
    #[error(
        "Unsupported target kind '{0}', expected one of: transit-gateway, vpc-endpoint, internet-gateway, nat-gateway"
    )]
    UnsupportedTargetKind(String),

    /// A required field is absent or empty
    #[error("Required field '{field}' is missing or empty")]
    MissingField { field: String },

    /// Two resources share a name within one graph
    #[error("Duplicate resource name: {0}")]
    DuplicateResource(String),

    /// Resources that reference each other in a loop
    #[error("Dependency cycle between: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

impl SegmentError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Result type for segment operations
pub type SegmentResult<T> = Result<T, SegmentError>;
