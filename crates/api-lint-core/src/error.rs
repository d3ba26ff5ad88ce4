//! Error types returned by rules and descriptor sources.

use crate::descriptor::DescriptorPath;
use crate::identity::FileType;

/// Errors a rule may return from [`Rule::lint`](crate::Rule::lint).
///
/// A returned error means the rule could not complete its analysis. Any
/// problems it collected up to that point are not trusted as complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LintError {
    /// The run was not configured with a descriptor source.
    #[error("Source info is not available")]
    SourceInfoNotAvailable,

    /// The run was cancelled or its deadline passed.
    #[error("Linting was cancelled")]
    Cancelled,

    /// A lookup against the descriptor source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The descriptor is not of a type the rule can analyze.
    #[error("Unsupported descriptor of type {0}")]
    UnsupportedDescriptor(FileType),

    /// The rule failed for a rule-specific reason.
    #[error("{0}")]
    Failed(String),
}

impl LintError {
    /// Creates a rule-specific failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors from looking up source metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// No source info is recorded for the path.
    #[error("No source info for path {0}")]
    PathNotFound(DescriptorPath),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_converts_into_lint_error() {
        let err: LintError = SourceError::PathNotFound(DescriptorPath::new(vec![4, 0])).into();
        assert_eq!(err.to_string(), "No source info for path [4, 0]");
        assert_ne!(err, LintError::SourceInfoNotAvailable);
    }
}
