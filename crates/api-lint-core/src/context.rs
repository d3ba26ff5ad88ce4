//! Execution context handed to every rule invocation.

use crate::cancel::CancellationToken;
use crate::descriptor::DescriptorSource;
use crate::error::LintError;
use std::fmt;
use std::sync::Arc;

/// Additional information a rule may use while linting.
///
/// Built by the engine once per descriptor and cloned into each
/// invocation. Rules observe cancellation through it and may look up
/// comments and source locations if a [`DescriptorSource`] was supplied.
#[derive(Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    source: Option<Arc<dyn DescriptorSource>>,
}

impl Context {
    /// Creates a context without a descriptor source.
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            source: None,
        }
    }

    /// Creates a context with a descriptor source.
    #[must_use]
    pub fn with_descriptor_source(
        cancel: CancellationToken,
        source: Arc<dyn DescriptorSource>,
    ) -> Self {
        Self {
            cancel,
            source: Some(source),
        }
    }

    /// Returns the descriptor source.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::SourceInfoNotAvailable`] if the context was
    /// built without one.
    pub fn descriptor_source(&self) -> Result<&Arc<dyn DescriptorSource>, LintError> {
        self.source.as_ref().ok_or(LintError::SourceInfoNotAvailable)
    }

    /// Returns the cancellation handle.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns true once the run is cancelled or past its deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns [`LintError::Cancelled`] once the run is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is cancelled or past its deadline.
    pub fn check_cancelled(&self) -> Result<(), LintError> {
        self.cancel.check()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancel", &self.cancel)
            .field("has_descriptor_source", &self.source.is_some())
            .finish()
    }
}
