//! Boundary types for descriptors and their source metadata.
//!
//! Descriptors are produced by an external parser. The core only needs to
//! know their [`FileType`] and a path for reporting; rules downcast to the
//! parser's concrete type through [`Descriptor::as_any`].

use crate::error::SourceError;
use crate::identity::FileType;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// An in-memory representation of a file under analysis.
pub trait Descriptor: Send + Sync + fmt::Debug {
    /// Returns the kind of file this descriptor represents.
    fn file_type(&self) -> FileType;

    /// Returns the file path used when reporting.
    fn path(&self) -> &str;

    /// Returns `self` as [`Any`] so rules can reach the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Path to an element within a descriptor.
///
/// Follows protobuf source-info conventions: alternating field numbers and
/// repeated-field indices from the file root (e.g. `[4, 0, 2, 1]` is the
/// second field of the first message).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DescriptorPath(Vec<i32>);

impl DescriptorPath {
    /// Creates a path from its components.
    #[must_use]
    pub fn new(components: Vec<i32>) -> Self {
        Self(components)
    }

    /// Returns the path components.
    #[must_use]
    pub fn components(&self) -> &[i32] {
        &self.0
    }

    /// Returns a new path extended by `field` and `index`.
    #[must_use]
    pub fn child(&self, field: i32, index: i32) -> Self {
        let mut components = self.0.clone();
        components.extend([field, index]);
        Self(components)
    }
}

impl From<&[i32]> for DescriptorPath {
    fn from(components: &[i32]) -> Self {
        Self(components.to_vec())
    }
}

impl fmt::Display for DescriptorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Comments attached to a descriptor element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comments {
    /// Comment immediately preceding the element.
    pub leading: Option<String>,
    /// Comment immediately following the element.
    pub trailing: Option<String>,
    /// Comments preceding the element, separated from it by blank lines.
    pub leading_detached: Vec<String>,
}

impl Comments {
    /// Creates comments with only a leading comment.
    #[must_use]
    pub fn leading(text: impl Into<String>) -> Self {
        Self {
            leading: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Source location of a descriptor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_column: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_column: usize,
}

impl SourceLocation {
    /// Creates a location spanning `start` to `end`, each a `(line, column)` pair.
    #[must_use]
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            start_line: start.0,
            start_column: start.1,
            end_line: end.0,
            end_column: end.1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

/// Read-only lookups of comments and source locations in a descriptor.
///
/// Shared across concurrent rule invocations, so implementations must not
/// require mutable access.
pub trait DescriptorSource: Send + Sync {
    /// Returns the comments attached to the element at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::PathNotFound`] if the path cannot be resolved.
    fn comments(&self, path: &DescriptorPath) -> Result<Comments, SourceError>;

    /// Returns the source location of the element at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::PathNotFound`] if the path cannot be resolved.
    fn location(&self, path: &DescriptorPath) -> Result<SourceLocation, SourceError>;
}

/// A [`DescriptorSource`] backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    comments: BTreeMap<DescriptorPath, Comments>,
    locations: BTreeMap<DescriptorPath, SourceLocation>,
}

impl SourceInfo {
    /// Creates an empty source info.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records comments for a path.
    #[must_use]
    pub fn with_comments(mut self, path: DescriptorPath, comments: Comments) -> Self {
        self.comments.insert(path, comments);
        self
    }

    /// Records a location for a path.
    #[must_use]
    pub fn with_location(mut self, path: DescriptorPath, location: SourceLocation) -> Self {
        self.locations.insert(path, location);
        self
    }
}

impl DescriptorSource for SourceInfo {
    fn comments(&self, path: &DescriptorPath) -> Result<Comments, SourceError> {
        self.comments
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::PathNotFound(path.clone()))
    }

    fn location(&self, path: &DescriptorPath) -> Result<SourceLocation, SourceError> {
        self.locations
            .get(path)
            .copied()
            .ok_or_else(|| SourceError::PathNotFound(path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_path_extends_components() {
        let message = DescriptorPath::new(vec![4, 0]);
        assert_eq!(message.child(2, 1).components(), &[4, 0, 2, 1]);
        assert_eq!(message.components(), &[4, 0]);
    }

    #[test]
    fn source_info_lookups() {
        let path = DescriptorPath::new(vec![4, 0]);
        let info = SourceInfo::new()
            .with_comments(path.clone(), Comments::leading(" A book."))
            .with_location(path.clone(), SourceLocation::new((3, 1), (7, 2)));

        assert_eq!(
            info.comments(&path).unwrap().leading.as_deref(),
            Some(" A book.")
        );
        assert_eq!(info.location(&path).unwrap().to_string(), "3:1");
    }

    #[test]
    fn source_info_missing_path() {
        let info = SourceInfo::new();
        let path = DescriptorPath::new(vec![6, 0]);
        assert_eq!(
            info.location(&path),
            Err(SourceError::PathNotFound(path.clone()))
        );
        assert!(info.comments(&path).is_err());
    }
}
