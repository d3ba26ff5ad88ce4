//! Identity and classification types for rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the set and the name in the textual form of a [`RuleId`].
const SEPARATOR: &str = "::";

/// Unique identifier of a rule.
///
/// The pair `(set, name)` is the canonical key for lookup, suppression, and
/// reporting. Ordering is by set, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId {
    set: String,
    name: String,
}

impl RuleId {
    /// Creates a new rule ID.
    ///
    /// `set` is the scope a rule belongs to (e.g. `core` for rules that apply
    /// to every API, or an organization-specific set). `name` is unique
    /// within that set.
    #[must_use]
    pub fn new(set: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            name: name.into(),
        }
    }

    /// Returns the set this rule belongs to.
    #[must_use]
    pub fn set(&self) -> &str {
        &self.set
    }

    /// Returns the name of this rule within its set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.set, self.name)
    }
}

/// Error returned when parsing a [`RuleId`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid rule ID '{input}': expected 'set::name'")]
pub struct RuleIdParseError {
    input: String,
}

impl FromStr for RuleId {
    type Err = RuleIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SEPARATOR) {
            Some((set, name)) if !set.is_empty() && !name.is_empty() => Ok(Self::new(set, name)),
            _ => Err(RuleIdParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// Kind of file a rule is able to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FileType {
    /// A protobuf definition file.
    #[serde(rename = "proto-file")]
    ProtoFile,
    /// An API service configuration file.
    #[serde(rename = "service-config")]
    ServiceConfig,
}

impl FileType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProtoFile => "proto-file",
            Self::ServiceConfig => "service-config",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of the findings produced by a rule.
///
/// A rule is wholly one category; it is not decided per finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Something in the API will cause errors.
    #[serde(rename = "API-Linter-Error")]
    Error,
    /// Something in the API could be done better.
    #[serde(rename = "API-Linter-Suggestion")]
    Suggestion,
}

impl Category {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "API-Linter-Error",
            Self::Suggestion => "API-Linter-Suggestion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
