//! Rule trait for defining lint rules.

use crate::error::LintError;
use crate::identity::{Category, FileType, RuleId};
use crate::request::Request;
use crate::types::Response;

/// A lint rule that checks API definition files.
///
/// Rules describe themselves through the metadata accessors so the engine
/// can select, attribute, and report them without knowing their internals.
///
/// `lint` must depend only on its request: the same descriptor and context
/// produce the same problems. It should poll
/// [`Context::check_cancelled`](crate::Context::check_cancelled) during
/// expensive work and return promptly once the run is cancelled.
///
/// # Example
///
/// ```ignore
/// use api_lint_core::{Category, FileType, LintError, Problem, Request, Response, Rule, RuleId};
///
/// pub struct PackageRequired;
///
/// impl Rule for PackageRequired {
///     fn id(&self) -> RuleId { RuleId::new("core", "package-required") }
///     fn description(&self) -> &str { "Every file must declare a package" }
///     fn file_types(&self) -> &[FileType] { &[FileType::ProtoFile] }
///     fn category(&self) -> Category { Category::Error }
///
///     fn lint(&self, req: &Request<'_>) -> Result<Response, LintError> {
///         let file = req.downcast::<ProtoFile>().ok_or(LintError::UnsupportedDescriptor(req.file_type()))?;
///         if file.package.is_empty() {
///             return Ok(Response::from_problems(vec![Problem::new(file.name(), "missing package")]));
///         }
///         Ok(Response::new())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the unique ID of this rule.
    fn id(&self) -> RuleId;

    /// Returns a short summary of what this rule checks.
    fn description(&self) -> &str;

    /// Returns a link to the full documentation, or an empty string.
    fn url(&self) -> &str {
        ""
    }

    /// Returns the file types this rule analyzes.
    fn file_types(&self) -> &[FileType];

    /// Returns the category of every problem this rule reports.
    fn category(&self) -> Category;

    /// Lints the descriptor in `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the analysis could not be completed.
    fn lint(&self, request: &Request<'_>) -> Result<Response, LintError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Reasons a rule's self-description is rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRule {
    /// The description is empty.
    #[error("rule has an empty description")]
    EmptyDescription,

    /// The rule targets no file types.
    #[error("rule declares no file types")]
    NoFileTypes,

    /// The documentation link is not an absolute http(s) URL.
    #[error("rule has a malformed URL '{0}'")]
    MalformedUrl(String),
}

/// Checks a rule's metadata.
pub(crate) fn validate(rule: &dyn Rule) -> Result<(), InvalidRule> {
    if rule.description().trim().is_empty() {
        return Err(InvalidRule::EmptyDescription);
    }
    if rule.file_types().is_empty() {
        return Err(InvalidRule::NoFileTypes);
    }
    let url = rule.url();
    if !url.is_empty() && !is_well_formed_url(url) {
        return Err(InvalidRule::MalformedUrl(url.to_string()));
    }
    Ok(())
}

fn is_well_formed_url(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    !host.is_empty() && !url.chars().any(char::is_whitespace)
}
