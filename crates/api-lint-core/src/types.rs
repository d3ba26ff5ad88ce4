//! Core types for lint findings and rule responses.

use crate::descriptor::SourceLocation;
use crate::identity::{Category, RuleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A finding reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Human-readable message.
    pub message: String,
    /// Fully-qualified name of the offending element (e.g. `library.v1.Book`).
    pub descriptor: String,
    /// Source location of the element, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Suggested replacement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Rule that reported this problem. Filled in by the engine if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
    /// Category of the reporting rule. Filled in by the engine if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Documentation link of the reporting rule. Filled in by the engine if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_url: Option<String>,
}

impl Problem {
    /// Creates a new problem about the element named `descriptor`.
    #[must_use]
    pub fn new(descriptor: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            descriptor: descriptor.into(),
            location: None,
            suggestion: None,
            rule_id: None,
            category: None,
            rule_url: None,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets a suggested replacement.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attributes this problem to the rule that produced it.
    ///
    /// The rule ID and category always come from the invoking rule. A URL
    /// the rule set on the problem is kept.
    pub(crate) fn attribute(&mut self, rule_id: &RuleId, category: Category, url: &str) {
        self.rule_id = Some(rule_id.clone());
        self.category = Some(category);
        if self.rule_url.is_none() && !url.is_empty() {
            self.rule_url = Some(url.to_string());
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        if let Some(rule_id) = &self.rule_id {
            write!(f, "[{rule_id}] ")?;
        }
        write!(f, "{}: {}", self.descriptor, self.message)
    }
}

/// The problems produced by a rule invocation.
///
/// Problems form an ordered sequence; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    problems: Vec<Problem>,
}

impl Response {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response holding `problems` in order.
    #[must_use]
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    /// Appends a problem.
    pub fn push(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    /// Appends `other`'s problems after this response's own, preserving order.
    ///
    /// Nothing is deduplicated, reordered, or validated.
    pub fn merge(&mut self, other: Self) {
        self.problems.extend(other.problems);
    }

    /// Returns the problems in order.
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Returns the problems mutably.
    pub fn problems_mut(&mut self) -> &mut [Problem] {
        &mut self.problems
    }

    /// Consumes the response and returns its problems.
    #[must_use]
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    /// Returns the number of problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Returns true if there are no problems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

impl From<Vec<Problem>> for Response {
    fn from(problems: Vec<Problem>) -> Self {
        Self::from_problems(problems)
    }
}

impl FromIterator<Problem> for Response {
    fn from_iter<I: IntoIterator<Item = Problem>>(iter: I) -> Self {
        Self::from_problems(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(messages: &[&str]) -> Response {
        messages.iter().map(|m| Problem::new("pkg.Msg", *m)).collect()
    }

    fn messages(response: &Response) -> Vec<&str> {
        response
            .problems()
            .iter()
            .map(|p| p.message.as_str())
            .collect()
    }

    #[test]
    fn merge_appends_in_order() {
        let mut a = response(&["a1", "a2"]);
        a.merge(response(&["b1"]));
        a.merge(response(&["c1", "c2"]));
        assert_eq!(messages(&a), vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[test]
    fn merge_is_associative() {
        let mut left = response(&["a"]);
        left.merge(response(&["b"]));
        left.merge(response(&["c"]));

        let mut tail = response(&["b"]);
        tail.merge(response(&["c"]));
        let mut right = response(&["a"]);
        right.merge(tail);

        assert_eq!(left, right);
    }

    #[test]
    fn merge_is_not_commutative() {
        let mut ab = response(&["a"]);
        ab.merge(response(&["b"]));
        let mut ba = response(&["b"]);
        ba.merge(response(&["a"]));

        assert_ne!(ab, ba);
        assert_eq!(messages(&ba), vec!["b", "a"]);
    }

    #[test]
    fn merge_keeps_duplicates() {
        let mut a = response(&["same"]);
        a.merge(response(&["same"]));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn merge_with_empty() {
        let mut a = Response::new();
        a.merge(Response::new());
        assert!(a.is_empty());
        a.merge(response(&["x"]));
        assert_eq!(messages(&a), vec!["x"]);
    }

    #[test]
    fn attribute_overwrites_rule_and_category() {
        let id = RuleId::new("core", "naming");
        let mut problem = Problem::new("pkg.Msg", "bad").with_suggestion("Good");
        problem.rule_id = Some(RuleId::new("core", "other"));
        problem.category = Some(Category::Suggestion);
        problem.attribute(&id, Category::Error, "");

        assert_eq!(problem.rule_id, Some(id));
        assert_eq!(problem.category, Some(Category::Error));
        assert!(problem.rule_url.is_none());
    }

    #[test]
    fn attribute_keeps_url_set_by_rule() {
        let mut problem = Problem::new("pkg.Msg", "bad");
        problem.rule_url = Some("https://docs.example.dev/naming".to_string());
        problem.attribute(
            &RuleId::new("core", "naming"),
            Category::Error,
            "https://linter.example.dev/rules",
        );
        assert_eq!(
            problem.rule_url.as_deref(),
            Some("https://docs.example.dev/naming")
        );

        let mut problem = Problem::new("pkg.Msg", "bad");
        problem.attribute(
            &RuleId::new("core", "naming"),
            Category::Error,
            "https://linter.example.dev/rules",
        );
        assert_eq!(
            problem.rule_url.as_deref(),
            Some("https://linter.example.dev/rules")
        );
    }

    #[test]
    fn problem_display() {
        let mut problem = Problem::new("library.v1.Book", "field name should be snake_case")
            .with_location(SourceLocation::new((12, 3), (12, 20)));
        problem.attribute(&RuleId::new("core", "field-names"), Category::Error, "");
        insta::assert_snapshot!(
            problem,
            @"12:3: [core::field-names] library.v1.Book: field name should be snake_case"
        );
    }

    #[test]
    fn problem_serialization_skips_unset_fields() {
        let json = serde_json::to_value(Problem::new("pkg.Msg", "bad")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "bad", "descriptor": "pkg.Msg" })
        );
    }
}
