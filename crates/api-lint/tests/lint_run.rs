//! Integration tests for driving a run through the facade.

use api_lint::{
    lint, load_config, CancellationToken, Category, Descriptor, FileType, LintError, LintTarget,
    Problem, Request, Response, Rule, RuleBox, RuleId,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct ProtoFile {
    name: &'static str,
    package: &'static str,
}

impl Descriptor for ProtoFile {
    fn file_type(&self) -> FileType {
        FileType::ProtoFile
    }
    fn path(&self) -> &str {
        self.name
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reports files that declare no package.
struct PackageRequired;

impl Rule for PackageRequired {
    fn id(&self) -> RuleId {
        RuleId::new("core", "package-required")
    }
    fn description(&self) -> &str {
        "Every file must declare a package"
    }
    fn file_types(&self) -> &[FileType] {
        &[FileType::ProtoFile]
    }
    fn category(&self) -> Category {
        Category::Error
    }
    fn lint(&self, request: &Request<'_>) -> Result<Response, LintError> {
        let file = request
            .downcast::<ProtoFile>()
            .ok_or(LintError::UnsupportedDescriptor(request.file_type()))?;
        if file.package.is_empty() {
            return Ok(Response::from_problems(vec![Problem::new(
                file.name,
                "file has no package",
            )]));
        }
        Ok(Response::new())
    }
}

/// Spins until the run is cancelled.
struct Slow;

impl Rule for Slow {
    fn id(&self) -> RuleId {
        RuleId::new("core", "slow")
    }
    fn description(&self) -> &str {
        "Waits for cancellation"
    }
    fn file_types(&self) -> &[FileType] {
        &[FileType::ProtoFile]
    }
    fn category(&self) -> Category {
        Category::Suggestion
    }
    fn lint(&self, request: &Request<'_>) -> Result<Response, LintError> {
        loop {
            request.context().check_cancelled()?;
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

fn targets() -> Vec<LintTarget> {
    vec![
        LintTarget::new(Arc::new(ProtoFile {
            name: "library.proto",
            package: "library.v1",
        })),
        LintTarget::new(Arc::new(ProtoFile {
            name: "empty.proto",
            package: "",
        })),
    ]
}

#[test]
fn config_file_disables_rule() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("api-lint.toml"),
        "[rules.\"core::package-required\"]\nenabled = false\n",
    )
    .unwrap();
    let config = load_config(dir.path(), None).unwrap();

    let rules: Vec<RuleBox> = vec![Box::new(PackageRequired)];
    let run = lint(rules, &targets(), config, &CancellationToken::new()).unwrap();

    assert!(run.is_success());
    assert_eq!(run.invocations, 0);
}

#[test]
fn default_config_reports_problems() {
    let rules: Vec<RuleBox> = vec![Box::new(PackageRequired)];
    let run = lint(
        rules,
        &targets(),
        api_lint::Config::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert!(run.is_success());
    assert_eq!(run.invocations, 2);
    let found: Vec<String> = run.response.problems().iter().map(ToString::to_string).collect();
    assert_eq!(
        found,
        vec!["[core::package-required] empty.proto: file has no package"]
    );
}

#[test]
fn configured_timeout_cancels_run() {
    let config = api_lint::Config::parse("[engine]\ntimeout_ms = 50\nparallelism = 1\n").unwrap();
    let rules: Vec<RuleBox> = vec![Box::new(Slow), Box::new(PackageRequired)];
    let parent = CancellationToken::new();

    let run = lint(rules, &targets(), config, &parent).unwrap();

    assert!(run.is_cancelled());
    assert!(run.failures.is_empty());
    // The timeout belongs to the run, not the caller's token.
    assert!(!parent.is_cancelled());
}

#[test]
fn duplicate_rules_fail_to_start() {
    let rules: Vec<RuleBox> = vec![Box::new(PackageRequired), Box::new(PackageRequired)];
    let err = lint(
        rules,
        &targets(),
        api_lint::Config::default(),
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Duplicate rule ID: core::package-required");
}
