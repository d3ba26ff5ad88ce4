//! Engine that runs rules against descriptors and aggregates their findings.

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::context::Context;
use crate::descriptor::{Descriptor, DescriptorSource};
use crate::error::LintError;
use crate::identity::{Category, FileType, RuleId};
use crate::request::Request;
use crate::rule::{self, InvalidRule, Rule, RuleBox};
use crate::types::Response;

use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while building an [`Engine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two registered rules share the same ID.
    #[error("Duplicate rule ID: {0}")]
    DuplicateRule(RuleId),

    /// A rule's self-description is invalid.
    #[error("Invalid rule {id}: {source}")]
    InvalidRule {
        /// ID of the offending rule.
        id: RuleId,
        /// What is wrong with it.
        source: InvalidRule,
    },

    /// A rule panicked while reporting its metadata.
    #[error("Rule {rule} panicked while describing itself: {message}")]
    MetadataPanic {
        /// ID of the offending rule, or its registration index if the ID is unknown.
        rule: String,
        /// Panic message.
        message: String,
    },

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Decides whether a rule should see a descriptor.
pub type DescriptorFilter = Box<dyn Fn(&RuleId, &dyn Descriptor) -> bool + Send + Sync>;

/// A file to lint: its descriptor plus optional source metadata.
#[derive(Clone)]
pub struct LintTarget {
    descriptor: Arc<dyn Descriptor>,
    source: Option<Arc<dyn DescriptorSource>>,
}

impl LintTarget {
    /// Creates a target without source metadata.
    #[must_use]
    pub fn new(descriptor: Arc<dyn Descriptor>) -> Self {
        Self {
            descriptor,
            source: None,
        }
    }

    /// Attaches a descriptor source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DescriptorSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &dyn Descriptor {
        self.descriptor.as_ref()
    }

    fn context(&self, cancel: &CancellationToken) -> Context {
        match &self.source {
            Some(source) => Context::with_descriptor_source(cancel.clone(), Arc::clone(source)),
            None => Context::new(cancel.clone()),
        }
    }
}

/// Why a rule invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// The rule returned an error.
    #[error("rule returned an error: {0}")]
    Error(LintError),

    /// The rule panicked.
    #[error("rule panicked: {0}")]
    Panic(String),
}

/// A failed rule invocation against one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    /// Path of the descriptor being linted.
    pub descriptor: String,
    /// What went wrong.
    pub kind: FailureKind,
}

impl std::fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.descriptor, self.kind)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every selected rule ran to completion or recorded a failure.
    #[default]
    Completed,
    /// The run was cancelled by the caller or its deadline passed.
    Cancelled,
}

/// Result of a lint run.
#[derive(Debug, Default)]
pub struct LintRun {
    /// Problems from every successful invocation, ordered by rule ID then descriptor.
    pub response: Response,
    /// Failed invocations, keyed by rule ID.
    pub failures: BTreeMap<RuleId, Vec<RuleFailure>>,
    /// How the run ended.
    pub status: RunStatus,
    /// Number of rule invocations that were started.
    pub invocations: usize,
}

impl LintRun {
    fn cancelled() -> Self {
        Self {
            status: RunStatus::Cancelled,
            ..Self::default()
        }
    }

    /// Returns true if the run was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }

    /// Returns true if the run completed without rule failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed && self.failures.is_empty()
    }

    /// Returns the IDs of rules with at least one failure.
    pub fn failed_rules(&self) -> impl Iterator<Item = &RuleId> {
        self.failures.keys()
    }

    fn record_failure(&mut self, id: &RuleId, failure: RuleFailure) {
        self.failures.entry(id.clone()).or_default().push(failure);
    }
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    parallelism: Option<usize>,
    filter: Option<DescriptorFilter>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the engine.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the engine.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds multiple boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the worker count, overriding the configuration.
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }

    /// Restricts which descriptors each rule sees.
    #[must_use]
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RuleId, &dyn Descriptor) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share an ID, a rule describes itself
    /// invalidly or panics while doing so, or the worker pool cannot be
    /// created.
    pub fn build(self) -> Result<Engine, EngineError> {
        let config = self.config.unwrap_or_default();

        let mut rules = BTreeMap::new();
        for (index, boxed) in self.rules.into_iter().enumerate() {
            let id = panic::catch_unwind(AssertUnwindSafe(|| boxed.id())).map_err(|payload| {
                EngineError::MetadataPanic {
                    rule: format!("#{index}"),
                    message: panic_message(payload.as_ref()),
                }
            })?;
            let described = panic::catch_unwind(AssertUnwindSafe(|| {
                Registered::describe(boxed.as_ref())
            }))
            .map_err(|payload| EngineError::MetadataPanic {
                rule: id.to_string(),
                message: panic_message(payload.as_ref()),
            })?;
            let (file_types, category, url) =
                described.map_err(|source| EngineError::InvalidRule {
                    id: id.clone(),
                    source,
                })?;
            if rules.contains_key(&id) {
                return Err(EngineError::DuplicateRule(id));
            }
            rules.insert(
                id,
                Registered {
                    rule: boxed,
                    file_types,
                    category,
                    url,
                },
            );
        }

        let workers = self
            .parallelism
            .or(config.engine.parallelism)
            .unwrap_or_else(default_parallelism)
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("api-lint-worker-{i}"))
            .build()?;

        debug!("Built engine with {} rules and {} workers", rules.len(), workers);

        Ok(Engine {
            rules,
            config,
            filter: self.filter,
            pool,
        })
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// A rule plus the metadata captured when it was registered.
///
/// The engine reads only this snapshot after build, so a rule's accessors
/// run once and never during a lint run.
struct Registered {
    rule: RuleBox,
    file_types: Vec<FileType>,
    category: Category,
    url: String,
}

impl Registered {
    fn describe(rule: &dyn Rule) -> Result<(Vec<FileType>, Category, String), InvalidRule> {
        rule::validate(rule)?;
        Ok((
            rule.file_types().to_vec(),
            rule.category(),
            rule.url().to_string(),
        ))
    }
}

/// One rule invocation against one target.
struct Job<'e> {
    id: &'e RuleId,
    rule: &'e Registered,
    target: usize,
}

/// What a worker hands back to the aggregator.
enum Outcome {
    Completed(Response),
    Failed(LintError),
    Panicked(String),
    Skipped,
}

/// Runs registered rules against descriptors.
///
/// Use [`Engine::builder()`] to construct an instance. Rules run
/// concurrently on a bounded worker pool; their responses are merged in
/// ascending [`RuleId`] order, then descriptor order, independent of which
/// invocation finishes first.
pub struct Engine {
    rules: BTreeMap<RuleId, Registered>,
    config: Config,
    filter: Option<DescriptorFilter>,
    pool: rayon::ThreadPool,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the IDs of registered rules in ascending order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> {
        self.rules.keys()
    }

    /// Looks up a registered rule.
    #[must_use]
    pub fn rule(&self, id: &RuleId) -> Option<&dyn Rule> {
        self.rules.get(id).map(|registered| &*registered.rule)
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lints every target with every applicable rule.
    ///
    /// Rule errors and panics are recorded in [`LintRun::failures`] and do
    /// not stop other rules. Cancelling `cancel` stops new invocations from
    /// starting. The run is marked cancelled only if the cancellation kept
    /// an invocation from running or a rule stopped because of it.
    #[must_use]
    pub fn run(&self, targets: &[LintTarget], cancel: &CancellationToken) -> LintRun {
        info!(
            "Starting lint run: {} rules, {} files",
            self.rules.len(),
            targets.len()
        );

        if cancel.is_cancelled() {
            warn!("Lint run cancelled before dispatch");
            return LintRun::cancelled();
        }

        let jobs = self.select(targets);
        let contexts: Vec<Context> = targets.iter().map(|t| t.context(cancel)).collect();

        debug!("Dispatching {} rule invocations", jobs.len());

        // Indexed collect keeps outcomes in job order regardless of completion order.
        let outcomes: Vec<Outcome> = self.pool.install(|| {
            jobs.par_iter()
                .map(|job| invoke(job, &targets[job.target], &contexts[job.target]))
                .collect()
        });

        let mut run = LintRun::default();
        let mut interrupted = false;
        for (job, outcome) in jobs.iter().zip(outcomes) {
            let path = targets[job.target].descriptor().path();
            match outcome {
                Outcome::Completed(mut response) => {
                    run.invocations += 1;
                    for problem in response.problems_mut() {
                        problem.attribute(job.id, job.rule.category, &job.rule.url);
                    }
                    run.response.merge(response);
                }
                Outcome::Failed(LintError::Cancelled) if cancel.is_cancelled() => {
                    run.invocations += 1;
                    interrupted = true;
                    debug!("Rule {} stopped on cancellation for {}", job.id, path);
                }
                Outcome::Failed(error) => {
                    run.invocations += 1;
                    warn!("Rule {} failed on {}: {}", job.id, path, error);
                    run.record_failure(
                        job.id,
                        RuleFailure {
                            descriptor: path.to_string(),
                            kind: FailureKind::Error(error),
                        },
                    );
                }
                Outcome::Panicked(message) => {
                    run.invocations += 1;
                    warn!("Rule {} panicked on {}: {}", job.id, path, message);
                    run.record_failure(
                        job.id,
                        RuleFailure {
                            descriptor: path.to_string(),
                            kind: FailureKind::Panic(message),
                        },
                    );
                }
                Outcome::Skipped => interrupted = true,
            }
        }

        if interrupted {
            warn!(
                "Lint run cancelled after {} of {} invocations",
                run.invocations,
                jobs.len()
            );
            run.status = RunStatus::Cancelled;
        }

        info!(
            "Lint run complete: {} problems, {} failed rules",
            run.response.len(),
            run.failures.len()
        );

        run
    }

    /// Pairs each enabled rule with the targets it applies to, in aggregation order.
    fn select(&self, targets: &[LintTarget]) -> Vec<Job<'_>> {
        let mut jobs = Vec::new();
        for (id, registered) in &self.rules {
            if !self.config.is_rule_enabled(id) {
                debug!("Skipping disabled rule: {}", id);
                continue;
            }
            for (index, target) in targets.iter().enumerate() {
                let descriptor = target.descriptor();
                if !registered.file_types.contains(&descriptor.file_type()) {
                    continue;
                }
                if let Some(filter) = &self.filter {
                    if !filter(id, descriptor) {
                        debug!("Filtered out {} for rule {}", descriptor.path(), id);
                        continue;
                    }
                }
                jobs.push(Job {
                    id,
                    rule: registered,
                    target: index,
                });
            }
        }
        jobs
    }
}

/// Runs one job, converting a panic into an outcome.
fn invoke(job: &Job<'_>, target: &LintTarget, context: &Context) -> Outcome {
    if context.is_cancelled() {
        return Outcome::Skipped;
    }

    debug!("Running {} on {}", job.id, target.descriptor().path());

    let request = Request::new(target.descriptor(), context.clone());
    match panic::catch_unwind(AssertUnwindSafe(|| job.rule.rule.lint(&request))) {
        Ok(Ok(response)) => Outcome::Completed(response),
        Ok(Err(error)) => Outcome::Failed(error),
        Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
