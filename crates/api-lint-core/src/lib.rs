//! # api-lint-core
//!
//! Core framework for linting API interface-definition files.
//!
//! This crate defines the contract every lint rule implements and the
//! engine that runs many rules against parsed descriptors. It includes:
//!
//! - [`Rule`] trait and the [`RuleId`], [`FileType`], [`Category`] metadata
//! - [`Context`] carrying cancellation and optional [`DescriptorSource`] lookups
//! - [`Request`] and [`Response`] envelopes for a single invocation
//! - [`Engine`] for concurrent, isolated, deterministically ordered runs
//!
//! Parsing descriptors, the rule catalogue, and reporting live elsewhere.
//!
//! ## Example
//!
//! ```ignore
//! use api_lint_core::{CancellationToken, Engine, LintTarget};
//!
//! let engine = Engine::builder()
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let run = engine.run(&[LintTarget::new(descriptor)], &CancellationToken::new());
//! for problem in run.response.problems() {
//!     println!("{problem}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod context;
mod descriptor;
mod engine;
mod error;
mod identity;
mod request;
mod rule;
mod types;

pub use cancel::CancellationToken;
pub use config::{Config, ConfigError, EngineSettings, RuleConfig};
pub use context::Context;
pub use descriptor::{
    Comments, Descriptor, DescriptorPath, DescriptorSource, SourceInfo, SourceLocation,
};
pub use engine::{
    DescriptorFilter, Engine, EngineBuilder, EngineError, FailureKind, LintRun, LintTarget,
    RuleFailure, RunStatus,
};
pub use error::{LintError, SourceError};
pub use identity::{Category, FileType, RuleId, RuleIdParseError};
pub use request::Request;
pub use rule::{InvalidRule, Rule, RuleBox};
pub use types::{Problem, Response};
