//! # api-lint
//!
//! Extensible linter core for API interface-definition files.
//!
//! This is the main facade crate. It re-exports the rule contract and
//! engine from `api-lint-core` and adds the helpers an embedding tool needs
//! to drive a run: configuration discovery, logging setup, and [`lint`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use api_lint::{lint, load_config, CancellationToken, LintTarget};
//!
//! api_lint::init_tracing(false);
//!
//! let config = load_config(Path::new("."), None)?;
//! let targets = vec![LintTarget::new(descriptor).with_source(source_info)];
//! let run = lint(my_rules(), &targets, config, &CancellationToken::new())?;
//!
//! for problem in run.response.problems() {
//!     println!("{problem}");
//! }
//! for (rule, failures) in &run.failures {
//!     eprintln!("{rule} failed on {} file(s)", failures.len());
//! }
//! ```
//!
//! ## Configuration
//!
//! `api-lint.toml` (or `.api-lint.toml`) in the project root:
//!
//! ```toml
//! [engine]
//! parallelism = 8
//! timeout_ms = 60000
//!
//! [rules."core::field-names"]
//! enabled = false
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use api_lint_core::*;

mod logging;
mod runner;

pub use logging::init_tracing;
pub use runner::{find_config, lint, load_config, RunError, CONFIG_CANDIDATES};
