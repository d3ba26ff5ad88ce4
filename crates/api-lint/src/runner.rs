//! Helpers that load configuration and drive a single lint run.

use api_lint_core::{
    CancellationToken, Config, ConfigError, Engine, EngineError, LintRun, LintTarget, RuleBox,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file names to search for, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["api-lint.toml", ".api-lint.toml"];

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The engine could not be built from the given rules.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Returns the first config file present in `root`.
#[must_use]
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Loads configuration from `explicit` or the first candidate in `root`.
///
/// A relative `explicit` path is resolved against `root`. Without either,
/// the default configuration is returned.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(root.join(path)),
        None => find_config(root),
    };

    match path {
        Some(path) => {
            info!("Using config {}", path.display());
            Config::from_file(&path)
        }
        None => {
            debug!("No config file found in {}", root.display());
            Ok(Config::default())
        }
    }
}

/// Builds an engine from `rules` and `config` and lints `targets`.
///
/// The run observes `cancel` and, if `engine.timeout_ms` is configured,
/// is additionally cancelled once that timeout elapses.
///
/// # Errors
///
/// Returns an error if the engine cannot be built. Rule failures and
/// cancellation are reported in the returned [`LintRun`].
pub fn lint(
    rules: Vec<RuleBox>,
    targets: &[LintTarget],
    config: Config,
    cancel: &CancellationToken,
) -> Result<LintRun, RunError> {
    let token = match config.engine.timeout() {
        Some(timeout) => cancel.child_with_timeout(timeout),
        None => cancel.child(),
    };

    let engine = Engine::builder().rules(rules).config(config).build()?;
    Ok(engine.run(targets, &token))
}
