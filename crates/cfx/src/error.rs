//! CLI error types.

use cfx_config::ConfigError;
use cfx_confluence::ConfluenceError;
use cfx_export::ExportError;
use cfx_tree::BuildError;

/// CLI error type.
///
/// Wrapped errors are transparent so `main` can print the source chain
/// without repeating the top-level message.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
