//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod tree;

use std::path::PathBuf;

use cfx_config::{CliSettings, Config, ConfluenceConfig};
use cfx_confluence::{ClientConfig, ConfluenceClient, SpaceDirectory};
use cfx_tree::{PageTree, ParentPolicy, TreeBuilder};
use clap::Args;
use tracing::debug;

pub(crate) use export::ExportArgs;
pub(crate) use tree::TreeArgs;

use crate::error::CliError;
use crate::output::Output;

/// Arguments shared by every command that reads a space.
#[derive(Args)]
pub(crate) struct SpaceArgs {
    /// Path to configuration file (default: auto-discover cfx.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Space key (overrides config).
    #[arg(short, long, env = "CFX_SPACE")]
    pub(crate) space: Option<String>,

    /// Fail when a page is reported under two different parents.
    #[arg(long)]
    pub(crate) strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SpaceArgs {
    /// Load configuration, layering `settings` on top.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.space_key.clone_from(&self.space);
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        debug!(config_path = ?config.config_path, "Configuration loaded");
        Ok(config)
    }

    fn parent_policy(&self) -> ParentPolicy {
        if self.strict {
            ParentPolicy::Strict
        } else {
            ParentPolicy::LastWins
        }
    }

    /// Build the page tree of the configured space.
    pub(crate) fn build_tree(
        &self,
        client: &ConfluenceClient,
        confluence: &ConfluenceConfig,
        output: &Output,
    ) -> Result<PageTree, CliError> {
        output.info(&format!(
            "Building page tree for space {}...",
            confluence.space_key
        ));

        let directory = SpaceDirectory::new(client, &confluence.space_key);
        let tree = TreeBuilder::new()
            .parent_policy(self.parent_policy())
            .build_from_directory(&directory)?;

        if tree.unreachable() > 0 {
            output.warning(&format!(
                "Warning: {} page(s) form a parent cycle and are not reachable from any root",
                tree.unreachable()
            ));
        }
        Ok(tree)
    }
}

/// Create a client from the loaded configuration.
pub(crate) fn create_client(
    config: &Config,
    confluence: &ConfluenceConfig,
) -> Result<ConfluenceClient, CliError> {
    let client_config = ClientConfig::from_settings(
        confluence,
        &config.http,
        config.export_resolved.page_size,
    );
    Ok(ConfluenceClient::new(client_config)?)
}
