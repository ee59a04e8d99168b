//! `cfx tree` command implementation.

use cfx_config::CliSettings;
use cfx_tree::PageTree;
use clap::Args;

use super::{SpaceArgs, create_client};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    pub(crate) space: SpaceArgs,

    /// Print the hierarchy as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

impl TreeArgs {
    /// Execute the tree command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or tree building fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.space.load_config(CliSettings::default())?;
        let confluence = config.require_confluence()?;
        let client = create_client(&config, confluence)?;

        let tree = self.space.build_tree(&client, confluence, &output)?;

        if self.json {
            output.result(&serde_json::to_string_pretty(&tree.to_nested())?)?;
            return Ok(());
        }

        output.highlight(&format!(
            "\n{} ({} pages)",
            confluence.space_key,
            tree.len()
        ));
        for (title, id) in tree_lines(&tree) {
            output.result(&format!("{title}{}", output.dim(&id)))?;
        }
        Ok(())
    }
}

/// Indented title and id suffix per page, in depth-first order.
fn tree_lines(tree: &PageTree) -> Vec<(String, String)> {
    tree.walk()
        .map(|(depth, id)| {
            let node = tree.node(id);
            (
                format!("{}{}", "  ".repeat(depth), node.title),
                format!(" ({})", node.id),
            )
        })
        .collect()
}
