//! `cfx export` command implementation.

use std::path::PathBuf;

use cfx_config::CliSettings;
use cfx_export::{ExportOptions, ExportSummary, Exporter};
use clap::Args;

use super::{SpaceArgs, create_client};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) space: SpaceArgs,

    /// Output directory (overrides config).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Keep images pointing at Confluence instead of downloading them.
    #[arg(long)]
    pub(crate) no_images: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, tree building or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.space.load_config(CliSettings {
            output_dir: self.output_dir.clone(),
            download_images: self.no_images.then_some(false),
            ..Default::default()
        })?;
        let confluence = config.require_confluence()?;
        let client = create_client(&config, confluence)?;

        let tree = self.space.build_tree(&client, confluence, &output)?;
        output.info(&format!(
            "Found {} pages ({} child lookups)",
            tree.len(),
            tree.fetch_count()
        ));

        let export = &config.export_resolved;
        output.info(&format!("Exporting to {}...", export.output_dir.display()));

        let options = ExportOptions {
            output_dir: export.output_dir.clone(),
            download_images: export.download_images,
            title: confluence.space_key.clone(),
        };
        let summary = Exporter::new(&client, options).export(&tree)?;

        print_summary(&output, &summary);
        Ok(())
    }
}

fn print_summary(output: &Output, summary: &ExportSummary) {
    output.success("\nExport complete!");
    output.info(&format!("Pages: {}", summary.pages));
    output.info(&format!("Images: {}", summary.images));

    if !summary.warnings.is_empty() {
        output.warning(&format!("\nWarnings ({}):", summary.warnings.len()));
        for warning in &summary.warnings {
            output.info(&format!("  - {warning}"));
        }
    }
}
