//! cfx CLI - Confluence space exporter.
//!
//! Provides commands for:
//! - `export`: Mirror a space to linked HTML files
//! - `tree`: Print the page hierarchy of a space

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use commands::{ExportArgs, TreeArgs};
use output::Output;

/// cfx - Confluence space exporter.
#[derive(Parser)]
#[command(name = "cfx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a space as an offline HTML mirror.
    Export(ExportArgs),
    /// Print the page hierarchy of a space.
    Tree(TreeArgs),
}

/// Log filter: INFO with `--verbose`, otherwise `RUST_LOG` falling back to WARN.
fn log_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(env.unwrap_or_default())
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Export(args) => args.space.verbose,
            Self::Tree(args) => args.space.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.command.verbose(), env.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Export(args) => args.execute(),
        Commands::Tree(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            output.error(&format!("  caused by: {cause}"));
            source = std::error::Error::source(cause);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::try_parse_from([
            "cfx",
            "export",
            "--space",
            "DOCS",
            "--output-dir",
            "mirror",
            "--no-images",
            "--strict",
            "-v",
        ])
        .unwrap();

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.space.space.as_deref(), Some("DOCS"));
        assert!(args.no_images);
        assert!(args.space.strict);
        assert!(Commands::Export(args).verbose());
    }

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(false, Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_env_and_verbose() {
        assert_eq!(log_filter(false, Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true, Some("trace")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_tree_json_flag() {
        let cli = Cli::try_parse_from(["cfx", "tree", "--json"]).unwrap();

        let Commands::Tree(args) = cli.command else {
            panic!("expected tree command");
        };
        assert!(args.json);
        assert!(!args.space.strict);
        assert!(!args.space.verbose);
    }
}
