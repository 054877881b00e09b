//! mdstyle CLI - Markdown to inline-styled HTML fragments.
//!
//! Provides commands for:
//! - `render`: Convert a markdown file to an HTML fragment
//! - `themes`: List bundled themes
//! - `css`: Print the inline CSS of one element

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CssArgs, RenderArgs, ThemesArgs};
use output::Output;

/// mdstyle - Markdown to inline-styled HTML fragments.
#[derive(Parser)]
#[command(name = "mdstyle", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to an inline-styled HTML fragment.
    Render(RenderArgs),
    /// List bundled themes.
    Themes(ThemesArgs),
    /// Print the inline CSS applied to an element.
    Css(CssArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Themes(args) => args.execute(&output),
        Commands::Css(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
