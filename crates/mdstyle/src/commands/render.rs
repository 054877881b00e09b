//! `mdstyle render` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use mdstyle_config::{CliSettings, Config};
use mdstyle_core::{ConvertResult, MarkdownConverter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write the fragment to this file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdstyle.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Theme name or alias (overrides config).
    #[arg(long)]
    theme: Option<String>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "MDSTYLE_KROKI_URL")]
    kroki_url: Option<String>,

    /// Render `$` and `$$` as plain text.
    #[arg(long)]
    no_math: bool,

    /// Disable tables, task lists, alerts, and footnotes.
    #[arg(long)]
    no_gfm: bool,

    /// Do not wrap the fragment in a styled container.
    #[arg(long)]
    no_wrap: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, or output fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "loaded configuration");
        }

        let markdown = self.read_input()?;
        let result = MarkdownConverter::from_config(&config).convert(&markdown)?;

        print_warnings(output, &result);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => output.document(&result.html)?,
        }

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            theme: self.theme.clone(),
            kroki_url: self.kroki_url.clone(),
            gfm: self.no_gfm.then_some(false),
            math: self.no_math.then_some(false),
            wrap: self.no_wrap.then_some(false),
        }
    }

    fn read_input(&self) -> Result<String, CliError> {
        match &self.input {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::Validation(format!(
                        "input file not found: {}",
                        path.display()
                    )));
                }
                Ok(std::fs::read_to_string(path)?)
            }
            None => {
                let mut markdown = String::new();
                std::io::stdin().read_to_string(&mut markdown)?;
                Ok(markdown)
            }
        }
    }
}

fn print_warnings(output: &Output, result: &ConvertResult) {
    if result.warnings.is_empty() {
        return;
    }
    output.warning(&format!("Warnings ({}):", result.warnings.len()));
    for warning in &result.warnings {
        output.warning(&format!("  - {warning}"));
    }
}
