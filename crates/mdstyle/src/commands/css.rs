//! `mdstyle css` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdstyle_config::{CliSettings, Config};
use mdstyle_core::MarkdownConverter;
use mdstyle_renderer::Element;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the css command.
#[derive(Args)]
pub(crate) struct CssArgs {
    /// Element key (`h2`, `code_block`, `table_header`, ...).
    element: String,

    /// Theme name or alias (overrides config).
    #[arg(long)]
    theme: Option<String>,

    /// Path to configuration file (default: auto-discover mdstyle.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CssArgs {
    /// Execute the css command.
    ///
    /// Prints the declarations after config overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown element or theme.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        output.document(&self.declarations()?)?;
        Ok(())
    }

    fn declarations(self) -> Result<String, CliError> {
        let element = parse_element(&self.element)?;

        let settings = CliSettings {
            theme: self.theme,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let sheet = MarkdownConverter::from_config(&config).stylesheet()?;
        Ok(sheet.css(element))
    }
}

fn parse_element(key: &str) -> Result<Element, CliError> {
    Element::from_key(key).ok_or_else(|| {
        let valid: Vec<_> = Element::ALL.iter().map(|e| e.key()).collect();
        CliError::Validation(format!(
            "unknown element '{key}' (valid: {})",
            valid.join(", ")
        ))
    })
}
