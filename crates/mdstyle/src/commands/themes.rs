//! `mdstyle themes` command implementation.

use clap::Args;
use mdstyle_renderer::{DEFAULT_THEME, ThemeRegistry};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the themes command.
#[derive(Args)]
pub(crate) struct ThemesArgs {
    /// Show only dark themes.
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Show only light themes.
    #[arg(long)]
    light: bool,
}

/// One listed theme.
#[derive(Debug, PartialEq, Eq)]
struct ThemeEntry {
    name: String,
    dark: bool,
}

impl ThemesArgs {
    /// Execute the themes command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        for entry in self.entries()? {
            let kind = if entry.dark { "dark" } else { "light" };
            let marker = if entry.name == DEFAULT_THEME {
                " (default)"
            } else {
                ""
            };
            output.document(&format!("{}{marker}\t{}", entry.name, output.dim(kind)))?;
        }
        Ok(())
    }

    /// Bundled themes matching the `--dark`/`--light` filter, sorted by name.
    fn entries(&self) -> Result<Vec<ThemeEntry>, CliError> {
        let registry = ThemeRegistry::bundled();
        let mut entries = Vec::new();
        for name in registry.names() {
            let dark = registry.lookup(&name)?.is_dark();
            if (self.dark && !dark) || (self.light && dark) {
                continue;
            }
            entries.push(ThemeEntry { name, dark });
        }
        Ok(entries)
    }
}
