//! Configuration management for mdstyle.
//!
//! Parses `mdstyle.toml` with serde and discovers it in the current
//! directory or its parents. CLI settings are applied on top during load via
//! [`CliSettings`].
//!
//! ```toml
//! [render]
//! theme = "github"
//! math = true
//!
//! [diagrams]
//! kroki_url = "${KROKI_URL:-https://kroki.io}"
//! dpi = 192
//!
//! [styles.h2]
//! fontSize = "22px"
//! color = "#0f4c81"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `render.theme`, `diagrams.kroki_url`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mdstyle_renderer::{DEFAULT_THEME, Element, Style};
use serde::Deserialize;

use expand::EnvField;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdstyle.toml";

const DEFAULT_DPI: u32 = 192;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub theme: Option<String>,
    pub kroki_url: Option<String>,
    pub gfm: Option<bool>,
    pub math: Option<bool>,
    pub wrap: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub diagrams: DiagramsConfig,
    /// Per-element style overrides keyed by element key (`h2`, `code_block`).
    pub styles: BTreeMap<String, Style>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering options.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Theme id (name, alias, or case-insensitive match).
    pub theme: String,
    /// GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// `$`/`$$` formulas.
    pub math: bool,
    /// Wrap the fragment in a styled container.
    pub wrap: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            gfm: true,
            math: true,
            wrap: true,
        }
    }
}

/// Diagram rendering options.
///
/// Without `kroki_url` diagram blocks render as highlighted code.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramsConfig {
    pub kroki_url: Option<String>,
    /// DPI for `PlantUML` rendering.
    pub dpi: u32,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., `diagrams.kroki_url`).
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Loads `config_path` when given; otherwise searches for `mdstyle.toml`
    /// in the current directory and its parents, falling back to defaults.
    /// CLI settings take precedence over file values and are validated with
    /// them.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` does not exist, or
    /// reading, parsing, expansion, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else {
            let discovered = std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd));
            match discovered {
                Some(path) => Self::load_from_file(&path)?,
                None => Self::default(),
            }
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, expanding and validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing, expansion, or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(theme) = &settings.theme {
            self.render.theme.clone_from(theme);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url = Some(kroki_url.clone());
        }
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(math) = settings.math {
            self.render.math = math;
        }
        if let Some(wrap) = settings.wrap {
            self.render.wrap = wrap;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.theme, "render.theme")?;
        self.validate_diagrams()?;
        self.validate_styles()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        const MAX_DPI: u32 = 1000;

        if let Some(ref kroki_url) = self.diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        let dpi = self.diagrams.dpi;
        if dpi == 0 {
            return Err(ConfigError::Validation(
                "diagrams.dpi must be greater than 0".to_owned(),
            ));
        }
        if dpi > MAX_DPI {
            return Err(ConfigError::Validation(format!(
                "diagrams.dpi cannot exceed {MAX_DPI}"
            )));
        }

        Ok(())
    }

    fn validate_styles(&self) -> Result<(), ConfigError> {
        for key in self.styles.keys() {
            if Element::from_key(key).is_none() {
                return Err(ConfigError::Validation(format!(
                    "unknown element [styles.{key}]"
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.render.theme = EnvField::Theme.expand(&self.render.theme)?;
        if let Some(ref url) = self.diagrams.kroki_url {
            self.diagrams.kroki_url = Some(EnvField::KrokiUrl.expand(url)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.theme, DEFAULT_THEME);
        assert!(config.render.gfm);
        assert!(config.render.math);
        assert!(config.render.wrap);
        assert_eq!(config.diagrams.kroki_url, None);
        assert_eq!(config.diagrams.dpi, 192);
        assert!(config.styles.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.render.theme, DEFAULT_THEME);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r##"
[render]
theme = "Solarized (dark)"
gfm = false
math = false
wrap = false

[diagrams]
kroki_url = "https://kroki.example.com"
dpi = 96

[styles.h2]
fontSize = "22px"
color = "#0f4c81"

[styles.code_block]
borderRadius = 6
"##;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.render.theme, "Solarized (dark)");
        assert!(!config.render.gfm);
        assert!(!config.render.math);
        assert!(!config.render.wrap);
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("https://kroki.example.com")
        );
        assert_eq!(config.diagrams.dpi, 96);
        assert_eq!(config.styles["h2"].get("fontSize"), Some("22px"));
        assert_eq!(config.styles["h2"].get("color"), Some("#0f4c81"));
        assert_eq!(config.styles["code_block"].get("borderRadius"), Some("6"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Config::from_toml("[server]\nport = 80\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml("[render]\ncolour = \"red\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_style_element_rejected() {
        let err = Config::from_toml("[styles.marquee]\ncolor = \"red\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("styles.marquee"));
    }

    #[test]
    fn test_validate_kroki_url_scheme() {
        let err = Config::from_toml("[diagrams]\nkroki_url = \"kroki.io\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: diagrams.kroki_url must start with http:// or https://"
        );
    }

    #[test]
    fn test_validate_kroki_url_empty() {
        let err = Config::from_toml("[diagrams]\nkroki_url = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("diagrams.kroki_url cannot be empty"));
    }

    #[test]
    fn test_validate_dpi_bounds() {
        let err = Config::from_toml("[diagrams]\ndpi = 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than 0"));

        let err = Config::from_toml("[diagrams]\ndpi = 1001\n").unwrap_err();
        assert!(err.to_string().contains("cannot exceed 1000"));

        Config::from_toml("[diagrams]\ndpi = 1000\n").unwrap();
    }

    #[test]
    fn test_validate_empty_theme() {
        let err = Config::from_toml("[render]\ntheme = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("render.theme cannot be empty"));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("MDSTYLE_TEST_THEME", "monokai");
            std::env::remove_var("MDSTYLE_TEST_KROKI");
        }

        let toml = r#"
[render]
theme = "${MDSTYLE_TEST_THEME}"

[diagrams]
kroki_url = "${MDSTYLE_TEST_KROKI:-http://localhost:8000}"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.render.theme, "monokai");
        assert_eq!(
            config.diagrams.kroki_url.as_deref(),
            Some("http://localhost:8000")
        );

        unsafe {
            std::env::remove_var("MDSTYLE_TEST_THEME");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("MDSTYLE_TEST_MISSING_URL");
        }

        let err =
            Config::from_toml("[diagrams]\nkroki_url = \"${MDSTYLE_TEST_MISSING_URL}\"\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            theme: Some("nord".to_owned()),
            kroki_url: Some("https://kroki.io".to_owned()),
            math: Some(false),
            ..Default::default()
        });

        assert_eq!(config.render.theme, "nord");
        assert_eq!(config.diagrams.kroki_url.as_deref(), Some("https://kroki.io"));
        assert!(!config.render.math);
        assert!(config.render.gfm); // Unchanged
        assert!(config.render.wrap); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render.theme, DEFAULT_THEME);
        assert_eq!(config.diagrams.kroki_url, None);
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&config_path, "[render]\ntheme = \"nord\"\n").unwrap();
        let nested = dir.path().join("docs/guides");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(config_path.clone()));
        assert_eq!(Config::discover_from(dir.path()), Some(config_path));
    }

    #[test]
    fn test_discover_ignores_directories_named_like_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(CONFIG_FILENAME)).unwrap();
        let found = Config::discover_from(dir.path());
        assert_ne!(found, Some(dir.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[diagrams]\nkroki_url = \"https://kroki.io\"\ndpi = 144\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.diagrams.dpi, 144);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            kroki_url: Some("ftp://kroki".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
