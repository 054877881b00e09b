//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Configuration field that accepts environment variable references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnvField {
    Theme,
    KrokiUrl,
}

impl EnvField {
    /// Dotted path of the field in `mdstyle.toml`.
    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::Theme => "render.theme",
            Self::KrokiUrl => "diagrams.kroki_url",
        }
    }

    /// Expand `value` against the process environment.
    pub(crate) fn expand(self, value: &str) -> Result<String, ConfigError> {
        self.expand_with(value, |name| std::env::var(name).ok())
    }

    /// Expand `value`, resolving variables through `lookup`.
    ///
    /// An unset `${VAR}` is an error; `${VAR:-default}` falls back to the
    /// default. Bare `$VAR` is left alone.
    fn expand_with(
        self,
        value: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        if !value.contains("${") {
            return Ok(value.to_owned());
        }

        shellexpand::env_with_context(value, |name| lookup(name).map(Some).ok_or(()))
            .map(Cow::into_owned)
            .map_err(|e| ConfigError::EnvVar {
                field: self.path().to_owned(),
                message: format!("${{{}}} not set", e.var_name),
            })
    }
}
