//! Markdown converter producing inline-styled HTML fragments.

use std::collections::BTreeMap;
use std::time::Instant;

use mdstyle_config::Config;
use mdstyle_diagrams::{DEFAULT_DPI, DiagramProcessor};
use mdstyle_renderer::{
    BlockPreprocessor, DEFAULT_THEME, DiagramBlockTokenizer, Element, FormulaBlockTokenizer,
    FormulaProcessor, Highlighter, MarkdownRenderer, Style, StyleSheet, StyleSheetError,
    StyledBackend, Theme, ThemeError, lookup_theme,
};

/// Result of converting markdown to an HTML fragment.
#[derive(Clone, Debug)]
pub struct ConvertResult {
    /// Inline-styled HTML fragment.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Non-fatal problems (unclosed blocks, formula and diagram failures).
    pub warnings: Vec<String>,
    /// Whether the theme background is dark.
    pub theme_is_dark: bool,
}

/// Conversion error.
///
/// Only setup can fail; problems inside the document become warnings.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    StyleSheet(#[from] StyleSheetError),
}

/// Markdown to HTML fragment converter configuration.
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    theme: String,
    style_overrides: BTreeMap<String, Style>,
    gfm: bool,
    math: bool,
    kroki_url: Option<String>,
    dpi: u32,
    wrap: bool,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            style_overrides: BTreeMap::new(),
            gfm: true,
            math: true,
            kroki_url: None,
            dpi: DEFAULT_DPI,
            wrap: true,
        }
    }

    /// Create a converter from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .theme(config.render.theme.clone())
            .style_overrides(config.styles.clone())
            .gfm(config.render.gfm)
            .math(config.render.math)
            .wrap(config.render.wrap)
            .kroki_url(config.diagrams.kroki_url.clone())
            .dpi(config.diagrams.dpi)
    }

    /// Set the theme id (name or alias, case-insensitive).
    #[must_use]
    pub fn theme(mut self, id: impl Into<String>) -> Self {
        self.theme = id.into();
        self
    }

    /// Set per-element style overrides keyed by element key.
    #[must_use]
    pub fn style_overrides(mut self, overrides: BTreeMap<String, Style>) -> Self {
        self.style_overrides = overrides;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable `$` and `$$` formulas.
    #[must_use]
    pub fn math(mut self, enabled: bool) -> Self {
        self.math = enabled;
        self
    }

    /// Set the Kroki server; without one diagrams render as code.
    #[must_use]
    pub fn kroki_url(mut self, url: Option<String>) -> Self {
        self.kroki_url = url;
        self
    }

    /// Set DPI for `PlantUML` diagrams.
    #[must_use]
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Enable or disable the styled container around the fragment.
    #[must_use]
    pub fn wrap(mut self, enabled: bool) -> Self {
        self.wrap = enabled;
        self
    }

    /// Build the style sheet for the configured theme and overrides.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown theme or override element.
    pub fn stylesheet(&self) -> Result<StyleSheet, ConvertError> {
        self.resolve_theme().map(|(_, sheet)| sheet)
    }

    fn resolve_theme(&self) -> Result<(Theme, StyleSheet), ConvertError> {
        let theme = lookup_theme(&self.theme)?;
        let sheet = StyleSheet::from_theme(&theme).with_overrides(
            self.style_overrides
                .iter()
                .map(|(key, style)| (key.as_str(), style)),
        )?;
        Ok((theme, sheet))
    }

    /// Convert markdown to an inline-styled HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown theme or override element.
    pub fn convert(&self, markdown: &str) -> Result<ConvertResult, ConvertError> {
        let start = Instant::now();

        let (theme, sheet) = self.resolve_theme()?;
        let theme_is_dark = theme.is_dark();

        let mut preprocessor = BlockPreprocessor::new().with_tokenizer(DiagramBlockTokenizer);
        if self.math {
            preprocessor = preprocessor.with_tokenizer(FormulaBlockTokenizer);
        }
        let source = preprocessor.process(markdown);

        let formula_style = sheet.style(Element::Formula).clone();
        let diagram_style = sheet.style(Element::Diagram).clone();
        let backend = StyledBackend::new(sheet, Highlighter::new(&theme));

        let mut renderer = MarkdownRenderer::new(backend)
            .with_gfm(self.gfm)
            .with_math(self.math)
            .with_wrap(self.wrap);
        if self.math {
            renderer = renderer.with_processor(FormulaProcessor::new(formula_style));
        }
        if let Some(url) = &self.kroki_url {
            renderer = renderer.with_processor(
                DiagramProcessor::new(url.clone())
                    .dpi(self.dpi)
                    .figure_style(diagram_style),
            );
        }

        let result = renderer.render_markdown(&source);

        let mut warnings = preprocessor.into_warnings();
        warnings.extend(result.warnings);

        tracing::info!(
            theme = %theme.name,
            elapsed_ms = start.elapsed().as_millis(),
            warnings = warnings.len(),
            "converted markdown"
        );

        Ok(ConvertResult {
            html: result.html,
            title: result.title,
            warnings,
            theme_is_dark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overrides(key: &str, style: Style) -> BTreeMap<String, Style> {
        BTreeMap::from([(key.to_owned(), style)])
    }

    #[test]
    fn test_convert_basic() {
        let result = MarkdownConverter::new()
            .convert("# Title\n\nSome **bold** text.")
            .unwrap();

        assert_eq!(result.title.as_deref(), Some("Title"));
        assert!(result.html.starts_with("<section style="));
        assert!(result.html.ends_with("</section>"));
        assert!(result.html.contains("<h1 style="));
        assert!(result.html.contains("<strong style="));
        assert!(result.warnings.is_empty());
        assert!(!result.theme_is_dark);
    }

    #[test]
    fn test_convert_without_wrap() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("Hello")
            .unwrap();
        assert!(result.html.starts_with("<p style="));
    }

    #[test]
    fn test_dark_theme() {
        let result = MarkdownConverter::new()
            .theme("ocean-dark")
            .convert("text")
            .unwrap();
        assert!(result.theme_is_dark);
    }

    #[test]
    fn test_unknown_theme() {
        let err = MarkdownConverter::new()
            .theme("no-such-theme")
            .convert("text")
            .unwrap_err();
        assert!(matches!(err, ConvertError::Theme(_)));
        assert!(err.to_string().contains("no-such-theme"));
    }

    #[test]
    fn test_unknown_override_element() {
        let err = MarkdownConverter::new()
            .style_overrides(overrides("marquee", Style::new().with("color", "red")))
            .convert("text")
            .unwrap_err();
        assert!(matches!(err, ConvertError::StyleSheet(_)));
    }

    #[test]
    fn test_style_override_applied() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .style_overrides(overrides("h2", Style::new().with("color", "#0f4c81")))
            .convert("## Section")
            .unwrap();
        assert!(result.html.contains("color: #0f4c81;"));
    }

    #[test]
    fn test_stylesheet_matches_overrides() {
        let converter = MarkdownConverter::new()
            .style_overrides(overrides("paragraph", Style::new().with("margin", "0")));
        let sheet = converter.stylesheet().unwrap();
        assert_eq!(sheet.style(Element::Paragraph).get("margin"), Some("0"));
    }

    #[test]
    fn test_formula_block() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("$$\nx^2\n$$\n")
            .unwrap();
        assert!(result.html.starts_with("<section style="));
        assert!(result.html.contains("<math"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_math_disabled_keeps_dollars() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .math(false)
            .convert("$$ x^2 $$")
            .unwrap();
        assert!(!result.html.contains("<math"));
        assert!(result.html.contains("$$ x^2 $$"));
    }

    #[test]
    fn test_diagram_without_kroki_renders_code() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("::: mermaid\ngraph TD; A-->B\n:::\n")
            .unwrap();
        assert!(result.html.starts_with("<pre style="));
        assert!(result.html.contains("graph"));
        assert!(!result.html.contains("DIAGRAM"));
    }

    #[test]
    fn test_unclosed_block_warning() {
        let result = MarkdownConverter::new()
            .convert("Intro\n\n$$\nx^2\n")
            .unwrap();
        assert_eq!(result.warnings, ["line 3: unclosed formula block"]);
    }

    #[test]
    fn test_two_display_formulas_on_one_line() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("$$a$$ and $$b$$\n")
            .unwrap();
        assert_eq!(result.html.matches("<math").count(), 2);
        assert!(!result.html.contains("mathvariant=\"normal\">$"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_stray_dollars_do_not_hide_later_diagram() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("$$ 5 dollars\n\n::: mermaid\ngraph TD\n:::\n")
            .unwrap();
        assert!(result.html.contains("<pre style="));
        assert!(!result.html.contains(":::"));
        assert_eq!(result.warnings, ["line 1: unclosed formula block"]);
    }

    #[test]
    fn test_indented_code_keeps_delimiters() {
        let result = MarkdownConverter::new()
            .wrap(false)
            .convert("Example:\n\n    $$\n    x\n    $$\n")
            .unwrap();
        assert!(result.html.contains("$$<br>x<br>$$"));
        assert!(!result.html.contains("```"));
        assert!(!result.html.contains("<math"));
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_toml(
            "[render]\ntheme = \"solarized-dark\"\nwrap = false\n\n[styles.paragraph]\ncolor = \"red\"\n",
        )
        .unwrap();
        let result = MarkdownConverter::from_config(&config)
            .convert("Hello")
            .unwrap();

        assert!(result.theme_is_dark);
        assert!(result.html.starts_with("<p style="));
        assert!(result.html.contains("color: red;"));
    }
}
