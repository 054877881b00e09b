//! LaTeX formula rendering to MathML.

use std::collections::HashMap;
use std::fmt::Write;

use latex2mathml::{DisplayStyle, latex_to_mathml};

use crate::code_block::{CodeBlockProcessor, ProcessResult};
use crate::state::escape_html;
use crate::style::Style;

/// Fence languages rendered as display formulas.
pub const FORMULA_LANGUAGES: [&str; 3] = ["math", "latex", "tex"];

/// Formula rendering error.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("empty formula")]
    Empty,
    #[error("{0}")]
    Latex(String),
}

/// Render LaTeX source to a MathML string.
///
/// # Errors
///
/// Returns an error for blank input or LaTeX the converter rejects.
pub fn render_formula(source: &str, display: bool) -> Result<String, FormulaError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(FormulaError::Empty);
    }
    let style = if display {
        DisplayStyle::Block
    } else {
        DisplayStyle::Inline
    };
    latex_to_mathml(source, style).map_err(|e| FormulaError::Latex(e.to_string()))
}

/// Code block processor for display formula fences.
///
/// Output is a `<section>` carrying the formula style. Sources that fail to
/// render are shown verbatim between `$$` delimiters.
#[derive(Default)]
pub struct FormulaProcessor {
    style: Style,
    count: usize,
    warnings: Vec<String>,
}

impl FormulaProcessor {
    #[must_use]
    pub fn new(style: Style) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    fn open(&self, out: &mut String) {
        let css = self.style.to_css();
        if css.is_empty() {
            out.push_str("<section>");
        } else {
            write!(out, r#"<section style="{css}">"#).unwrap();
        }
    }
}

impl CodeBlockProcessor for FormulaProcessor {
    fn process(
        &mut self,
        language: &str,
        _attrs: &HashMap<String, String>,
        source: &str,
        _index: usize,
    ) -> ProcessResult {
        if !FORMULA_LANGUAGES.contains(&language) {
            return ProcessResult::PassThrough;
        }
        self.count += 1;

        let mut out = String::new();
        self.open(&mut out);
        match render_formula(source, true) {
            Ok(mathml) => out.push_str(&mathml),
            Err(e) => {
                tracing::debug!(formula = self.count, error = %e, "formula rendering failed");
                self.warnings.push(format!("formula {}: {e}", self.count));
                write!(out, "$${}$$", escape_html(source.trim())).unwrap();
            }
        }
        out.push_str("</section>");
        ProcessResult::Inline(out)
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
