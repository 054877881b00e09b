//! Render backend trait: the per-node renderer overrides.
//!
//! [`MarkdownRenderer`](crate::MarkdownRenderer) walks the parser events and
//! calls one method per node kind. A backend decides the markup for each of
//! them; [`StyledBackend`](crate::StyledBackend) decorates every element with
//! inline styles, [`PlainBackend`](crate::PlainBackend) emits bare semantic
//! HTML.

use std::borrow::Cow;

use pulldown_cmark::{Alignment, BlockQuoteKind};

/// GitHub-style alert kinds (`> [!NOTE]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Title shown above the alert content.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }

    /// Signature color of the alert kind.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Note => "#0969da",
            Self::Tip => "#1a7f37",
            Self::Important => "#8250df",
            Self::Warning => "#9a6700",
            Self::Caution => "#d1242f",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Per-node rendering operations.
///
/// Every method appends to `out`. Inline content between `*_start` and
/// `*_end` calls is written by the renderer.
pub trait RenderBackend {
    fn heading_start(&self, level: u8, out: &mut String);
    fn heading_end(&self, level: u8, out: &mut String);

    fn paragraph_start(&self, out: &mut String);
    fn paragraph_end(&self, out: &mut String);

    fn blockquote_start(&self, out: &mut String);
    fn blockquote_end(&self, out: &mut String);

    fn alert_start(&self, kind: AlertKind, out: &mut String);
    fn alert_end(&self, kind: AlertKind, out: &mut String);

    /// Render a complete fenced or indented code block.
    fn code_block(&self, lang: Option<&str>, content: &str, out: &mut String);

    fn inline_code(&self, code: &str, out: &mut String);

    /// Open a list; `start` is `Some` for ordered lists.
    fn list_start(&self, start: Option<u64>, out: &mut String);
    fn list_end(&self, ordered: bool, out: &mut String);

    fn item_start(&self, out: &mut String);
    fn item_end(&self, out: &mut String);

    fn table_start(&self, out: &mut String);
    fn table_end(&self, out: &mut String);
    fn table_head_start(&self, out: &mut String);
    fn table_head_end(&self, out: &mut String);
    fn table_row_start(&self, out: &mut String);
    fn table_row_end(&self, out: &mut String);
    fn table_cell_start(&self, head: bool, alignment: Alignment, out: &mut String);
    fn table_cell_end(&self, head: bool, out: &mut String);

    fn emphasis_start(&self, out: &mut String);
    fn emphasis_end(&self, out: &mut String);
    fn strong_start(&self, out: &mut String);
    fn strong_end(&self, out: &mut String);
    fn strikethrough_start(&self, out: &mut String);
    fn strikethrough_end(&self, out: &mut String);

    /// Open a link. `href` is already transformed but not escaped.
    fn link_start(&self, href: &str, title: &str, out: &mut String);
    fn link_end(&self, out: &mut String);

    fn image(&self, src: &str, alt: &str, title: &str, out: &mut String);

    /// Render MathML produced for an inline formula.
    fn inline_formula(&self, mathml: &str, out: &mut String);

    /// Render MathML produced for a display formula.
    fn display_formula(&self, mathml: &str, out: &mut String);

    fn footnote_reference(&self, label: &str, number: usize, out: &mut String);
    fn footnote_definition_start(&self, label: &str, number: usize, out: &mut String);
    fn footnote_definition_end(&self, out: &mut String);

    /// Formula source shown when rendering failed.
    ///
    /// Default keeps the original delimiters.
    fn formula_source(&self, source: &str, display: bool, out: &mut String) {
        let delim = if display { "$$" } else { "$" };
        out.push_str(delim);
        out.push_str(&crate::escape_html(source));
        out.push_str(delim);
    }

    fn superscript_start(&self, out: &mut String) {
        out.push_str("<sup>");
    }

    fn superscript_end(&self, out: &mut String) {
        out.push_str("</sup>");
    }

    fn subscript_start(&self, out: &mut String) {
        out.push_str("<sub>");
    }

    fn subscript_end(&self, out: &mut String) {
        out.push_str("</sub>");
    }

    fn hard_break(&self, out: &mut String) {
        out.push_str("<br>");
    }

    fn horizontal_rule(&self, out: &mut String) {
        out.push_str("<hr>");
    }

    fn task_list_marker(&self, checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }

    /// Transform a link URL before it is written.
    #[must_use]
    fn transform_link<'a>(&self, url: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(url)
    }

    /// Wrap the finished document body.
    #[must_use]
    fn wrap_document(&self, body: String) -> String {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_kind_from_blockquote_kind() {
        assert_eq!(AlertKind::from(BlockQuoteKind::Note), AlertKind::Note);
        assert_eq!(AlertKind::from(BlockQuoteKind::Caution), AlertKind::Caution);
    }

    #[test]
    fn test_alert_titles() {
        assert_eq!(AlertKind::Tip.title(), "Tip");
        assert_eq!(AlertKind::Important.title(), "Important");
        assert!(AlertKind::Warning.color().starts_with('#'));
    }
}
