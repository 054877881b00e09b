//! Syntax highlighting with inline styles.
//!
//! Tokenization is done by `syntect`; this module only turns the styled
//! token runs into `<span style="...">` markup that survives paste targets
//! which strip classes and ignore `white-space`.

use std::fmt::Write;
use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as TokenStyle, Theme as SyntaxTheme};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::state::escape_html;
use crate::theme::Theme;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Number of non-breaking spaces a tab expands to.
const TAB_WIDTH: usize = 4;

/// Code highlighter bound to a theme.
#[derive(Clone, Debug)]
pub struct Highlighter {
    theme: SyntaxTheme,
}

impl Highlighter {
    /// Create a highlighter for a theme.
    #[must_use]
    pub fn new(theme: &Theme) -> Self {
        Self {
            theme: theme.syntax.clone(),
        }
    }

    /// Whether a language identifier resolves to a known grammar.
    #[must_use]
    pub fn supports(&self, lang: &str) -> bool {
        find_syntax(lang).is_some()
    }

    /// Highlight code, returning inline-styled HTML (no wrapping element).
    ///
    /// Unknown or missing languages produce escaped plain text.
    #[must_use]
    pub fn highlight(&self, lang: Option<&str>, code: &str) -> String {
        let Some(syntax) = lang.and_then(find_syntax) else {
            return plain(code);
        };

        match self.highlight_with(syntax, code) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!(language = ?lang, error = %err, "highlighting failed, using plain text");
                plain(code)
            }
        }
    }

    fn highlight_with(
        &self,
        syntax: &SyntaxReference,
        code: &str,
    ) -> Result<String, syntect::Error> {
        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(code.len() * 2);
        let mut first = true;

        for line in LinesWithEndings::from(code) {
            let ranges = lines.highlight_line(line, &SYNTAXES)?;
            if !first {
                out.push_str("<br>");
            }
            first = false;
            push_line(ranges, &mut out);
        }

        Ok(out)
    }
}

/// Emit one highlighted line, merging adjacent tokens with the same style.
fn push_line<'a>(ranges: impl IntoIterator<Item = (TokenStyle, &'a str)>, out: &mut String) {
    let mut ws = Whitespace::new();
    let mut run = Run::default();
    for (style, text) in ranges {
        let text = text.trim_end_matches(['\n', '\r']);
        if text.is_empty() {
            continue;
        }
        let css = span_css(style);
        if run.css != css {
            run.flush(out);
            run.css = css;
        }
        ws.escape_into(text, &mut run.text);
    }
    run.flush(out);
}

/// Resolve a language identifier by token (extension) or by name.
fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let lang = lang.trim().to_ascii_lowercase();
    if lang.is_empty() {
        return None;
    }
    SYNTAXES
        .find_syntax_by_token(&lang)
        .or_else(|| {
            SYNTAXES
                .syntaxes()
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(&lang))
        })
        .filter(|s| s.name != "Plain Text")
}

/// Escaped code without token styling.
fn plain(code: &str) -> String {
    let code = code.strip_suffix('\n').unwrap_or(code);
    let mut out = String::with_capacity(code.len());
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        Whitespace::new().escape_into(line.trim_end_matches('\r'), &mut out);
    }
    out
}

/// Inline CSS for a token style.
fn span_css(style: TokenStyle) -> String {
    let c = style.foreground;
    let mut css = format!("color:#{:02x}{:02x}{:02x}", c.r, c.g, c.b);
    if style.font_style.contains(FontStyle::BOLD) {
        css.push_str(";font-weight:bold");
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        css.push_str(";font-style:italic");
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        css.push_str(";text-decoration:underline");
    }
    css
}

/// Consecutive tokens sharing one style.
#[derive(Default)]
struct Run {
    css: String,
    text: String,
}

impl Run {
    fn flush(&mut self, out: &mut String) {
        if !self.text.is_empty() {
            write!(out, r#"<span style="{}">{}</span>"#, self.css, self.text).unwrap();
            self.text.clear();
        }
    }
}

/// Whitespace state within a single line.
///
/// Spaces that HTML would collapse (indentation and repeated spaces) become
/// `&nbsp;`; tabs always expand.
struct Whitespace {
    line_start: bool,
    prev_space: bool,
}

impl Whitespace {
    fn new() -> Self {
        Self {
            line_start: true,
            prev_space: false,
        }
    }

    fn escape_into(&mut self, text: &str, out: &mut String) {
        for c in text.chars() {
            match c {
                ' ' => {
                    if self.line_start || self.prev_space {
                        out.push_str("&nbsp;");
                    } else {
                        out.push(' ');
                    }
                    self.prev_space = true;
                    continue;
                }
                '\t' => {
                    for _ in 0..TAB_WIDTH {
                        out.push_str("&nbsp;");
                    }
                    self.prev_space = true;
                    continue;
                }
                _ => {
                    let mut buf = [0; 4];
                    out.push_str(&escape_html(c.encode_utf8(&mut buf)));
                }
            }
            self.line_start = false;
            self.prev_space = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::lookup_theme;
    use pretty_assertions::assert_eq;

    fn highlighter() -> Highlighter {
        Highlighter::new(&lookup_theme("github").unwrap())
    }

    #[test]
    fn test_plain_text_without_language() {
        let html = highlighter().highlight(None, "a < b\n");
        assert_eq!(html, "a &lt; b");
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let html = highlighter().highlight(Some("no-such-lang"), "x\ny\n");
        assert_eq!(html, "x<br>y");
    }

    #[test]
    fn test_plain_preserves_indentation() {
        let html = highlighter().highlight(None, "if x:\n    y  = 1\n\tz\n");
        assert_eq!(
            html,
            "if x:<br>&nbsp;&nbsp;&nbsp;&nbsp;y &nbsp;= 1<br>&nbsp;&nbsp;&nbsp;&nbsp;z"
        );
    }

    #[test]
    fn test_rust_is_highlighted_with_inline_colors() {
        let html = highlighter().highlight(Some("rust"), "fn main() {}\n");
        assert!(html.contains(r#"<span style="color:#"#));
        assert!(html.contains("main"));
        assert!(!html.contains("class="));
        assert!(!html.ends_with("<br>"));
    }

    #[test]
    fn test_language_lookup_by_extension_and_case() {
        let h = highlighter();
        assert!(h.supports("rs"));
        assert!(h.supports("Python"));
        assert!(h.supports("py"));
        assert!(!h.supports("no-such-lang"));
        assert!(!h.supports(""));
    }

    fn token(r: u8, font_style: FontStyle) -> TokenStyle {
        TokenStyle {
            foreground: syntect::highlighting::Color { r, g: 0, b: 0, a: 0xff },
            background: syntect::highlighting::Color::WHITE,
            font_style,
        }
    }

    #[test]
    fn test_adjacent_tokens_with_same_style_merge() {
        let red = token(0xff, FontStyle::empty());
        let bold = token(0xff, FontStyle::BOLD);
        let mut out = String::new();
        push_line(
            [(red, "let"), (red, " x"), (bold, " ="), (red, " 1;"), (red, "\n")],
            &mut out,
        );
        assert_eq!(
            out,
            concat!(
                r#"<span style="color:#ff0000">let x</span>"#,
                r#"<span style="color:#ff0000;font-weight:bold"> =</span>"#,
                r#"<span style="color:#ff0000"> 1;</span>"#,
            )
        );
    }

    #[test]
    fn test_whitespace_state_spans_tokens() {
        let plain = token(0, FontStyle::empty());
        let other = token(1, FontStyle::empty());
        let mut out = String::new();
        push_line([(plain, "  a "), (other, " b")], &mut out);
        assert_eq!(
            out,
            concat!(
                r#"<span style="color:#000000">&nbsp;&nbsp;a </span>"#,
                r#"<span style="color:#010000">&nbsp;b</span>"#,
            )
        );
    }

    #[test]
    fn test_multiline_joined_with_br() {
        let html = highlighter().highlight(Some("python"), "a = 1\nb = 2\n");
        assert_eq!(html.matches("<br>").count(), 1);
    }

    #[test]
    fn test_highlighted_text_is_escaped() {
        let html = highlighter().highlight(Some("html"), "<div>&</div>\n");
        assert!(html.contains("&lt;"));
        assert!(html.contains("&amp;"));
        assert!(!html.contains("<div>"));
    }

    #[test]
    fn test_empty_code() {
        assert_eq!(highlighter().highlight(Some("rust"), ""), "");
        assert_eq!(highlighter().highlight(None, ""), "");
    }
}
