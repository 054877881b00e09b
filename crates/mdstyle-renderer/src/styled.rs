//! Inline-styled backend.
//!
//! Every element carries its presentation in a `style` attribute so the
//! fragment keeps its look on platforms that drop `<style>` blocks and
//! classes.

use std::fmt::Write;

use pulldown_cmark::Alignment;

use crate::backend::{AlertKind, RenderBackend};
use crate::highlight::Highlighter;
use crate::state::{alignment_css, escape_html};
use crate::style::Style;
use crate::stylesheet::{Element, StyleSheet};
use crate::theme::Theme;

/// Render backend producing inline-styled HTML.
#[derive(Clone, Debug)]
pub struct StyledBackend {
    sheet: StyleSheet,
    highlighter: Highlighter,
}

impl StyledBackend {
    #[must_use]
    pub fn new(sheet: StyleSheet, highlighter: Highlighter) -> Self {
        Self { sheet, highlighter }
    }

    /// Backend with the default style sheet of a theme.
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self::new(StyleSheet::from_theme(theme), Highlighter::new(theme))
    }

    #[must_use]
    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    fn open(&self, tag: &str, element: Element, out: &mut String) {
        open_tag(tag, self.sheet.style(element), out);
    }
}

/// Write `<tag style="...">`, omitting an empty style attribute.
fn open_tag(tag: &str, style: &Style, out: &mut String) {
    write!(out, "<{tag}").unwrap();
    style_attr(style, out);
    out.push('>');
}

/// Write ` style="..."` unless the style is empty.
fn style_attr(style: &Style, out: &mut String) {
    let css = style.to_css();
    if !css.is_empty() {
        write!(out, r#" style="{css}""#).unwrap();
    }
}

fn close_tag(tag: &str, out: &mut String) {
    write!(out, "</{tag}>").unwrap();
}

impl RenderBackend for StyledBackend {
    fn heading_start(&self, level: u8, out: &mut String) {
        let level = level.clamp(1, 6);
        self.open(&format!("h{level}"), Element::heading(level), out);
    }

    fn heading_end(&self, level: u8, out: &mut String) {
        close_tag(&format!("h{}", level.clamp(1, 6)), out);
    }

    fn paragraph_start(&self, out: &mut String) {
        self.open("p", Element::Paragraph, out);
    }

    fn paragraph_end(&self, out: &mut String) {
        close_tag("p", out);
    }

    fn blockquote_start(&self, out: &mut String) {
        self.open("blockquote", Element::Blockquote, out);
    }

    fn blockquote_end(&self, out: &mut String) {
        close_tag("blockquote", out);
    }

    fn alert_start(&self, kind: AlertKind, out: &mut String) {
        let color = kind.color();
        let section = self
            .sheet
            .style(Element::Alert)
            .clone()
            .with("borderLeftColor", color);
        open_tag("section", &section, out);
        let title = self.sheet.style(Element::AlertTitle).clone().with("color", color);
        open_tag("p", &title, out);
        out.push_str(kind.title());
        close_tag("p", out);
    }

    fn alert_end(&self, _kind: AlertKind, out: &mut String) {
        close_tag("section", out);
    }

    fn code_block(&self, lang: Option<&str>, content: &str, out: &mut String) {
        self.open("pre", Element::CodeBlock, out);
        self.open("code", Element::CodeBlockInner, out);
        out.push_str(&self.highlighter.highlight(lang, content));
        out.push_str("</code></pre>");
    }

    fn inline_code(&self, code: &str, out: &mut String) {
        self.open("code", Element::InlineCode, out);
        out.push_str(&escape_html(code));
        close_tag("code", out);
    }

    fn list_start(&self, start: Option<u64>, out: &mut String) {
        match start {
            Some(1) => self.open("ol", Element::OrderedList, out),
            Some(n) => {
                write!(out, r#"<ol start="{n}""#).unwrap();
                style_attr(self.sheet.style(Element::OrderedList), out);
                out.push('>');
            }
            None => self.open("ul", Element::UnorderedList, out),
        }
    }

    fn list_end(&self, ordered: bool, out: &mut String) {
        close_tag(if ordered { "ol" } else { "ul" }, out);
    }

    fn item_start(&self, out: &mut String) {
        self.open("li", Element::ListItem, out);
    }

    fn item_end(&self, out: &mut String) {
        close_tag("li", out);
    }

    fn table_start(&self, out: &mut String) {
        self.open("section", Element::TableWrapper, out);
        self.open("table", Element::Table, out);
    }

    fn table_end(&self, out: &mut String) {
        out.push_str("</tbody></table></section>");
    }

    fn table_head_start(&self, out: &mut String) {
        out.push_str("<thead><tr>");
    }

    fn table_head_end(&self, out: &mut String) {
        out.push_str("</tr></thead><tbody>");
    }

    fn table_row_start(&self, out: &mut String) {
        out.push_str("<tr>");
    }

    fn table_row_end(&self, out: &mut String) {
        out.push_str("</tr>");
    }

    fn table_cell_start(&self, head: bool, alignment: Alignment, out: &mut String) {
        let (tag, element) = if head {
            ("th", Element::TableHeader)
        } else {
            ("td", Element::TableCell)
        };
        match alignment_css(alignment) {
            Some(align) => {
                let style = self.sheet.style(element).clone().with("textAlign", align);
                open_tag(tag, &style, out);
            }
            None => self.open(tag, element, out),
        }
    }

    fn table_cell_end(&self, head: bool, out: &mut String) {
        close_tag(if head { "th" } else { "td" }, out);
    }

    fn emphasis_start(&self, out: &mut String) {
        self.open("em", Element::Emphasis, out);
    }

    fn emphasis_end(&self, out: &mut String) {
        close_tag("em", out);
    }

    fn strong_start(&self, out: &mut String) {
        self.open("strong", Element::Strong, out);
    }

    fn strong_end(&self, out: &mut String) {
        close_tag("strong", out);
    }

    fn strikethrough_start(&self, out: &mut String) {
        self.open("del", Element::Strikethrough, out);
    }

    fn strikethrough_end(&self, out: &mut String) {
        close_tag("del", out);
    }

    fn link_start(&self, href: &str, title: &str, out: &mut String) {
        write!(out, r#"<a href="{}""#, escape_html(href)).unwrap();
        if !title.is_empty() {
            write!(out, r#" title="{}""#, escape_html(title)).unwrap();
        }
        style_attr(self.sheet.style(Element::Link), out);
        out.push('>');
    }

    fn link_end(&self, out: &mut String) {
        close_tag("a", out);
    }

    fn image(&self, src: &str, alt: &str, title: &str, out: &mut String) {
        self.open("figure", Element::Figure, out);
        write!(
            out,
            r#"<img src="{}" alt="{}""#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
        if !title.is_empty() {
            write!(out, r#" title="{}""#, escape_html(title)).unwrap();
        }
        style_attr(self.sheet.style(Element::Image), out);
        out.push('>');
        if !alt.is_empty() {
            self.open("figcaption", Element::Figcaption, out);
            out.push_str(&escape_html(alt));
            close_tag("figcaption", out);
        }
        close_tag("figure", out);
    }

    fn inline_formula(&self, mathml: &str, out: &mut String) {
        self.open("span", Element::InlineFormula, out);
        out.push_str(mathml);
        close_tag("span", out);
    }

    fn display_formula(&self, mathml: &str, out: &mut String) {
        self.open("section", Element::Formula, out);
        out.push_str(mathml);
        close_tag("section", out);
    }

    fn footnote_reference(&self, _label: &str, number: usize, out: &mut String) {
        self.open("sup", Element::FootnoteReference, out);
        write!(out, "[{number}]").unwrap();
        close_tag("sup", out);
    }

    fn footnote_definition_start(&self, _label: &str, number: usize, out: &mut String) {
        self.open("section", Element::Footnote, out);
        write!(out, "[{number}] ").unwrap();
    }

    fn footnote_definition_end(&self, out: &mut String) {
        close_tag("section", out);
    }

    fn horizontal_rule(&self, out: &mut String) {
        self.open("hr", Element::Rule, out);
    }

    fn task_list_marker(&self, checked: bool, out: &mut String) {
        out.push_str(if checked { "☑ " } else { "☐ " });
    }

    fn wrap_document(&self, body: String) -> String {
        let mut out = String::with_capacity(body.len() + 256);
        self.open("section", Element::Container, &mut out);
        out.push_str(&body);
        close_tag("section", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::lookup_theme;
    use pretty_assertions::assert_eq;

    fn backend() -> StyledBackend {
        StyledBackend::from_theme(&lookup_theme("github").unwrap())
    }

    fn bare() -> StyledBackend {
        let theme = lookup_theme("github").unwrap();
        let mut sheet = StyleSheet::from_theme(&theme);
        for element in Element::ALL {
            sheet.set_style(element, Style::new());
        }
        StyledBackend::new(sheet, Highlighter::new(&theme))
    }

    #[test]
    fn test_empty_style_omits_attribute() {
        let mut out = String::new();
        bare().paragraph_start(&mut out);
        assert_eq!(out, "<p>");
    }

    #[test]
    fn test_heading_carries_style() {
        let b = backend();
        let mut out = String::new();
        b.heading_start(2, &mut out);
        out.push_str("Title");
        b.heading_end(2, &mut out);
        let css = b.sheet().css(Element::H2);
        assert_eq!(out, format!(r#"<h2 style="{css}">Title</h2>"#));
        assert!(!out.contains("id="));
    }

    #[test]
    fn test_code_block_structure() {
        let mut out = String::new();
        bare().code_block(None, "a  b\n", &mut out);
        assert_eq!(out, "<pre><code>a &nbsp;b</code></pre>");
    }

    #[test]
    fn test_inline_code_escaped() {
        let mut out = String::new();
        bare().inline_code("<T>", &mut out);
        assert_eq!(out, "<code>&lt;T&gt;</code>");
    }

    #[test]
    fn test_ordered_list_start() {
        let b = bare();
        let mut out = String::new();
        b.list_start(Some(3), &mut out);
        b.list_end(true, &mut out);
        assert_eq!(out, r#"<ol start="3"></ol>"#);
    }

    #[test]
    fn test_unordered_list() {
        let b = bare();
        let mut out = String::new();
        b.list_start(None, &mut out);
        b.item_start(&mut out);
        b.item_end(&mut out);
        b.list_end(false, &mut out);
        assert_eq!(out, "<ul><li></li></ul>");
    }

    #[test]
    fn test_table_cell_alignment() {
        let b = bare();
        let mut out = String::new();
        b.table_cell_start(false, Alignment::Center, &mut out);
        b.table_cell_end(false, &mut out);
        assert_eq!(out, r#"<td style="text-align: center;"></td>"#);
    }

    #[test]
    fn test_table_is_wrapped() {
        let b = bare();
        let mut out = String::new();
        b.table_start(&mut out);
        b.table_head_start(&mut out);
        b.table_head_end(&mut out);
        b.table_end(&mut out);
        assert_eq!(
            out,
            "<section><table><thead><tr></tr></thead><tbody></tbody></table></section>"
        );
    }

    #[test]
    fn test_link_escapes_url() {
        let mut out = String::new();
        bare().link_start("https://a.b/?x=1&y=\"2\"", "", &mut out);
        assert_eq!(out, r#"<a href="https://a.b/?x=1&amp;y=&quot;2&quot;">"#);
    }

    #[test]
    fn test_image_with_caption() {
        let mut out = String::new();
        bare().image("cat.png", "A cat", "", &mut out);
        assert_eq!(
            out,
            r#"<figure><img src="cat.png" alt="A cat"><figcaption>A cat</figcaption></figure>"#
        );
    }

    #[test]
    fn test_image_without_alt_has_no_caption() {
        let mut out = String::new();
        bare().image("cat.png", "", "Title", &mut out);
        assert_eq!(
            out,
            r#"<figure><img src="cat.png" alt="" title="Title"></figure>"#
        );
    }

    #[test]
    fn test_task_list_glyphs() {
        let b = bare();
        let mut out = String::new();
        b.task_list_marker(true, &mut out);
        b.task_list_marker(false, &mut out);
        assert_eq!(out, "☑ ☐ ");
    }

    #[test]
    fn test_footnote_reference() {
        let mut out = String::new();
        bare().footnote_reference("note", 2, &mut out);
        assert_eq!(out, "<sup>[2]</sup>");
    }

    #[test]
    fn test_alert_has_title_and_kind_color() {
        let mut out = String::new();
        bare().alert_start(AlertKind::Warning, &mut out);
        assert!(out.starts_with("<section style=\"border-left-color: #9a6700;\">"));
        assert!(out.contains(">Warning</p>"));
    }

    #[test]
    fn test_wrap_document() {
        let b = backend();
        let html = b.wrap_document("<p>x</p>".to_owned());
        assert!(html.starts_with(r#"<section style="font-family:"#));
        assert!(html.ends_with("<p>x</p></section>"));
    }
}
