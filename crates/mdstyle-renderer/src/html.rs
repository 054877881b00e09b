//! Plain HTML backend.
//!
//! Produces unstyled semantic HTML5. Useful for comparing output structure
//! against the styled backend and for consumers that bring their own CSS.

use std::fmt::Write;

use pulldown_cmark::Alignment;

use crate::backend::{AlertKind, RenderBackend};
use crate::state::{alignment_css, escape_html};

/// Unstyled HTML render backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainBackend;

impl RenderBackend for PlainBackend {
    fn heading_start(&self, level: u8, out: &mut String) {
        write!(out, "<h{}>", level.clamp(1, 6)).unwrap();
    }

    fn heading_end(&self, level: u8, out: &mut String) {
        write!(out, "</h{}>", level.clamp(1, 6)).unwrap();
    }

    fn paragraph_start(&self, out: &mut String) {
        out.push_str("<p>");
    }

    fn paragraph_end(&self, out: &mut String) {
        out.push_str("</p>");
    }

    fn blockquote_start(&self, out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(&self, out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn alert_start(&self, kind: AlertKind, out: &mut String) {
        let title = kind.title();
        write!(
            out,
            r#"<div class="alert alert-{}"><p class="alert-title">{title}</p>"#,
            title.to_ascii_lowercase()
        )
        .unwrap();
    }

    fn alert_end(&self, _kind: AlertKind, out: &mut String) {
        out.push_str("</div>");
    }

    fn code_block(&self, lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        }
    }

    fn inline_code(&self, code: &str, out: &mut String) {
        write!(out, "<code>{}</code>", escape_html(code)).unwrap();
    }

    fn list_start(&self, start: Option<u64>, out: &mut String) {
        match start {
            Some(1) => out.push_str("<ol>"),
            Some(n) => write!(out, r#"<ol start="{n}">"#).unwrap(),
            None => out.push_str("<ul>"),
        }
    }

    fn list_end(&self, ordered: bool, out: &mut String) {
        out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }

    fn item_start(&self, out: &mut String) {
        out.push_str("<li>");
    }

    fn item_end(&self, out: &mut String) {
        out.push_str("</li>");
    }

    fn table_start(&self, out: &mut String) {
        out.push_str("<table>");
    }

    fn table_end(&self, out: &mut String) {
        out.push_str("</tbody></table>");
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
        let tag = if head { "th" } else { "td" };
        match alignment_css(alignment) {
            Some(align) => write!(out, r#"<{tag} style="text-align: {align};">"#).unwrap(),
            None => write!(out, "<{tag}>").unwrap(),
        }
    }

    fn table_cell_end(&self, head: bool, out: &mut String) {
        out.push_str(if head { "</th>" } else { "</td>" });
    }

    fn emphasis_start(&self, out: &mut String) {
        out.push_str("<em>");
    }

    fn emphasis_end(&self, out: &mut String) {
        out.push_str("</em>");
    }

    fn strong_start(&self, out: &mut String) {
        out.push_str("<strong>");
    }

    fn strong_end(&self, out: &mut String) {
        out.push_str("</strong>");
    }

    fn strikethrough_start(&self, out: &mut String) {
        out.push_str("<del>");
    }

    fn strikethrough_end(&self, out: &mut String) {
        out.push_str("</del>");
    }

    fn link_start(&self, href: &str, title: &str, out: &mut String) {
        if title.is_empty() {
            write!(out, r#"<a href="{}">"#, escape_html(href)).unwrap();
        } else {
            write!(
                out,
                r#"<a href="{}" title="{}">"#,
                escape_html(href),
                escape_html(title)
            )
            .unwrap();
        }
    }

    fn link_end(&self, out: &mut String) {
        out.push_str("</a>");
    }

    fn image(&self, src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn inline_formula(&self, mathml: &str, out: &mut String) {
        out.push_str(mathml);
    }

    fn display_formula(&self, mathml: &str, out: &mut String) {
        write!(out, r#"<div class="formula">{mathml}</div>"#).unwrap();
    }

    fn footnote_reference(&self, label: &str, number: usize, out: &mut String) {
        write!(
            out,
            r##"<sup class="footnote-ref"><a href="#fn-{}">{number}</a></sup>"##,
            escape_html(label)
        )
        .unwrap();
    }

    fn footnote_definition_start(&self, label: &str, number: usize, out: &mut String) {
        write!(
            out,
            r#"<div class="footnote" id="fn-{}"><sup>{number}</sup> "#,
            escape_html(label)
        )
        .unwrap();
    }

    fn footnote_definition_end(&self, out: &mut String) {
        out.push_str("</div>");
    }
}
