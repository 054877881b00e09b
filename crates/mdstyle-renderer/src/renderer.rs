//! Generic markdown renderer with pluggable backend.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::backend::{AlertKind, RenderBackend};
use crate::code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult, parse_fence_info};
use crate::formula::render_formula;
use crate::state::{
    CodeBlockState, FootnoteState, ImageState, TableState, TitleState, escape_html,
};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Plain text of the first H1 heading.
    pub title: Option<String>,
    /// Warnings generated during rendering (formula errors, diagram errors).
    pub warnings: Vec<String>,
}

/// Generic markdown renderer with pluggable backend.
///
/// Walks pulldown-cmark events and hands every node to the [`RenderBackend`],
/// tracking the context (tables, images, footnotes, title) a single event
/// does not carry.
///
/// # Code Block Processors
///
/// Custom code block processing can be added via [`with_processor`](Self::with_processor).
/// Processors are checked in order; the first returning a non-`PassThrough` result wins.
pub struct MarkdownRenderer<B: RenderBackend> {
    backend: B,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    title: TitleState,
    footnotes: FootnoteState,
    pending_image: Option<(String, String)>,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    pending_attrs: HashMap<String, String>,
    formula_index: usize,
    warnings: Vec<String>,
    gfm: bool,
    math: bool,
    wrap: bool,
    /// Stack of alert kinds for nested blockquotes (regular blockquote uses None).
    alert_stack: Vec<Option<AlertKind>>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a renderer with GFM and math enabled.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            title: TitleState::default(),
            footnotes: FootnoteState::default(),
            pending_image: None,
            processors: Vec::new(),
            code_block_index: 0,
            pending_attrs: HashMap::new(),
            formula_index: 0,
            warnings: Vec::new(),
            gfm: true,
            math: true,
            wrap: true,
            alert_stack: Vec::new(),
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alerts (`> [!NOTE]`)
    /// - Footnotes (`[^1]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable `$inline$` and `$$display$$` math.
    #[must_use]
    pub fn with_math(mut self, enabled: bool) -> Self {
        self.math = enabled;
        self
    }

    /// Whether the backend wraps the finished document (default: true).
    #[must_use]
    pub fn with_wrap(mut self, enabled: bool) -> Self {
        self.wrap = enabled;
        self
    }

    /// Add a code block processor.
    ///
    /// Processors are checked in order when a code block is encountered.
    /// The first processor returning a non-`PassThrough` result wins.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use mdstyle_renderer::{
    ///     CodeBlockProcessor, MarkdownRenderer, PlainBackend, ProcessResult,
    /// };
    ///
    /// struct Upper;
    ///
    /// impl CodeBlockProcessor for Upper {
    ///     fn process(
    ///         &mut self,
    ///         language: &str,
    ///         _attrs: &HashMap<String, String>,
    ///         source: &str,
    ///         _index: usize,
    ///     ) -> ProcessResult {
    ///         if language == "upper" {
    ///             ProcessResult::Inline(source.trim().to_uppercase())
    ///         } else {
    ///             ProcessResult::PassThrough
    ///         }
    ///     }
    /// }
    ///
    /// let result = MarkdownRenderer::new(PlainBackend)
    ///     .with_processor(Upper)
    ///     .render_markdown("```upper\nhello\n```");
    /// assert_eq!(result.html, "HELLO");
    /// ```
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parser options for the configured features.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
                | Options::ENABLE_FOOTNOTES;
        }
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        options
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text using the configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        self.render(self.create_parser(markdown))
    }

    /// Blocks processors replaced with placeholders.
    pub fn extracted_code_blocks(&self) -> impl Iterator<Item = ExtractedCodeBlock> + '_ {
        self.processors.iter().flat_map(|p| p.extracted()).cloned()
    }

    /// Render markdown events and return the result.
    ///
    /// Runs `post_process` on all registered processors to replace
    /// placeholders, then lets the backend wrap the document.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let mut html = std::mem::take(&mut self.output);
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }
        if self.wrap {
            html = self.backend.wrap_document(html);
        }

        let mut warnings = std::mem::take(&mut self.warnings);
        warnings.extend(self.processors.iter().flat_map(|p| p.warnings()).cloned());

        RenderResult {
            html,
            title: self.title.take_title(),
            warnings,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.backend.hard_break(&mut self.output),
            Event::Rule => self.backend.horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => {
                self.backend.task_list_marker(checked, &mut self.output);
            }
            Event::FootnoteReference(label) => {
                let number = self.footnotes.number(&label);
                self.backend
                    .footnote_reference(&label, number, &mut self.output);
            }
            Event::InlineMath(source) => self.formula(&source, false),
            Event::DisplayMath(source) => self.formula(&source, true),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        // Inline markup inside image alt text is flattened to plain text.
        if self.image.is_active() {
            return;
        }
        let out = &mut self.output;
        match tag {
            Tag::Paragraph => self.backend.paragraph_start(out),
            Tag::Heading { level, .. } => {
                let level = heading_level_to_num(level);
                self.title.start_heading(level);
                self.backend.heading_start(level, out);
            }
            Tag::BlockQuote(kind) => {
                if let Some(bq_kind) = kind {
                    let alert_kind = AlertKind::from(bq_kind);
                    self.alert_stack.push(Some(alert_kind));
                    self.backend.alert_start(alert_kind, out);
                } else {
                    self.alert_stack.push(None);
                    self.backend.blockquote_start(out);
                }
            }
            Tag::CodeBlock(kind) => {
                let (lang, attrs) = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let (lang, attrs) = parse_fence_info(info);
                        (if lang.is_empty() { None } else { Some(lang) }, attrs)
                    }
                    _ => (None, HashMap::new()),
                };
                self.pending_attrs = attrs;
                self.code.start(lang);
            }
            Tag::List(start) => self.backend.list_start(start, out),
            Tag::Item => self.backend.item_start(out),
            Tag::FootnoteDefinition(label) => {
                let number = self.footnotes.number(&label);
                self.backend.footnote_definition_start(&label, number, out);
            }
            Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => out.push_str("<dl>"),
            Tag::DefinitionListTitle => out.push_str("<dt>"),
            Tag::DefinitionListDefinition => out.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.backend.table_start(out);
            }
            Tag::TableHead => {
                self.table.start_head();
                self.backend.table_head_start(out);
            }
            Tag::TableRow => {
                self.table.start_row();
                self.backend.table_row_start(out);
            }
            Tag::TableCell => {
                let alignment = self.table.current_alignment();
                self.backend
                    .table_cell_start(self.table.is_in_head(), alignment, out);
            }
            Tag::Emphasis => self.backend.emphasis_start(out),
            Tag::Strong => self.backend.strong_start(out),
            Tag::Strikethrough => self.backend.strikethrough_start(out),
            Tag::Superscript => self.backend.superscript_start(out),
            Tag::Subscript => self.backend.subscript_start(out),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = self.backend.transform_link(&dest_url);
                self.backend.link_start(&href, &title, out);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if self.image.is_active() && tag != TagEnd::Image {
            return;
        }
        let out = &mut self.output;
        match tag {
            TagEnd::Paragraph => self.backend.paragraph_end(out),
            TagEnd::Heading(level) => {
                self.title.end_heading();
                self.backend.heading_end(heading_level_to_num(level), out);
            }
            TagEnd::BlockQuote(_) => match self.alert_stack.pop() {
                Some(Some(alert_kind)) => self.backend.alert_end(alert_kind, out),
                _ => self.backend.blockquote_end(out),
            },
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(ordered) => self.backend.list_end(ordered, out),
            TagEnd::Item => self.backend.item_end(out),
            TagEnd::FootnoteDefinition => self.backend.footnote_definition_end(out),
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => out.push_str("</dl>"),
            TagEnd::DefinitionListTitle => out.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => out.push_str("</dd>"),
            TagEnd::Table => self.backend.table_end(out),
            TagEnd::TableHead => {
                self.backend.table_head_end(out);
                self.table.end_head();
            }
            TagEnd::TableRow => self.backend.table_row_end(out),
            TagEnd::TableCell => {
                self.backend.table_cell_end(self.table.is_in_head(), out);
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.backend.emphasis_end(out),
            TagEnd::Strong => self.backend.strong_end(out),
            TagEnd::Strikethrough => self.backend.strikethrough_end(out),
            TagEnd::Superscript => self.backend.superscript_end(out),
            TagEnd::Subscript => self.backend.subscript_end(out),
            TagEnd::Link => self.backend.link_end(out),
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    self.backend.image(&src, &alt, &title, out);
                }
            }
        }
    }

    fn end_code_block(&mut self) {
        let (lang, content) = self.code.end();
        let attrs = std::mem::take(&mut self.pending_attrs);
        let index = self.code_block_index;
        self.code_block_index += 1;

        // Try processors in order, fall back to normal code block rendering
        let processed = lang.as_ref().is_some_and(|lang_str| {
            self.processors.iter_mut().any(|processor| {
                match processor.process(lang_str, &attrs, &content, index) {
                    ProcessResult::Placeholder(html) | ProcessResult::Inline(html) => {
                        self.output.push_str(&html);
                        true
                    }
                    ProcessResult::PassThrough => false,
                }
            })
        });

        if !processed {
            self.backend
                .code_block(lang.as_deref(), &content, &mut self.output);
        }
    }

    fn formula(&mut self, source: &str, display: bool) {
        self.formula_index += 1;
        if self.image.is_active() {
            self.image.push_str(source);
            return;
        }
        self.title.push_text(source);
        match render_formula(source, display) {
            Ok(mathml) if display => self.backend.display_formula(&mathml, &mut self.output),
            Ok(mathml) => self.backend.inline_formula(&mathml, &mut self.output),
            Err(e) => {
                tracing::debug!(formula = self.formula_index, error = %e, "formula rendering failed");
                self.warnings
                    .push(format!("formula {}: {e}", self.formula_index));
                self.backend
                    .formula_source(source, display, &mut self.output);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.title.push_text(text);
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            self.title.push_text(code);
            self.backend.inline_code(code, &mut self.output);
        }
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.title.push_text(" ");
            self.output.push('\n');
        }
    }
}

/// Convert a pulldown-cmark heading level to its number.
#[must_use]
pub fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::lookup_theme;
    use crate::{PlainBackend, StyledBackend};
    use pretty_assertions::assert_eq;
    use pulldown_cmark::CowStr;

    fn render_plain(markdown: &str) -> RenderResult {
        MarkdownRenderer::new(PlainBackend).render_markdown(markdown)
    }

    fn render_styled(markdown: &str) -> RenderResult {
        let backend = StyledBackend::from_theme(&lookup_theme("github").unwrap());
        MarkdownRenderer::new(backend).render_markdown(markdown)
    }

    struct Placeholders {
        seen: Vec<ExtractedCodeBlock>,
    }

    impl CodeBlockProcessor for Placeholders {
        fn process(
            &mut self,
            language: &str,
            attrs: &HashMap<String, String>,
            source: &str,
            index: usize,
        ) -> ProcessResult {
            if language != "deferred" {
                return ProcessResult::PassThrough;
            }
            self.seen.push(ExtractedCodeBlock {
                index,
                language: language.to_owned(),
                source: source.to_owned(),
                attrs: attrs.clone(),
            });
            ProcessResult::Placeholder(format!("{{{{DEFERRED_{index}}}}}"))
        }

        fn post_process(&mut self, html: &mut String) {
            for block in &self.seen {
                let placeholder = format!("{{{{DEFERRED_{}}}}}", block.index);
                *html = html.replace(&placeholder, &format!("<div>{}</div>", block.source.trim()));
            }
        }

        fn extracted(&self) -> &[ExtractedCodeBlock] {
            &self.seen
        }
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render_plain("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let result = render_plain("a < b & c");
        assert_eq!(result.html, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_title_from_first_h1() {
        let result = render_plain("## Intro\n\n# The `main` Title\n\n# Other");
        assert_eq!(result.title, Some("The main Title".to_owned()));
        assert!(result.html.contains("<h1>The <code>main</code> Title</h1>"));
    }

    #[test]
    fn test_no_title_without_h1() {
        assert_eq!(render_plain("## Only h2").title, None);
    }

    #[test]
    fn test_table_alignment() {
        let result = render_plain("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            result.html,
            concat!(
                "<table><thead><tr>",
                r#"<th style="text-align: left;">a</th><th style="text-align: right;">b</th>"#,
                "</tr></thead><tbody><tr>",
                r#"<td style="text-align: left;">1</td><td style="text-align: right;">2</td>"#,
                "</tr></tbody></table>"
            )
        );
    }

    #[test]
    fn test_gfm_disabled_leaves_table_as_text() {
        let result = MarkdownRenderer::new(PlainBackend)
            .with_gfm(false)
            .render_markdown("| a |\n|---|\n| 1 |");
        assert!(!result.html.contains("<table>"));
    }

    #[test]
    fn test_ordered_list_start() {
        let result = render_plain("3. three\n4. four");
        assert_eq!(result.html, r#"<ol start="3"><li>three</li><li>four</li></ol>"#);
    }

    #[test]
    fn test_nested_lists() {
        let result = render_plain("- a\n  1. b\n- c");
        assert_eq!(
            result.html,
            "<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>"
        );
    }

    #[test]
    fn test_link_and_emphasis() {
        let result = render_plain("*see* [docs](https://example.com \"Docs\")");
        assert_eq!(
            result.html,
            r#"<p><em>see</em> <a href="https://example.com" title="Docs">docs</a></p>"#
        );
    }

    #[test]
    fn test_image_alt_text_is_flattened() {
        let result = render_plain("![a **bold** cat](cat.png)");
        assert_eq!(result.html, r#"<p><img src="cat.png" alt="a bold cat"></p>"#);
    }

    #[test]
    fn test_alert() {
        let result = render_plain("> [!NOTE]\n> This is a **note**.");
        assert!(result.html.contains("alert-note"));
        assert!(result.html.contains("<strong>note</strong>"));
    }

    #[test]
    fn test_inline_math() {
        let result = render_plain("Energy $E = mc^2$ here.");
        assert!(result.html.contains("<math"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_math_disabled_keeps_dollars() {
        let result = MarkdownRenderer::new(PlainBackend)
            .with_math(false)
            .render_markdown("Cost $x$ here.");
        assert_eq!(result.html, "<p>Cost $x$ here.</p>");
    }

    #[test]
    fn test_formula_failure_falls_back_to_source() {
        let events = vec![
            Event::Start(Tag::Paragraph),
            Event::InlineMath(CowStr::from("  ")),
            Event::End(TagEnd::Paragraph),
        ];
        let result = MarkdownRenderer::new(PlainBackend).render(events.into_iter());
        assert_eq!(result.html, "<p>$  $</p>");
        assert_eq!(result.warnings, ["formula 1: empty formula"]);
    }

    #[test]
    fn test_footnotes_numbered_in_order() {
        let result = render_plain("One[^b] two[^a].\n\n[^b]: First.\n\n[^a]: Second.");
        assert!(result.html.contains(r##"<a href="#fn-b">1</a>"##));
        assert!(result.html.contains(r##"<a href="#fn-a">2</a>"##));
        assert!(result.html.contains(r#"<div class="footnote" id="fn-b"><sup>1</sup> "#));
    }

    #[test]
    fn test_task_list() {
        let result = render_styled("- [x] done\n- [ ] todo");
        assert!(result.html.contains("☑ done"));
        assert!(result.html.contains("☐ todo"));
        assert!(!result.html.contains("<input"));
    }

    #[test]
    fn test_code_block_passes_through_to_backend() {
        let result = render_plain("```rust\nfn main() {}\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_processor_placeholder_replaced() {
        let mut renderer = MarkdownRenderer::new(PlainBackend)
            .with_processor(Placeholders { seen: Vec::new() });
        let result = renderer.render_markdown("```deferred\nsource\n```\n\n```rust\nx\n```");
        assert!(result.html.starts_with("<div>source</div>"));
        assert!(result.html.contains("language-rust"));
        let extracted: Vec<_> = renderer.extracted_code_blocks().collect();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].index, 0);
    }

    #[test]
    fn test_processor_receives_fence_attrs() {
        let mut renderer = MarkdownRenderer::new(PlainBackend)
            .with_processor(Placeholders { seen: Vec::new() });
        let _ = renderer.render_markdown("```deferred format=png\nx\n```");
        let extracted: Vec<_> = renderer.extracted_code_blocks().collect();
        assert_eq!(extracted[0].attrs.get("format"), Some(&"png".to_owned()));
    }

    #[test]
    fn test_styled_document_is_wrapped() {
        let result = render_styled("# Hi\n\ntext");
        assert!(result.html.starts_with("<section style=\""));
        assert!(result.html.ends_with("</section>"));
        assert!(result.html.contains("<h1 style=\""));
        assert_eq!(result.title, Some("Hi".to_owned()));
    }

    #[test]
    fn test_wrap_disabled() {
        let backend = StyledBackend::from_theme(&lookup_theme("github").unwrap());
        let result = MarkdownRenderer::new(backend)
            .with_wrap(false)
            .render_markdown("text");
        assert!(result.html.starts_with("<p style=\""));
    }

    #[test]
    fn test_styled_code_block_is_highlighted() {
        let result = render_styled("```rust\nlet x = 1;\n```");
        assert!(result.html.contains("<pre style=\""));
        assert!(result.html.contains("<span style=\"color:#"));
    }
}
