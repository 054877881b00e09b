//! Code block processor for diagram languages.
//!
//! [`DiagramProcessor`] takes diagram fences out of the document as
//! `{{DIAGRAM_N}}` placeholders, renders them all at once through Kroki in
//! [`post_process`](CodeBlockProcessor::post_process), and swaps each
//! placeholder for a styled `<figure>`.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

use mdstyle_renderer::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult, Style, escape_html};
use ureq::Agent;

use crate::consts::{DEFAULT_DPI, DEFAULT_TIMEOUT, ERROR_FIGURE_STYLE};
use crate::html_embed::{
    Replacements, scale_svg_dimensions, strip_google_fonts_import, strip_xml_prolog,
};
use crate::kroki::{DiagramRequest, create_agent, render_all};
use crate::language::{DiagramFormat, DiagramLanguage, ExtractedDiagram};
use crate::plantuml::inject_dpi;

/// Settings shared by every render call.
struct ProcessorConfig {
    kroki_url: String,
    dpi: u32,
    figure_style: Style,
    /// Reused across render calls for connection pooling.
    agent: Agent,
}

/// Code block processor for diagram languages.
///
/// # Example
///
/// ```no_run
/// use mdstyle_diagrams::DiagramProcessor;
/// use mdstyle_renderer::{MarkdownRenderer, PlainBackend, Style};
///
/// let processor = DiagramProcessor::new("https://kroki.io")
///     .dpi(96)
///     .figure_style(Style::new().with("textAlign", "center"));
///
/// let result = MarkdownRenderer::new(PlainBackend)
///     .with_processor(processor)
///     .render_markdown("```mermaid\ngraph TD; A-->B\n```");
/// assert!(result.html.contains("<figure"));
/// ```
pub struct DiagramProcessor {
    config: ProcessorConfig,
    extracted: Vec<ExtractedCodeBlock>,
    warnings: Vec<String>,
}

impl DiagramProcessor {
    /// Create a processor rendering through the given Kroki server.
    #[must_use]
    pub fn new(kroki_url: impl Into<String>) -> Self {
        Self {
            config: ProcessorConfig {
                kroki_url: kroki_url.into(),
                dpi: DEFAULT_DPI,
                figure_style: Style::new(),
                agent: create_agent(DEFAULT_TIMEOUT),
            },
            extracted: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Set DPI for `PlantUML` rendering (default: 192).
    ///
    /// SVG dimensions are scaled back to 96 DPI, so higher values sharpen
    /// the diagram without changing its displayed size.
    #[must_use]
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    /// Set HTTP timeout for Kroki requests (default: 30 seconds).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.agent = create_agent(timeout);
        self
    }

    /// Set the inline style of the `<figure>` around each diagram.
    #[must_use]
    pub fn figure_style(mut self, style: Style) -> Self {
        self.config.figure_style = style;
        self
    }

    fn request(config: &ProcessorConfig, diagram: &ExtractedDiagram) -> DiagramRequest {
        let source = if diagram.language.is_plantuml() {
            inject_dpi(&diagram.source, config.dpi)
        } else {
            diagram.source.clone()
        };
        DiagramRequest {
            index: diagram.index,
            source,
            language: diagram.language,
            format: diagram.format,
        }
    }

    fn figure(config: &ProcessorConfig, diagram: &ExtractedDiagram, body: &str) -> String {
        let mut out = String::new();
        let css = config.figure_style.to_css();
        if css.is_empty() {
            out.push_str("<figure>");
        } else {
            write!(out, r#"<figure style="{css}">"#).unwrap();
        }

        match diagram.format {
            DiagramFormat::Svg => {
                let svg = strip_google_fonts_import(strip_xml_prolog(body.trim()));
                if diagram.language.is_plantuml() {
                    out.push_str(&scale_svg_dimensions(&svg, config.dpi));
                } else {
                    out.push_str(&svg);
                }
            }
            DiagramFormat::Png => {
                write!(
                    out,
                    r#"<img src="{body}" alt="diagram" style="max-width: 100%;">"#
                )
                .unwrap();
            }
        }

        out.push_str("</figure>");
        out
    }

    fn error_figure(message: &str) -> String {
        format!(
            r#"<figure style="{ERROR_FIGURE_STYLE}">Diagram rendering failed: {}</figure>"#,
            escape_html(message)
        )
    }
}

impl CodeBlockProcessor for DiagramProcessor {
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        let Some(diagram_language) = DiagramLanguage::parse(language) else {
            return ProcessResult::PassThrough;
        };

        let format = attrs.get("format").map_or(DiagramFormat::default(), |value| {
            DiagramFormat::parse(value).unwrap_or_else(|| {
                self.warnings.push(format!(
                    "diagram {index}: unknown format value '{value}', using default 'svg' (valid: svg, png)"
                ));
                DiagramFormat::default()
            })
        });

        let mut unknown: Vec<_> = attrs.keys().filter(|k| *k != "format").collect();
        unknown.sort();
        for key in unknown {
            self.warnings.push(format!(
                "diagram {index}: unknown attribute '{key}' ignored (valid: format)"
            ));
        }

        let mut stored_attrs = HashMap::with_capacity(2);
        stored_attrs.insert("format".to_owned(), format.as_str().to_owned());
        stored_attrs.insert(
            "endpoint".to_owned(),
            diagram_language.kroki_endpoint().to_owned(),
        );

        self.extracted.push(ExtractedCodeBlock {
            index,
            language: language.to_owned(),
            source: source.to_owned(),
            attrs: stored_attrs,
        });

        ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
    }

    fn post_process(&mut self, html: &mut String) {
        let diagrams = to_extracted_diagrams(&self.extracted);
        if diagrams.is_empty() {
            return;
        }

        let config = &self.config;
        let requests: Vec<_> = diagrams
            .iter()
            .map(|diagram| Self::request(config, diagram))
            .collect();

        tracing::debug!(count = requests.len(), url = %config.kroki_url, "rendering diagrams");
        let result = render_all(&requests, &config.kroki_url, &config.agent);

        let by_index: HashMap<usize, &ExtractedDiagram> =
            diagrams.iter().map(|d| (d.index, d)).collect();
        let mut replacements = Replacements::with_capacity(diagrams.len());

        for rendered in result.rendered {
            if let Some(diagram) = by_index.get(&rendered.index) {
                replacements.add(rendered.index, Self::figure(config, diagram, &rendered.body));
            }
        }

        let mut errors = result.errors;
        errors.sort_by_key(|e| e.index);
        for error in errors {
            tracing::warn!(diagram = error.index, error = %error.kind, "diagram rendering failed");
            replacements.add(error.index, Self::error_figure(&error.kind.to_string()));
            self.warnings.push(error.to_string());
        }

        replacements.apply(html);
    }

    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &self.extracted
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Convert an extracted code block to a diagram.
///
/// Returns `None` for languages that are not diagrams.
#[must_use]
pub fn to_extracted_diagram(block: &ExtractedCodeBlock) -> Option<ExtractedDiagram> {
    let language = DiagramLanguage::parse(&block.language)?;
    let format = block
        .attrs
        .get("format")
        .and_then(|f| DiagramFormat::parse(f))
        .unwrap_or_default();

    Some(ExtractedDiagram {
        source: block.source.clone(),
        index: block.index,
        language,
        format,
    })
}

/// Convert extracted code blocks to diagrams, skipping other languages.
#[must_use]
pub fn to_extracted_diagrams(blocks: &[ExtractedCodeBlock]) -> Vec<ExtractedDiagram> {
    blocks.iter().filter_map(to_extracted_diagram).collect()
}
