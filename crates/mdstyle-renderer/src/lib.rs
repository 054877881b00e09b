//! Markdown renderer producing inline-styled HTML fragments.
//!
//! Every element of the output carries its presentation in a `style`
//! attribute, so fragments survive editors that strip `<style>` blocks and
//! class names.
//!
//! # Architecture
//!
//! - [`MarkdownRenderer`] walks pulldown-cmark events and calls one
//!   [`RenderBackend`] method per node kind.
//! - [`StyledBackend`] renders each node with the inline style a
//!   [`StyleSheet`] assigns to its [`Element`]; [`PlainBackend`] emits bare
//!   semantic HTML.
//! - [`BlockPreprocessor`] rewrites custom block syntax (`$$` formulas,
//!   `::: mermaid` diagrams) into fenced code that [`CodeBlockProcessor`]s
//!   consume.
//! - Themes are syntect themes; [`Palette`] extracts the colors the style
//!   sheet and the [`Highlighter`] use.
//!
//! # Example
//!
//! ```
//! use mdstyle_renderer::{MarkdownRenderer, StyledBackend, lookup_theme};
//!
//! let theme = lookup_theme("github").unwrap();
//! let result = MarkdownRenderer::new(StyledBackend::from_theme(&theme))
//!     .render_markdown("# Hello\n\n**Bold** text");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("<strong style="));
//! ```

mod backend;
mod code_block;
mod formula;
mod highlight;
mod html;
mod renderer;
mod state;
mod style;
mod styled;
mod stylesheet;
mod theme;
mod tokenizer;

pub use backend::{AlertKind, RenderBackend};
pub use code_block::{CodeBlockProcessor, ExtractedCodeBlock, ProcessResult, parse_fence_info};
pub use formula::{FORMULA_LANGUAGES, FormulaError, FormulaProcessor, render_formula};
pub use highlight::Highlighter;
pub use html::PlainBackend;
pub use renderer::{MarkdownRenderer, RenderResult, heading_level_to_num};
pub use state::{alignment_css, escape_html};
pub use style::{Style, to_css, to_kebab_case};
pub use styled::StyledBackend;
pub use stylesheet::{Element, StyleSheet, StyleSheetError};
pub use theme::{Color, DEFAULT_THEME, Palette, Theme, ThemeError, ThemeRegistry, lookup_theme};
pub use tokenizer::{
    BlockEnd, BlockPreprocessor, BlockStart, BlockToken, BlockTokenizer, DIAGRAM_BLOCK_LANGUAGES,
    DiagramBlockTokenizer, FormulaBlockTokenizer,
};
