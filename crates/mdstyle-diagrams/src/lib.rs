//! Diagram rendering via Kroki for inline-styled HTML fragments.
//!
//! [`DiagramProcessor`] plugs into the renderer as a
//! [`CodeBlockProcessor`](mdstyle_renderer::CodeBlockProcessor). Diagram
//! fences (` ```mermaid `, ` ```plantuml format=png `, ...) become
//! placeholders while the document renders; afterwards every diagram is
//! posted to a Kroki server in parallel and embedded in the fragment as
//! inline SVG or a PNG data URI.
//!
//! `PlantUML` sources are rendered at a configurable DPI (192 by default)
//! and their SVG dimensions scaled back so they display at the intended
//! size on high-density screens.

mod consts;
mod html_embed;
mod kroki;
mod language;
mod plantuml;
mod processor;

pub use consts::{DEFAULT_DPI, DEFAULT_TIMEOUT};
pub use html_embed::{scale_svg_dimensions, strip_google_fonts_import, strip_xml_prolog};
pub use kroki::{DiagramError, DiagramErrorKind};
pub use language::{DiagramFormat, DiagramLanguage, ExtractedDiagram};
pub use plantuml::inject_dpi;
pub use processor::{DiagramProcessor, to_extracted_diagram, to_extracted_diagrams};
