//! Diagram languages and output formats.

/// Diagram languages rendered through Kroki.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLanguage {
    PlantUml,
    C4PlantUml,
    Mermaid,
    GraphViz,
    Ditaa,
    BlockDiag,
    SeqDiag,
    Erd,
    Nomnoml,
    Svgbob,
    WaveDrom,
}

impl DiagramLanguage {
    /// Parse a fence language.
    ///
    /// Accepts both `mermaid` and the `kroki-mermaid` spelling used by the
    /// `MkDocs` Kroki plugin.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.strip_prefix("kroki-").unwrap_or(s);

        match lang {
            "plantuml" => Some(Self::PlantUml),
            "c4plantuml" => Some(Self::C4PlantUml),
            "mermaid" => Some(Self::Mermaid),
            "graphviz" | "dot" => Some(Self::GraphViz),
            "ditaa" => Some(Self::Ditaa),
            "blockdiag" => Some(Self::BlockDiag),
            "seqdiag" => Some(Self::SeqDiag),
            "erd" => Some(Self::Erd),
            "nomnoml" => Some(Self::Nomnoml),
            "svgbob" => Some(Self::Svgbob),
            "wavedrom" => Some(Self::WaveDrom),
            _ => None,
        }
    }

    /// Kroki endpoint name.
    #[must_use]
    pub fn kroki_endpoint(self) -> &'static str {
        match self {
            Self::PlantUml => "plantuml",
            Self::C4PlantUml => "c4plantuml",
            Self::Mermaid => "mermaid",
            Self::GraphViz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::BlockDiag => "blockdiag",
            Self::SeqDiag => "seqdiag",
            Self::Erd => "erd",
            Self::Nomnoml => "nomnoml",
            Self::Svgbob => "svgbob",
            Self::WaveDrom => "wavedrom",
        }
    }

    /// Whether the source takes a `skinparam dpi` directive.
    ///
    /// Only these diagrams are rendered at the configured DPI, so only their
    /// SVG dimensions are scaled back down.
    #[must_use]
    pub fn is_plantuml(self) -> bool {
        matches!(self, Self::PlantUml | Self::C4PlantUml)
    }
}

/// Output format for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    /// Inline SVG.
    #[default]
    Svg,
    /// PNG embedded as a base64 data URI.
    Png,
}

impl DiagramFormat {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Diagram taken out of the document for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDiagram {
    /// Original source code from markdown.
    pub source: String,
    /// Code block index, matching the `{{DIAGRAM_N}}` placeholder.
    pub index: usize,
    pub language: DiagramLanguage,
    pub format: DiagramFormat,
}
