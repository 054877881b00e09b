//! `::: mermaid` container blocks and bare PlantUML blocks.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockEnd, BlockStart, BlockTokenizer};

/// Languages accepted after `:::`.
pub const DIAGRAM_BLOCK_LANGUAGES: [&str; 12] = [
    "mermaid",
    "plantuml",
    "c4plantuml",
    "graphviz",
    "dot",
    "ditaa",
    "blockdiag",
    "seqdiag",
    "erd",
    "nomnoml",
    "svgbob",
    "wavedrom",
];

static OPEN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^\s*:::\s*({})\s*$",
        DIAGRAM_BLOCK_LANGUAGES.join("|")
    );
    Regex::new(&pattern).unwrap()
});
static CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*:::\s*$").unwrap());
static UML_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@startuml\b").unwrap());
static UML_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*@enduml\b").unwrap());

/// Recognizes diagram blocks.
///
/// `::: <language>` ... `:::` blocks are emitted with the named language;
/// `@startuml` ... `@enduml` blocks are kept whole and emitted as `plantuml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagramBlockTokenizer;

impl BlockTokenizer for DiagramBlockTokenizer {
    fn name(&self) -> &'static str {
        "diagram"
    }

    fn start(&self, line: &str) -> Option<BlockStart> {
        if let Some(caps) = OPEN.captures(line) {
            return Some(BlockStart {
                language: caps[1].to_owned(),
                first_line: None,
                closed: false,
                verbatim: false,
            });
        }
        UML_OPEN.is_match(line).then(|| BlockStart {
            language: "plantuml".to_owned(),
            first_line: Some(line.trim().to_owned()),
            closed: false,
            verbatim: true,
        })
    }

    fn end(&self, start: &BlockStart, line: &str) -> Option<BlockEnd> {
        if start.verbatim {
            UML_CLOSE.is_match(line).then(|| BlockEnd {
                last_line: Some(line.trim().to_owned()),
            })
        } else {
            CLOSE.is_match(line).then_some(BlockEnd { last_line: None })
        }
    }
}
