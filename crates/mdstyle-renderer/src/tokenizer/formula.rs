//! `$$ ... $$` display formula blocks.

use std::sync::LazyLock;

use regex::Regex;

use super::{BlockEnd, BlockStart, BlockTokenizer};

static OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$\$(.*?)(\$\$)?\s*$").unwrap());
static CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)\$\$\s*$").unwrap());

/// Recognizes display formula blocks delimited by `$$`.
///
/// Both `$$ x^2 $$` on one line and multi-line blocks are accepted; content
/// may share a line with either delimiter. Blocks are emitted as `math`.
///
/// An opening line carrying more than one pair of delimiters (`$$a$$ and
/// $$b$$`) is prose with inline display math and is left to the parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormulaBlockTokenizer;

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

impl BlockTokenizer for FormulaBlockTokenizer {
    fn name(&self) -> &'static str {
        "formula"
    }

    fn start(&self, line: &str) -> Option<BlockStart> {
        let caps = OPEN.captures(line)?;
        if caps[1].contains("$$") {
            return None;
        }
        Some(BlockStart {
            language: "math".to_owned(),
            first_line: non_empty(&caps[1]),
            closed: caps.get(2).is_some(),
            verbatim: false,
        })
    }

    fn end(&self, _start: &BlockStart, line: &str) -> Option<BlockEnd> {
        let caps = CLOSE.captures(line)?;
        Some(BlockEnd {
            last_line: non_empty(&caps[1]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_line() {
        let start = FormulaBlockTokenizer.start("$$").unwrap();
        assert_eq!(start.language, "math");
        assert_eq!(start.first_line, None);
        assert!(!start.closed);
    }

    #[test]
    fn test_single_line_block() {
        let start = FormulaBlockTokenizer.start("  $$ \\sum_i x_i $$  ").unwrap();
        assert_eq!(start.first_line.as_deref(), Some("\\sum_i x_i"));
        assert!(start.closed);
    }

    #[test]
    fn test_content_on_opening_line() {
        let start = FormulaBlockTokenizer.start("$$ a + b").unwrap();
        assert_eq!(start.first_line.as_deref(), Some("a + b"));
        assert!(!start.closed);
    }

    #[test]
    fn test_non_formula_lines() {
        assert!(FormulaBlockTokenizer.start("cost: $$5").is_none());
        assert!(FormulaBlockTokenizer.start("$x$").is_none());
    }

    #[test]
    fn test_several_formulas_on_one_line_are_not_a_block() {
        assert!(FormulaBlockTokenizer.start("$$a$$ and $$b$$").is_none());
        assert!(FormulaBlockTokenizer.start("$$a$$ then more").is_none());
    }

    #[test]
    fn test_closing_line() {
        let start = FormulaBlockTokenizer.start("$$").unwrap();
        let end = FormulaBlockTokenizer.end(&start, "c $$").unwrap();
        assert_eq!(end.last_line.as_deref(), Some("c"));
        assert_eq!(
            FormulaBlockTokenizer.end(&start, "$$"),
            Some(BlockEnd { last_line: None })
        );
        assert!(FormulaBlockTokenizer.end(&start, "x + y").is_none());
    }
}
