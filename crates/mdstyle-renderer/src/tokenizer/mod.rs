//! Block tokenizer extensions.
//!
//! pulldown-cmark has no hook for custom block syntax, so extensions run as
//! a line-oriented pass before parsing. Each recognized block is rewritten
//! into a fenced code block whose info string names the token type; the
//! matching [`CodeBlockProcessor`](crate::CodeBlockProcessor) renders it.
//!
//! # Example
//!
//! ```
//! use mdstyle_renderer::{BlockPreprocessor, FormulaBlockTokenizer};
//!
//! let mut pre = BlockPreprocessor::new().with_tokenizer(FormulaBlockTokenizer);
//! let output = pre.process("$$\nE = mc^2\n$$\n");
//!
//! assert_eq!(output, "```math\nE = mc^2\n```\n");
//! assert_eq!(pre.tokens()[0].language, "math");
//! ```

mod diagram;
mod fence;
mod formula;

pub use diagram::{DIAGRAM_BLOCK_LANGUAGES, DiagramBlockTokenizer};
pub use formula::FormulaBlockTokenizer;

use fence::{FenceTracker, fence_for, is_indented_code};

/// Opening delimiter recognized by a tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStart {
    /// Info string of the emitted fence.
    pub language: String,
    /// Content carried on the opening line.
    pub first_line: Option<String>,
    /// Whether the opening line also closes the block.
    pub closed: bool,
    /// Whether delimiters are part of the content (`@startuml`).
    pub verbatim: bool,
}

/// Closing delimiter recognized by a tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockEnd {
    /// Content carried on the closing line.
    pub last_line: Option<String>,
}

/// Recognized block, as emitted into the rewritten document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockToken {
    pub language: String,
    pub content: String,
    /// Line of the opening delimiter (1-indexed).
    pub line: usize,
}

/// Detector for one kind of custom block.
pub trait BlockTokenizer {
    /// Name used in warnings.
    fn name(&self) -> &'static str;

    /// Recognize an opening line.
    fn start(&self, line: &str) -> Option<BlockStart>;

    /// Recognize the closing line of a block opened by `start`.
    fn end(&self, start: &BlockStart, line: &str) -> Option<BlockEnd>;
}

/// Block currently being collected.
struct OpenBlock {
    tokenizer: usize,
    start: BlockStart,
    /// Line of the opening delimiter (1-indexed).
    line: usize,
    indent: String,
    lines: Vec<String>,
}

/// Line preprocessor running registered tokenizers.
///
/// Tokenizers are tried in registration order; the first match wins.
/// Lines inside fenced code or indented as code are copied verbatim.
#[derive(Default)]
pub struct BlockPreprocessor {
    tokenizers: Vec<Box<dyn BlockTokenizer>>,
    tokens: Vec<BlockToken>,
    warnings: Vec<String>,
}

impl BlockPreprocessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tokenizer.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: impl BlockTokenizer + 'static) -> Self {
        self.tokenizers.push(Box::new(tokenizer));
        self
    }

    /// Whether any tokenizer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }

    /// Rewrite recognized blocks into fenced code blocks.
    ///
    /// An unterminated block is reported as a warning and its opening line
    /// is kept unchanged; the lines after it are scanned again, so later
    /// blocks are still recognized.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let lines: Vec<&str> = input.split_inclusive('\n').collect();
        let mut output = String::with_capacity(input.len());
        let mut fence = FenceTracker::default();
        let mut open: Option<OpenBlock> = None;
        let mut next = 0;

        loop {
            let Some(&raw) = lines.get(next) else {
                let Some(block) = open.take() else {
                    break;
                };
                let name = self.tokenizers[block.tokenizer].name();
                self.warnings
                    .push(format!("line {}: unclosed {name} block", block.line));
                // Fence state is untouched while a block is open.
                output.push_str(lines[block.line - 1]);
                next = block.line;
                continue;
            };
            next += 1;
            let line_num = next;
            let line = raw.trim_end_matches(['\n', '\r']);
            let ending = &raw[line.len()..];

            if let Some(mut block) = open.take() {
                let tokenizer = &self.tokenizers[block.tokenizer];
                match tokenizer.end(&block.start, line) {
                    Some(end) => {
                        block.lines.extend(end.last_line);
                        self.emit(block, ending, &mut output);
                    }
                    None => {
                        block.lines.push(line.to_owned());
                        open = Some(block);
                    }
                }
                continue;
            }

            if fence.update(line) || fence.in_fence() || is_indented_code(line) {
                output.push_str(raw);
                continue;
            }

            let started = self
                .tokenizers
                .iter()
                .enumerate()
                .find_map(|(i, t)| t.start(line).map(|start| (i, start)));

            match started {
                Some((tokenizer, start)) => {
                    let indent = line[..line.len() - line.trim_start().len()].to_owned();
                    let closed = start.closed;
                    let block = OpenBlock {
                        tokenizer,
                        lines: start.first_line.iter().cloned().collect(),
                        start,
                        line: line_num,
                        indent,
                    };
                    if closed {
                        self.emit(block, ending, &mut output);
                    } else {
                        open = Some(block);
                    }
                }
                None => output.push_str(raw),
            }
        }

        output
    }

    fn emit(&mut self, block: OpenBlock, ending: &str, output: &mut String) {
        let content = block.lines.join("\n");
        let fence = fence_for(&content);
        let indent = &block.indent;

        output.push_str(indent);
        output.push_str(&fence);
        output.push_str(&block.start.language);
        output.push('\n');
        if !content.is_empty() {
            output.push_str(&content);
            output.push('\n');
        }
        output.push_str(indent);
        output.push_str(&fence);
        output.push_str(ending);

        self.tokens.push(BlockToken {
            language: block.start.language,
            content,
            line: block.line,
        });
    }

    /// Blocks recognized by the last calls to [`process`](Self::process).
    #[must_use]
    pub fn tokens(&self) -> &[BlockToken] {
        &self.tokens
    }

    /// Warnings generated during processing.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the preprocessor and return its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}
