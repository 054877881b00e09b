//! Code block processor trait for extensible code block handling.
//!
//! Fenced blocks whose language a processor claims (formulas, diagrams) are
//! taken out of the normal highlighted-code path. Processors are checked in
//! registration order; the first result other than
//! [`ProcessResult::PassThrough`] wins.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use mdstyle_renderer::{CodeBlockProcessor, ProcessResult};
//!
//! struct Shout;
//!
//! impl CodeBlockProcessor for Shout {
//!     fn process(
//!         &mut self,
//!         language: &str,
//!         _attrs: &HashMap<String, String>,
//!         source: &str,
//!         _index: usize,
//!     ) -> ProcessResult {
//!         if language == "shout" {
//!             ProcessResult::Inline(format!("<p>{}</p>", source.to_uppercase()))
//!         } else {
//!             ProcessResult::PassThrough
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the block with a placeholder, resolved in
    /// [`CodeBlockProcessor::post_process`].
    ///
    /// Use when the work is batched or needs external resources (HTTP).
    Placeholder(String),

    /// Replace the block with HTML immediately.
    Inline(String),

    /// Render as a regular highlighted code block.
    PassThrough,
}

/// Code block taken for deferred processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedCodeBlock {
    /// Zero-based index of this code block in the document.
    pub index: usize,
    /// Language identifier from the fence.
    pub language: String,
    /// Raw source content of the code block.
    pub source: String,
    /// Attributes parsed from the fence (`format=png` → {"format": "png"}).
    pub attrs: HashMap<String, String>,
}

/// Trait for processing special code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block.
    ///
    /// * `language` - Language identifier from fence info string
    /// * `attrs` - Attributes parsed from fence (key=value pairs)
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based index of the block in the document
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult;

    /// Replace placeholders in the rendered HTML.
    ///
    /// Called once per render, before the document is wrapped.
    fn post_process(&mut self, _html: &mut String) {}

    /// Blocks returned as placeholders.
    fn extracted(&self) -> &[ExtractedCodeBlock] {
        &[]
    }

    /// Warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}
