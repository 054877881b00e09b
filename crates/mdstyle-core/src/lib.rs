//! Markdown to inline-styled HTML fragment conversion.
//!
//! [`MarkdownConverter`] ties the pieces together: block tokenizers rewrite
//! `$$` formulas and `:::` diagram blocks, a [`StyleSheet`] is built from the
//! theme and user overrides, and the document renders through
//! [`StyledBackend`] with formula and diagram processors registered.
//!
//! # Quick Start
//!
//! ```
//! use mdstyle_core::MarkdownConverter;
//!
//! let result = MarkdownConverter::new()
//!     .theme("github")
//!     .convert("# Hello\n\n$$\nE = mc^2\n$$\n")
//!     .unwrap();
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("<math"));
//! assert!(!result.theme_is_dark);
//! ```
//!
//! [`StyleSheet`]: mdstyle_renderer::StyleSheet
//! [`StyledBackend`]: mdstyle_renderer::StyledBackend

mod converter;

pub use converter::{ConvertError, ConvertResult, MarkdownConverter};
