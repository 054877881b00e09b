//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default DPI for diagram rendering (192 = 2x for retina displays).
pub const DEFAULT_DPI: u32 = 192;

/// Standard display DPI (96 = CSS reference pixel).
pub const STANDARD_DPI: u32 = 96;

/// Default HTTP timeout for Kroki requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inline style of the figure shown when a diagram fails to render.
pub const ERROR_FIGURE_STYLE: &str = "margin: 1em 0; padding: 0.8em 1em; border-left: 4px solid #d1242f; background: #fff5f5; color: #d1242f; font-size: 13px; white-space: pre-wrap; text-align: left;";
