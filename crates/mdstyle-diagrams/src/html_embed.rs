//! SVG post-processing and placeholder replacement.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::consts::STANDARD_DPI;

static GOOGLE_FONTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@import\s+url\([^)]*fonts\.googleapis\.com[^)]*\)\s*;?").unwrap()
});

static SVG_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*\s)width="(\d+)(?:px)?""#).unwrap());

static SVG_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*\s)height="(\d+)(?:px)?""#).unwrap());

/// Opening tag of the root `<svg>` element.
static SVG_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").unwrap());

/// `width:136px` inside the root `style` attribute, not `stroke-width` or `max-width`.
static STYLE_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:^|[^-\w])width:\s*)(\d+)(px)").unwrap());

static STYLE_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:^|[^-\w])height:\s*)(\d+)(px)").unwrap());

/// XML prolog and doctype, which are invalid inside an HTML fragment.
static PROLOG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*(<\?xml[^>]*\?>\s*)?(<!DOCTYPE[^>]*>\s*)?").unwrap());

/// Scale SVG width and height from the rendering DPI back to 96 DPI.
///
/// Only the root `<svg>` tag is rewritten: both its attributes
/// (`width="136"`) and its inline style properties (`width:136px`). Inner
/// elements keep their sizes since the `viewBox` already maps them. At 192
/// DPI dimensions are halved; at 96 DPI the SVG is returned unchanged.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn scale_svg_dimensions(svg: &str, dpi: u32) -> String {
    if dpi == STANDARD_DPI || dpi == 0 {
        return svg.to_owned();
    }
    let Some(root) = SVG_ROOT_RE.find(svg) else {
        return svg.to_owned();
    };

    let scale = f64::from(STANDARD_DPI) / f64::from(dpi);
    let scale_dim = |caps: &regex::Captures| {
        let value: f64 = caps[2].parse().unwrap_or(0.0);
        (value * scale).round() as u32
    };

    let result = SVG_WIDTH_RE.replace(root.as_str(), |caps: &regex::Captures| {
        format!(r#"{}width="{}""#, &caps[1], scale_dim(caps))
    });
    let result = SVG_HEIGHT_RE.replace(&result, |caps: &regex::Captures| {
        format!(r#"{}height="{}""#, &caps[1], scale_dim(caps))
    });
    let result = STYLE_WIDTH_RE.replace_all(&result, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], scale_dim(caps), &caps[3])
    });
    let result = STYLE_HEIGHT_RE.replace_all(&result, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], scale_dim(caps), &caps[3])
    });

    let mut scaled = String::with_capacity(svg.len());
    scaled.push_str(&svg[..root.start()]);
    scaled.push_str(&result);
    scaled.push_str(&svg[root.end()..]);
    scaled
}

/// Strip Google Fonts `@import` rules so the fragment makes no external requests.
#[must_use]
pub fn strip_google_fonts_import(svg: &str) -> String {
    GOOGLE_FONTS_RE.replace_all(svg, "").into_owned()
}

/// Strip the XML prolog and doctype Kroki prepends to some SVGs.
#[must_use]
pub fn strip_xml_prolog(svg: &str) -> &str {
    PROLOG_RE
        .find(svg)
        .map_or(svg, |m| &svg[m.end()..])
}

/// Collects diagram replacements for single-pass application.
pub(crate) struct Replacements {
    map: HashMap<usize, String>,
}

impl Replacements {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn add(&mut self, index: usize, content: String) {
        self.map.insert(index, content);
    }

    /// Replace every `{{DIAGRAM_N}}` placeholder in one scan.
    ///
    /// Placeholders without a replacement are kept as they are.
    pub(crate) fn apply(self, html: &mut String) {
        const PREFIX: &str = "{{DIAGRAM_";

        if self.map.is_empty() {
            return;
        }

        let mut result = String::with_capacity(html.len());
        let mut remaining = html.as_str();

        while let Some(start) = remaining.find(PREFIX) {
            result.push_str(&remaining[..start]);
            let after_prefix = &remaining[start + PREFIX.len()..];

            let Some(end_pos) = after_prefix.find("}}") else {
                result.push_str(&remaining[start..]);
                remaining = "";
                break;
            };

            let placeholder = &remaining[start..start + PREFIX.len() + end_pos + 2];
            let replacement = after_prefix[..end_pos]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.map.get(&index));
            result.push_str(replacement.map_or(placeholder, String::as_str));
            remaining = &after_prefix[end_pos + 2..];
        }

        result.push_str(remaining);
        *html = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scale_svg_dimensions_at_192_dpi() {
        let svg = r#"<svg width="400" height="200" viewBox="0 0 400 200"></svg>"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg width="200" height="100" viewBox="0 0 400 200"></svg>"#
        );
    }

    #[test]
    fn test_scale_svg_dimensions_at_96_dpi() {
        let svg = r#"<svg width="400" height="200"></svg>"#;
        assert_eq!(scale_svg_dimensions(svg, 96), svg);
    }

    #[test]
    fn test_scale_svg_dimensions_with_px_suffix() {
        let svg = r#"<svg width="400px" height="200px"></svg>"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg width="200" height="100"></svg>"#
        );
    }

    #[test]
    fn test_scale_svg_dimensions_with_style_attribute() {
        let svg = r#"<svg width="136" height="210" style="width:136px;height:210px;background:#FFFFFF;"></svg>"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg width="68" height="105" style="width:68px;height:105px;background:#FFFFFF;"></svg>"#
        );
    }

    #[test]
    fn test_scale_svg_dimensions_leaves_inner_elements() {
        let svg = concat!(
            r#"<svg width="400" height="200" style="width:400px;height:200px;">"#,
            r#"<rect width="80" height="40" style="stroke-width:2px;width:80px;"/>"#,
            r#"<text style="max-width:120px">a</text></svg>"#,
        );
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            concat!(
                r#"<svg width="200" height="100" style="width:200px;height:100px;">"#,
                r#"<rect width="80" height="40" style="stroke-width:2px;width:80px;"/>"#,
                r#"<text style="max-width:120px">a</text></svg>"#,
            )
        );
    }

    #[test]
    fn test_scale_svg_dimensions_ignores_stroke_width_on_root() {
        let svg = r#"<svg width="400" style="stroke-width:4px;width:400px"></svg>"#;
        assert_eq!(
            scale_svg_dimensions(svg, 192),
            r#"<svg width="200" style="stroke-width:4px;width:200px"></svg>"#
        );
    }

    #[test]
    fn test_scale_svg_dimensions_at_144_dpi() {
        let svg = r#"<svg width="300" height="150"></svg>"#;
        assert_eq!(
            scale_svg_dimensions(svg, 144),
            r#"<svg width="200" height="100"></svg>"#
        );
    }

    #[test]
    fn test_strip_google_fonts_import() {
        let svg = r#"<style>@import url('https://fonts.googleapis.com/css?family=Roboto');</style>"#;
        assert_eq!(strip_google_fonts_import(svg), "<style></style>");
    }

    #[test]
    fn test_strip_xml_prolog() {
        let svg = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE svg>\n<svg></svg>";
        assert_eq!(strip_xml_prolog(svg), "<svg></svg>");
        assert_eq!(strip_xml_prolog("<svg></svg>"), "<svg></svg>");
    }

    #[test]
    fn test_replacements_single_pass() {
        let mut html = "<p>a</p>{{DIAGRAM_0}}<p>b</p>{{DIAGRAM_2}}".to_owned();
        let mut replacements = Replacements::with_capacity(2);
        replacements.add(0, "<svg>0</svg>".to_owned());
        replacements.add(2, "<svg>2</svg>".to_owned());
        replacements.apply(&mut html);
        assert_eq!(html, "<p>a</p><svg>0</svg><p>b</p><svg>2</svg>");
    }

    #[test]
    fn test_replacements_keep_unknown_placeholders() {
        let mut html = "{{DIAGRAM_1}} {{DIAGRAM_x}} {{DIAGRAM_".to_owned();
        let mut replacements = Replacements::with_capacity(1);
        replacements.add(0, "zero".to_owned());
        replacements.apply(&mut html);
        assert_eq!(html, "{{DIAGRAM_1}} {{DIAGRAM_x}} {{DIAGRAM_");
    }
}
