//! Per-element styles for the styled backend.

use std::collections::HashMap;

use crate::style::Style;
use crate::theme::{Color, Palette, Theme};

const BODY_FONT: &str = "-apple-system, BlinkMacSystemFont, 'Helvetica Neue', 'PingFang SC', 'Microsoft YaHei', sans-serif";
const CODE_FONT: &str = "Menlo, Monaco, Consolas, 'Courier New', monospace";

/// Node kinds the styled backend decorates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    Container,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Paragraph,
    Blockquote,
    Alert,
    AlertTitle,
    CodeBlock,
    CodeBlockInner,
    InlineCode,
    TableWrapper,
    Table,
    TableHeader,
    TableCell,
    UnorderedList,
    OrderedList,
    ListItem,
    Link,
    Strong,
    Emphasis,
    Strikethrough,
    Figure,
    Image,
    Figcaption,
    Rule,
    Formula,
    InlineFormula,
    Diagram,
    FootnoteReference,
    Footnote,
}

impl Element {
    /// Every element, in declaration order.
    pub const ALL: [Element; 34] = [
        Element::Container,
        Element::H1,
        Element::H2,
        Element::H3,
        Element::H4,
        Element::H5,
        Element::H6,
        Element::Paragraph,
        Element::Blockquote,
        Element::Alert,
        Element::AlertTitle,
        Element::CodeBlock,
        Element::CodeBlockInner,
        Element::InlineCode,
        Element::TableWrapper,
        Element::Table,
        Element::TableHeader,
        Element::TableCell,
        Element::UnorderedList,
        Element::OrderedList,
        Element::ListItem,
        Element::Link,
        Element::Strong,
        Element::Emphasis,
        Element::Strikethrough,
        Element::Figure,
        Element::Image,
        Element::Figcaption,
        Element::Rule,
        Element::Formula,
        Element::InlineFormula,
        Element::Diagram,
        Element::FootnoteReference,
        Element::Footnote,
    ];

    /// Configuration key for this element.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Paragraph => "paragraph",
            Self::Blockquote => "blockquote",
            Self::Alert => "alert",
            Self::AlertTitle => "alert_title",
            Self::CodeBlock => "code_block",
            Self::CodeBlockInner => "code_block_inner",
            Self::InlineCode => "inline_code",
            Self::TableWrapper => "table_wrapper",
            Self::Table => "table",
            Self::TableHeader => "table_header",
            Self::TableCell => "table_cell",
            Self::UnorderedList => "unordered_list",
            Self::OrderedList => "ordered_list",
            Self::ListItem => "list_item",
            Self::Link => "link",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Strikethrough => "strikethrough",
            Self::Figure => "figure",
            Self::Image => "image",
            Self::Figcaption => "figcaption",
            Self::Rule => "rule",
            Self::Formula => "formula",
            Self::InlineFormula => "inline_formula",
            Self::Diagram => "diagram",
            Self::FootnoteReference => "footnote_reference",
            Self::Footnote => "footnote",
        }
    }

    /// Parse a configuration key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }

    /// Heading element for a level (1-6; out-of-range levels clamp).
    #[must_use]
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Self::H1,
            2 => Self::H2,
            3 => Self::H3,
            4 => Self::H4,
            5 => Self::H5,
            _ => Self::H6,
        }
    }
}

/// Style sheet error.
#[derive(Debug, thiserror::Error)]
pub enum StyleSheetError {
    #[error("unknown element '{0}' in style overrides")]
    UnknownElement(String),
}

/// Styles for every [`Element`], derived from a theme.
#[derive(Clone, Debug)]
pub struct StyleSheet {
    styles: HashMap<Element, Style>,
    palette: Palette,
}

impl StyleSheet {
    /// Build the default style sheet for a theme.
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self::from_palette(theme.palette)
    }

    /// Build the default style sheet for a palette.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn from_palette(palette: Palette) -> Self {
        // Body text stays dark on a light page regardless of the code theme;
        // only code blocks take the theme background.
        let text = Color::rgb(0x33, 0x33, 0x33);
        let accent = palette.accent.to_hex();
        let muted = Color::rgb(0x88, 0x88, 0x88).to_hex();
        let border = Color::rgb(0xdf, 0xe2, 0xe5).to_hex();
        let soft = palette.accent.mix(Color::WHITE, 0.92).to_hex();
        let inline_code_bg = if palette.is_dark() {
            palette.background.mix(Color::WHITE, 0.85)
        } else {
            palette.background.mix(Color::BLACK, 0.05)
        };

        let heading = |size: &str, margin: &str| {
            Style::from_pairs([
                ("fontSize", size),
                ("fontWeight", "bold"),
                ("lineHeight", "1.4"),
                ("margin", margin),
                ("color", accent.as_str()),
            ])
        };

        let mut styles = HashMap::new();
        styles.insert(
            Element::Container,
            Style::from_pairs([
                ("fontFamily", BODY_FONT),
                ("fontSize", "16px"),
                ("lineHeight", "1.75"),
                ("color", text.to_hex().as_str()),
                ("letterSpacing", "0.05em"),
                ("wordBreak", "break-word"),
            ]),
        );
        styles.insert(
            Element::H1,
            heading("24px", "1.2em 0 0.8em").with("textAlign", "center"),
        );
        styles.insert(
            Element::H2,
            heading("22px", "1.2em 0 0.8em")
                .with("paddingBottom", "0.3em")
                .with("borderBottom", format!("2px solid {accent}")),
        );
        styles.insert(Element::H3, heading("20px", "1em 0 0.6em"));
        styles.insert(Element::H4, heading("18px", "1em 0 0.6em"));
        styles.insert(Element::H5, heading("16px", "1em 0 0.5em"));
        styles.insert(
            Element::H6,
            heading("16px", "1em 0 0.5em").with("color", muted.as_str()),
        );
        styles.insert(
            Element::Paragraph,
            Style::from_pairs([("margin", "1em 0"), ("textAlign", "justify")]),
        );
        styles.insert(
            Element::Blockquote,
            Style::from_pairs([
                ("margin", "1em 0"),
                ("padding", "0.6em 1em"),
                ("borderLeft", format!("4px solid {accent}").as_str()),
                ("background", soft.as_str()),
                ("color", "#666666"),
                ("borderRadius", "4px"),
            ]),
        );
        styles.insert(
            Element::Alert,
            Style::from_pairs([
                ("margin", "1em 0"),
                ("padding", "0.6em 1em"),
                ("borderLeft", format!("4px solid {accent}").as_str()),
                ("background", soft.as_str()),
                ("borderRadius", "4px"),
            ]),
        );
        styles.insert(
            Element::AlertTitle,
            Style::from_pairs([
                ("fontWeight", "bold"),
                ("margin", "0 0 0.4em"),
                ("color", accent.as_str()),
            ]),
        );
        styles.insert(
            Element::CodeBlock,
            Style::from_pairs([
                ("margin", "1em 0"),
                ("padding", "1em"),
                ("borderRadius", "6px"),
                ("background", palette.background.to_hex().as_str()),
                ("color", palette.foreground.to_hex().as_str()),
                ("overflowX", "auto"),
                ("fontSize", "13px"),
                ("lineHeight", "1.6"),
            ]),
        );
        styles.insert(
            Element::CodeBlockInner,
            Style::from_pairs([
                ("fontFamily", CODE_FONT),
                ("display", "block"),
                ("whiteSpace", "nowrap"),
                ("background", "none"),
            ]),
        );
        styles.insert(
            Element::InlineCode,
            Style::from_pairs([
                ("fontFamily", CODE_FONT),
                ("fontSize", "90%"),
                ("padding", "2px 4px"),
                ("borderRadius", "4px"),
                ("background", inline_code_bg.to_hex().as_str()),
                ("color", palette.keyword.to_hex().as_str()),
            ]),
        );
        styles.insert(
            Element::TableWrapper,
            Style::from_pairs([("margin", "1em 0"), ("overflowX", "auto")]),
        );
        styles.insert(
            Element::Table,
            Style::from_pairs([
                ("borderCollapse", "collapse"),
                ("width", "100%"),
                ("fontSize", "14px"),
            ]),
        );
        styles.insert(
            Element::TableHeader,
            Style::from_pairs([
                ("border", format!("1px solid {border}").as_str()),
                ("padding", "6px 12px"),
                ("background", soft.as_str()),
                ("fontWeight", "bold"),
            ]),
        );
        styles.insert(
            Element::TableCell,
            Style::from_pairs([
                ("border", format!("1px solid {border}").as_str()),
                ("padding", "6px 12px"),
            ]),
        );
        styles.insert(
            Element::UnorderedList,
            Style::from_pairs([
                ("margin", "0.6em 0"),
                ("paddingLeft", "1.5em"),
                ("listStyleType", "disc"),
            ]),
        );
        styles.insert(
            Element::OrderedList,
            Style::from_pairs([
                ("margin", "0.6em 0"),
                ("paddingLeft", "1.5em"),
                ("listStyleType", "decimal"),
            ]),
        );
        styles.insert(
            Element::ListItem,
            Style::from_pairs([("margin", "0.3em 0")]),
        );
        styles.insert(
            Element::Link,
            Style::from_pairs([
                ("color", accent.as_str()),
                ("textDecoration", "none"),
                ("borderBottom", format!("1px solid {accent}").as_str()),
            ]),
        );
        styles.insert(
            Element::Strong,
            Style::from_pairs([("fontWeight", "bold"), ("color", accent.as_str())]),
        );
        styles.insert(Element::Emphasis, Style::from_pairs([("fontStyle", "italic")]));
        styles.insert(
            Element::Strikethrough,
            Style::from_pairs([("textDecoration", "line-through")]),
        );
        styles.insert(
            Element::Figure,
            Style::from_pairs([("margin", "1em 0"), ("textAlign", "center")]),
        );
        styles.insert(
            Element::Image,
            Style::from_pairs([
                ("display", "block"),
                ("maxWidth", "100%"),
                ("margin", "0 auto"),
                ("borderRadius", "4px"),
            ]),
        );
        styles.insert(
            Element::Figcaption,
            Style::from_pairs([
                ("marginTop", "0.4em"),
                ("fontSize", "13px"),
                ("color", muted.as_str()),
            ]),
        );
        styles.insert(
            Element::Rule,
            Style::from_pairs([
                ("margin", "1.5em 0"),
                ("border", "none"),
                ("borderTop", format!("1px solid {border}").as_str()),
            ]),
        );
        styles.insert(
            Element::Formula,
            Style::from_pairs([
                ("margin", "1em 0"),
                ("textAlign", "center"),
                ("overflowX", "auto"),
            ]),
        );
        styles.insert(
            Element::InlineFormula,
            Style::from_pairs([("verticalAlign", "middle")]),
        );
        styles.insert(
            Element::Diagram,
            Style::from_pairs([
                ("margin", "1em 0"),
                ("textAlign", "center"),
                ("overflowX", "auto"),
            ]),
        );
        styles.insert(
            Element::FootnoteReference,
            Style::from_pairs([("color", accent.as_str()), ("fontSize", "75%")]),
        );
        styles.insert(
            Element::Footnote,
            Style::from_pairs([
                ("margin", "0.4em 0"),
                ("fontSize", "13px"),
                ("color", "#666666"),
            ]),
        );

        Self { styles, palette }
    }

    /// Palette the sheet was built from.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Style for an element.
    #[must_use]
    pub fn style(&self, element: Element) -> &Style {
        static EMPTY: Style = Style::EMPTY;
        self.styles.get(&element).unwrap_or(&EMPTY)
    }

    /// Serialized CSS for an element.
    #[must_use]
    pub fn css(&self, element: Element) -> String {
        self.style(element).to_css()
    }

    /// Replace the style of an element.
    pub fn set_style(&mut self, element: Element, style: Style) {
        self.styles.insert(element, style);
    }

    /// Merge user overrides keyed by element key.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Result<Self, StyleSheetError>
    where
        I: IntoIterator<Item = (&'a str, &'a Style)>,
    {
        for (key, style) in overrides {
            let element = Element::from_key(key)
                .ok_or_else(|| StyleSheetError::UnknownElement(key.to_owned()))?;
            self.styles.entry(element).or_default().extend(style);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::lookup_theme;

    fn github_sheet() -> StyleSheet {
        StyleSheet::from_theme(&lookup_theme("github").unwrap())
    }

    #[test]
    fn test_element_keys_roundtrip() {
        for element in Element::ALL {
            assert_eq!(Element::from_key(element.key()), Some(element));
        }
        assert_eq!(Element::from_key("marquee"), None);
    }

    #[test]
    fn test_heading_clamps_level() {
        assert_eq!(Element::heading(1), Element::H1);
        assert_eq!(Element::heading(4), Element::H4);
        assert_eq!(Element::heading(9), Element::H6);
    }

    #[test]
    fn test_every_element_has_a_default_style() {
        let sheet = github_sheet();
        for element in Element::ALL {
            assert!(!sheet.css(element).is_empty(), "{}", element.key());
        }
    }

    #[test]
    fn test_headings_use_accent() {
        let sheet = github_sheet();
        let accent = sheet.palette().accent.to_hex();
        assert_eq!(sheet.style(Element::H2).get("color"), Some(accent.as_str()));
    }

    #[test]
    fn test_code_block_uses_theme_background() {
        let theme = lookup_theme("ocean-dark").unwrap();
        let sheet = StyleSheet::from_theme(&theme);
        let bg = theme.palette.background.to_hex();
        assert_eq!(
            sheet.style(Element::CodeBlock).get("background"),
            Some(bg.as_str())
        );
    }

    #[test]
    fn test_overrides_merge() {
        let overrides = Style::from_pairs([("fontSize", "30px"), ("letterSpacing", "1px")]);
        let sheet = github_sheet()
            .with_overrides([("h1", &overrides)])
            .unwrap();
        let h1 = sheet.style(Element::H1);
        assert_eq!(h1.get("font-size"), Some("30px"));
        assert_eq!(h1.get("letter-spacing"), Some("1px"));
        assert_eq!(h1.get("font-weight"), Some("bold"));
    }

    #[test]
    fn test_overrides_unknown_element() {
        let style = Style::new();
        let err = github_sheet()
            .with_overrides([("marquee", &style)])
            .unwrap_err();
        assert!(err.to_string().contains("marquee"));
    }
}
