//! Theme lookup and color palettes.
//!
//! Themes are the color schemes bundled with `syntect`. Each theme is reduced
//! to a [`Palette`] that the style sheet draws its colors from, and is
//! classified as light or dark by the relative luminance of its background.

use std::fmt;
use std::sync::LazyLock;

use syntect::highlighting::{self, Highlighter as ScopeHighlighter, ThemeSet};
use syntect::parsing::Scope;

/// Luminance above which a color counts as light.
const LIGHT_THRESHOLD: f64 = 0.5;

/// Default theme identifier.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Short names accepted in addition to the canonical theme names.
const ALIASES: &[(&str, &str)] = &[
    ("github", "InspiredGitHub"),
    ("ocean-dark", "base16-ocean.dark"),
    ("ocean-light", "base16-ocean.light"),
    ("eighties", "base16-eighties.dark"),
    ("mocha", "base16-mocha.dark"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
];

static BUNDLED: LazyLock<ThemeRegistry> = LazyLock::new(ThemeRegistry::new);

/// Theme lookup error.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// No theme with this identifier.
    #[error("unknown theme '{id}' (available: {})", .available.join(", "))]
    Unknown {
        /// Requested identifier.
        id: String,
        /// Canonical names of the bundled themes.
        available: Vec<String>,
    },
}

/// RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`.
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').filter(|h| h.is_ascii())?;
        let channel = |range: &str| u8::from_str_radix(range, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// Format as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Weighted sum of the channels, scaled to `[0, 1]`.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    /// Whether the color is visually light.
    #[must_use]
    pub fn is_light(self) -> bool {
        self.relative_luminance() > LIGHT_THRESHOLD
    }

    /// Mix with another color; `amount` is the share of `other` in `[0, 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn mix(self, other: Color, amount: f64) -> Color {
        let amount = amount.clamp(0.0, 1.0);
        let blend = |a: u8, b: u8| {
            (f64::from(a) * (1.0 - amount) + f64::from(b) * amount).round() as u8
        };
        Color::rgb(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<highlighting::Color> for Color {
    fn from(c: highlighting::Color) -> Self {
        Self::rgb(c.r, c.g, c.b)
    }
}

/// Colors a theme contributes to the style sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub comment: Color,
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,
}

impl Palette {
    /// Whether the theme has a dark background.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        !self.background.is_light()
    }

    /// Black or white, whichever reads better on `background`.
    #[must_use]
    pub fn readable_text_on(background: Color) -> Color {
        if background.is_light() {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    /// Extract a palette from a `syntect` theme.
    fn from_syntax_theme(theme: &highlighting::Theme) -> Self {
        let background = theme
            .settings
            .background
            .map_or(Color::WHITE, Color::from);
        let foreground = theme
            .settings
            .foreground
            .map_or(Color::BLACK, Color::from);

        let highlighter = ScopeHighlighter::new(theme);
        let scope_color = |name: &str| {
            Scope::new(name).map_or(foreground, |scope| {
                let style = highlighter.style_for_stack(&[scope]);
                Color::from(style.foreground)
            })
        };

        let keyword = scope_color("keyword");
        Self {
            background,
            foreground,
            accent: keyword,
            comment: scope_color("comment"),
            keyword,
            string: scope_color("string"),
            number: scope_color("constant.numeric"),
            function: scope_color("entity.name.function"),
        }
    }
}

/// A resolved theme.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Canonical theme name.
    pub name: String,
    /// Colors used by the style sheet.
    pub palette: Palette,
    /// Highlighting rules used for code blocks.
    pub syntax: highlighting::Theme,
}

impl Theme {
    /// Whether the theme has a dark background.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.palette.is_dark()
    }
}

/// Registry of the bundled themes.
pub struct ThemeRegistry {
    set: ThemeSet,
}

impl ThemeRegistry {
    /// Load the bundled theme set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: ThemeSet::load_defaults(),
        }
    }

    /// Shared registry of bundled themes.
    #[must_use]
    pub fn bundled() -> &'static ThemeRegistry {
        &BUNDLED
    }

    /// Canonical names of all themes, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.set.themes.keys().cloned().collect()
    }

    /// Resolve a theme identifier (case-insensitive, aliases allowed).
    pub fn lookup(&self, id: &str) -> Result<Theme, ThemeError> {
        let wanted = id.trim();
        let canonical = ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(wanted))
            .map_or(wanted, |(_, name)| *name);

        let found = self
            .set
            .themes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(canonical));

        match found {
            Some((name, syntax)) => Ok(Theme {
                name: name.clone(),
                palette: Palette::from_syntax_theme(syntax),
                syntax: syntax.clone(),
            }),
            None => Err(ThemeError::Unknown {
                id: id.to_owned(),
                available: self.names(),
            }),
        }
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a theme from the bundled registry.
pub fn lookup_theme(id: &str) -> Result<Theme, ThemeError> {
    ThemeRegistry::bundled().lookup(id)
}
