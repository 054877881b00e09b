//! Style descriptions and their serialization to CSS declaration strings.
//!
//! A [`Style`] is an ordered list of `property: value` declarations. Keys may
//! be written in camelCase (`fontSize`) or kebab-case (`font-size`); both
//! serialize to kebab-case.
//!
//! ```
//! use mdstyle_renderer::Style;
//!
//! let style = Style::from_pairs([("fontSize", "16px"), ("color", "#333")]);
//! assert_eq!(style.to_css(), "font-size: 16px; color: #333;");
//! ```

use std::fmt::Write;

/// Ordered set of CSS declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    /// Style without declarations.
    pub const EMPTY: Style = Style {
        declarations: Vec::new(),
    };

    /// Create an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a style from `(property, value)` pairs.
    ///
    /// Later pairs override earlier ones with the same property.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut style = Self::new();
        for (key, value) in pairs {
            style.set(key, value);
        }
        style
    }

    /// Set a declaration, replacing an existing one in place.
    ///
    /// Properties are compared after kebab-case normalization, so
    /// `fontSize` and `font-size` address the same declaration.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        let normalized = to_kebab_case(&key);
        if let Some(slot) = self
            .declarations
            .iter_mut()
            .find(|(k, _)| to_kebab_case(k) == normalized)
        {
            slot.1 = value;
        } else {
            self.declarations.push((key, value));
        }
        self
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Get the value of a declaration.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let normalized = to_kebab_case(key);
        self.declarations
            .iter()
            .find(|(k, _)| to_kebab_case(k) == normalized)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a declaration, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let normalized = to_kebab_case(key);
        let pos = self
            .declarations
            .iter()
            .position(|(k, _)| to_kebab_case(k) == normalized)?;
        Some(self.declarations.remove(pos).1)
    }

    /// Apply every declaration of `other` on top of this style.
    pub fn extend(&mut self, other: &Style) {
        for (key, value) in &other.declarations {
            self.set(key.clone(), value.clone());
        }
    }

    /// Return `base` with `overrides` applied on top.
    #[must_use]
    pub fn merged(base: &Style, overrides: &Style) -> Style {
        let mut style = base.clone();
        style.extend(overrides);
        style
    }

    /// Whether the style has no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Iterate over declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to a CSS declaration string.
    #[must_use]
    pub fn to_css(&self) -> String {
        to_css(self)
    }
}

/// Serialize a style to a CSS declaration string.
///
/// Declarations with blank values are skipped. Double quotes in values are
/// replaced by single quotes so the result always fits inside a
/// double-quoted `style` attribute.
#[must_use]
pub fn to_css(style: &Style) -> String {
    let mut out = String::new();
    for (key, value) in &style.declarations {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        write!(out, "{}: {};", to_kebab_case(key), value.replace('"', "'")).unwrap();
    }
    out
}

/// Convert a camelCase property name to kebab-case.
///
/// A leading uppercase letter marks a vendor prefix
/// (`WebkitTransform` → `-webkit-transform`).
#[must_use]
pub fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{self, MapAccess, Visitor};
    use serde::{Deserialize, Deserializer};

    use super::Style;

    /// A declaration value: strings are kept, numbers are stringified.
    struct Value(String);

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct ValueVisitor;

            impl Visitor<'_> for ValueVisitor {
                type Value = Value;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a string or number")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                    Ok(Value(v.to_owned()))
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                    Ok(Value(v.to_string()))
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                    Ok(Value(v.to_string()))
                }

                fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                    Ok(Value(v.to_string()))
                }
            }

            deserializer.deserialize_any(ValueVisitor)
        }
    }

    impl<'de> Deserialize<'de> for Style {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct StyleVisitor;

            impl<'de> Visitor<'de> for StyleVisitor {
                type Value = Style;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a map of CSS properties")
                }

                fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Style, A::Error> {
                    let mut style = Style::new();
                    while let Some((key, Value(value))) = map.next_entry::<String, Value>()? {
                        style.set(key, value);
                    }
                    Ok(style)
                }
            }

            deserializer.deserialize_map(StyleVisitor)
        }
    }
}
