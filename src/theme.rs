//! Colors, font names and sizes shared by the block builders.
//!
//! A [`Theme`] is an immutable configuration value handed to the
//! [`DocumentBuilder`](crate::builder::DocumentBuilder) at construction time.  Every builder in
//! [`crate::blocks`] reads its colors and sizes from the theme it was created with, so the same
//! call sequence can be rendered with different palettes without touching shared state.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Returns the uppercase `RRGGBB` form used by WordprocessingML attributes.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parses `RRGGBB` or `#RRGGBB`.
    fn from_str(value: &str) -> Result<Self> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(value.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| Error::InvalidColor(value.to_string()))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Named colors referenced by the builders.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Heading 1/3 text, key/value labels and pending task labels.
    pub primary: Rgb,
    /// Heading 2 text and the heading 1 underline.
    pub accent: Rgb,
    /// Completed tasks and milestone callouts.
    pub success: Rgb,
    /// Note callouts.
    pub warning: Rgb,
    /// Skipped tasks.
    pub danger: Rgb,
    /// Secondary text such as version box descriptions.
    pub muted: Rgb,
    /// Divider lines.
    pub rule: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb(0x1E, 0x3A, 0x5F),
            accent: Rgb(0x2E, 0x86, 0xAB),
            success: Rgb(0x1A, 0x7A, 0x4A),
            warning: Rgb(0xC7, 0x50, 0x00),
            danger: Rgb(0xAA, 0x00, 0x00),
            muted: Rgb(0x66, 0x66, 0x66),
            rule: Rgb(0xDD, 0xDD, 0xDD),
        }
    }
}

impl Palette {
    /// Looks up a palette entry by name.
    pub fn get(&self, name: &str) -> Option<Rgb> {
        let color = match name {
            "primary" => self.primary,
            "accent" => self.accent,
            "success" => self.success,
            "warning" => self.warning,
            "danger" => self.danger,
            "muted" => self.muted,
            "rule" => self.rule,
            _ => return None,
        };
        Some(color)
    }

    /// Resolves either a palette name or a hexadecimal color literal.
    pub fn resolve(&self, spec: &str) -> Result<Rgb> {
        let spec = spec.trim();
        if let Some(color) = self.get(spec) {
            return Ok(color);
        }
        if spec.starts_with('#') {
            return spec.parse();
        }
        Err(Error::UnknownColor(spec.to_string()))
    }
}

/// Font family names written into the document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontNames {
    pub body: String,
    pub mono: String,
}

impl Default for FontNames {
    fn default() -> Self {
        Self {
            body: "Arial".to_string(),
            mono: "Courier New".to_string(),
        }
    }
}

/// Font sizes in points.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sizes {
    pub h1: u8,
    pub h2: u8,
    pub h3: u8,
    pub body: u8,
    pub label: u8,
    pub version: u8,
    pub title: u8,
    pub subtitle: u8,
    pub tagline: u8,
    pub banner: u8,
    pub motto: u8,
    pub signoff: u8,
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            h1: 18,
            h2: 14,
            h3: 12,
            body: 11,
            label: 10,
            version: 12,
            title: 30,
            subtitle: 20,
            tagline: 12,
            banner: 12,
            motto: 13,
            signoff: 12,
        }
    }
}

/// Complete styling configuration for a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub palette: Palette,
    pub fonts: FontNames,
    pub sizes: Sizes,
}

impl Theme {
    /// Parses a theme from TOML, filling omitted fields with the defaults, and validates it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let theme: Theme = toml::from_str(source)?;
        theme.validate()?;
        Ok(theme)
    }

    /// Checks that heading sizes strictly decrease with the level and no size is zero.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sizes;
        let all = [
            s.h1, s.h2, s.h3, s.body, s.label, s.version, s.title, s.subtitle, s.tagline,
            s.banner, s.motto, s.signoff,
        ];
        if all.contains(&0) {
            return Err(Error::InvalidTheme("font sizes must be non-zero".to_string()));
        }
        if !(s.h1 > s.h2 && s.h2 > s.h3) {
            return Err(Error::InvalidTheme(format!(
                "heading sizes must strictly decrease (h1 {} > h2 {} > h3 {})",
                s.h1, s.h2, s.h3
            )));
        }
        if self.fonts.body.trim().is_empty() || self.fonts.mono.trim().is_empty() {
            return Err(Error::InvalidTheme("font names must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!("1E3A5F".parse::<Rgb>().unwrap(), Rgb(0x1E, 0x3A, 0x5F));
        assert_eq!("#2e86ab".parse::<Rgb>().unwrap(), Rgb(0x2E, 0x86, 0xAB));
        assert_eq!(Rgb(0x1A, 0x7A, 0x4A).hex(), "1A7A4A");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!("#12FG34".parse::<Rgb>(), Err(Error::InvalidColor(_))));
        assert!(matches!("#123".parse::<Rgb>(), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn palette_resolves_names_and_literals() {
        let palette = Palette::default();
        assert_eq!(palette.resolve("success").unwrap(), palette.success);
        assert_eq!(palette.resolve("#010203").unwrap(), Rgb(1, 2, 3));
        assert!(matches!(palette.resolve("teal"), Err(Error::UnknownColor(_))));
    }

    #[test]
    fn partial_theme_keeps_defaults() {
        let theme = Theme::from_toml_str(
            r##"
            [palette]
            accent = "#FF0000"

            [sizes]
            body = 12
            "##,
        )
        .expect("theme parses");

        assert_eq!(theme.palette.accent, Rgb(0xFF, 0, 0));
        assert_eq!(theme.palette.primary, Palette::default().primary);
        assert_eq!(theme.sizes.body, 12);
        assert_eq!(theme.sizes.h1, 18);
        assert_eq!(theme.fonts.body, "Arial");
    }

    #[test]
    fn rejects_non_decreasing_heading_sizes() {
        let err = Theme::from_toml_str("[sizes]\nh2 = 20\n").unwrap_err();
        assert!(matches!(err, Error::InvalidTheme(_)));
    }

    #[test]
    fn rejects_bad_color_in_theme_file() {
        assert!(Theme::from_toml_str("[palette]\nmuted = \"grey\"\n").is_err());
    }
}
