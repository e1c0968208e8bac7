//! # Style System
//!
//! A small CSS-like style model for layout nodes. Template descriptors carry
//! a named table of these (`StyleMap`); markup references entries with
//! `style={styles.key}` and both output paths consume the same table, which
//! is the only mechanism keeping HTML and PDF output visually consistent.
//!
//! Styles are sparse (`Option` everywhere) and resolve against the parent
//! through [`Style::resolve`]: typography and color inherit, box properties
//! do not.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named style table attached to a template descriptor.
pub type StyleMap = HashMap<String, Style>;

/// Edge values (top, right, bottom, left) for margin, padding, borders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A width that can be fixed points, a percentage of the parent, or content-sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dimension {
    Pt(f64),
    Percent(f64),
    Auto,
}

impl Dimension {
    /// Resolve against a parent size. Returns `None` for `Auto`.
    pub fn resolve(&self, parent_size: f64) -> Option<f64> {
        match self {
            Dimension::Pt(v) => Some(*v),
            Dimension::Percent(p) => Some(parent_size * p / 100.0),
            Dimension::Auto => None,
        }
    }
}

/// Main-axis direction for a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    /// CSS hex form, `#rrggbb`.
    pub fn to_css(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Sparse style properties for a node. Declarative data in template tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // Box model
    pub width: Option<Dimension>,
    pub height: Option<f64>,
    #[serde(default)]
    pub padding: Option<Edges>,
    #[serde(default)]
    pub margin: Option<Edges>,

    // Container
    #[serde(default)]
    pub direction: Option<Direction>,
    pub gap: Option<f64>,

    // Typography
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u32>,
    pub font_style: Option<FontStyle>,
    pub line_height: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub text_transform: Option<TextTransform>,

    // Color
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    /// Decorative raster backdrop (path or data URI). Honored on the page
    /// root, where it paints behind all content on every page.
    pub background_image: Option<String>,

    // Border
    pub border_width: Option<Edges>,
    pub border_color: Option<Color>,

    // Page behavior: can this block split across a page boundary?
    pub wrap: Option<bool>,
}

/// Fully resolved style: what the layout engine works with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Edges,
    pub margin: Edges,

    pub direction: Direction,
    pub gap: f64,

    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub font_style: FontStyle,
    pub line_height: f64,
    pub text_align: TextAlign,
    pub letter_spacing: f64,
    pub text_transform: TextTransform,

    pub color: Color,
    pub background_color: Option<Color>,
    pub border_width: Edges,
    pub border_color: Color,

    pub breakable: bool,
}

impl Style {
    /// Resolve against the parent's resolved style and the available width.
    /// Typography and color inherit; box and border properties do not.
    pub fn resolve(&self, parent: Option<&ResolvedStyle>, available_width: f64) -> ResolvedStyle {
        ResolvedStyle {
            width: self.width.and_then(|d| d.resolve(available_width)),
            height: self.height,
            padding: self.padding.unwrap_or_default(),
            margin: self.margin.unwrap_or_default(),

            direction: self.direction.unwrap_or_default(),
            gap: self.gap.unwrap_or(0.0),

            font_family: self
                .font_family
                .clone()
                .or_else(|| parent.map(|p| p.font_family.clone()))
                .unwrap_or_else(|| "Helvetica".to_string()),
            font_size: self
                .font_size
                .unwrap_or_else(|| parent.map(|p| p.font_size).unwrap_or(10.0)),
            font_weight: self
                .font_weight
                .unwrap_or_else(|| parent.map(|p| p.font_weight).unwrap_or(400)),
            font_style: self
                .font_style
                .unwrap_or_else(|| parent.map(|p| p.font_style).unwrap_or_default()),
            line_height: self
                .line_height
                .unwrap_or_else(|| parent.map(|p| p.line_height).unwrap_or(1.4)),
            text_align: self
                .text_align
                .unwrap_or_else(|| parent.map(|p| p.text_align).unwrap_or_default()),
            letter_spacing: self.letter_spacing.unwrap_or(0.0),
            text_transform: self.text_transform.unwrap_or_default(),

            color: self
                .color
                .unwrap_or_else(|| parent.map(|p| p.color).unwrap_or(Color::BLACK)),
            background_color: self.background_color,
            border_width: self.border_width.unwrap_or_default(),
            border_color: self.border_color.unwrap_or(Color::BLACK),

            breakable: self.wrap.unwrap_or(true),
        }
    }
}

/// Apply a text transform to a string.
pub fn apply_text_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        let c = Color::hex("#336699");
        assert!((c.r - 0.2).abs() < 0.01);
        assert!((c.g - 0.4).abs() < 0.01);
        assert!((c.b - 0.6).abs() < 0.01);
        assert_eq!(c.to_css(), "#336699");
    }

    #[test]
    fn test_hex_shorthand() {
        let c = Color::hex("#fff");
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn test_typography_inherits() {
        let parent = Style {
            font_size: Some(18.0),
            color: Some(Color::hex("#222222")),
            ..Default::default()
        }
        .resolve(None, 500.0);

        let child = Style::default().resolve(Some(&parent), 500.0);
        assert_eq!(child.font_size, 18.0);
        assert_eq!(child.color, parent.color);
    }

    #[test]
    fn test_box_properties_do_not_inherit() {
        let parent = Style {
            padding: Some(Edges::uniform(20.0)),
            background_color: Some(Color::WHITE),
            ..Default::default()
        }
        .resolve(None, 500.0);

        let child = Style::default().resolve(Some(&parent), 500.0);
        assert_eq!(child.padding, Edges::default());
        assert!(child.background_color.is_none());
    }

    #[test]
    fn test_percent_width_resolves_against_available() {
        let style = Style {
            width: Some(Dimension::Percent(50.0)),
            ..Default::default()
        }
        .resolve(None, 400.0);
        assert_eq!(style.width, Some(200.0));
    }
}
