//! # Font Management
//!
//! Resolution and measurement for text layout, plus registration of custom
//! TrueType fonts.
//!
//! The standard PDF fonts (Helvetica, Times, Courier) need no embedding and
//! are always available. Custom fonts register by family/weight/style with
//! their raw bytes; metrics come from `ttf-parser`. Registration must happen
//! before layout measures anything, because measuring with one font and
//! drawing with another corrupts line geometry. Registration is idempotent
//! and fails soft: a font that does not parse registers nothing, is logged,
//! and resolution falls back to Helvetica for both measurement and drawing,
//! keeping the two consistent.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::HashMap;

use crate::style::FontStyle;

/// A font registry mapping family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// A standard PDF font. No embedding needed.
    Standard(StandardFont),
    /// A registered TrueType font with parsed metrics.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Metrics parsed from a TrueType/OpenType font.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from raw font bytes.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;
        for code in 32u32..=0x2FFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }
        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

/// The standard PDF fonts we resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => metrics::HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => metrics::TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => metrics::TIMES_BOLD,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => metrics::COURIER,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Times", 400, false), StandardFont::TimesRoman),
            (("Times", 700, false), StandardFont::TimesBold),
            (("Times", 400, true), StandardFont::TimesItalic),
            (("Times", 700, true), StandardFont::TimesBoldItalic),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::CourierBold),
            (("Courier", 400, true), StandardFont::CourierOblique),
            (("Courier", 700, true), StandardFont::CourierBoldOblique),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self { fonts }
    }

    /// Look up a font: exact key, then weight snapped to 400/700, then
    /// Helvetica at the snapped weight.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let snapped = if weight >= 600 { 700 } else { 400 };
        let candidates = [
            FontKey { family: family.to_string(), weight, italic },
            FontKey { family: family.to_string(), weight: snapped, italic },
            FontKey { family: "Helvetica".to_string(), weight: snapped, italic },
        ];
        for key in &candidates {
            if let Some(font) = self.fonts.get(key) {
                return font;
            }
        }
        self.fonts
            .get(&FontKey {
                family: "Helvetica".to_string(),
                weight: 400,
                italic: false,
            })
            .expect("Helvetica must be registered")
    }

    /// Register a custom font. Idempotent: a key that is already registered
    /// is left alone. Returns whether the font is usable after the call.
    pub fn register(&mut self, family: &str, weight: u32, italic: bool, data: Vec<u8>) -> bool {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if self.fonts.contains_key(&key) {
            return true;
        }
        match CustomFontMetrics::from_font_data(&data) {
            Some(metrics) => {
                self.fonts.insert(key, FontData::Custom { data, metrics });
                true
            }
            None => {
                tracing::warn!(family, weight, "font data failed to parse, falling back to Helvetica");
                false
            }
        }
    }
}

/// Shared font context used by layout and PDF serialization.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Register a custom font from raw bytes. See [`FontRegistry::register`].
    pub fn register_custom(&mut self, family: &str, weight: u32, italic: bool, data: Vec<u8>) -> bool {
        self.registry.register(family, weight, italic, data)
    }

    /// Register a custom font from a base64 string or `data:font/...` URI.
    pub fn register_custom_base64(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        src: &str,
    ) -> bool {
        use base64::Engine;
        let b64 = match src.find(',') {
            Some(comma) if src.starts_with("data:") => &src[comma + 1..],
            _ => src,
        };
        match base64::engine::general_purpose::STANDARD.decode(b64) {
            Ok(data) => self.register_custom(family, weight, italic, data),
            Err(e) => {
                tracing::warn!(family, error = %e, "font source is not valid base64");
                false
            }
        }
    }

    /// Measure a string in points.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        weight: u32,
        style: FontStyle,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        let italic = style == FontStyle::Italic;
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => std_font
                .metrics()
                .measure_string(text, font_size, letter_spacing),
            FontData::Custom { metrics, .. } => {
                let mut width = 0.0;
                for ch in text.chars() {
                    width += metrics.char_width(ch, font_size) + letter_spacing;
                }
                width
            }
        }
    }

    /// Resolve to the standard font used for PDF drawing. Custom fonts draw
    /// with the nearest standard face (metrics stay custom, so measurement
    /// and wrapping reflect the registered font).
    pub fn draw_font(&self, family: &str, weight: u32, style: FontStyle) -> StandardFont {
        let italic = style == FontStyle::Italic;
        match self.registry.resolve(family, weight, italic) {
            FontData::Standard(std_font) => *std_font,
            FontData::Custom { .. } => match (weight >= 600, italic) {
                (false, false) => StandardFont::Helvetica,
                (true, false) => StandardFont::HelveticaBold,
                (false, true) => StandardFont::HelveticaOblique,
                (true, true) => StandardFont::HelveticaBoldOblique,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_standard() {
        let ctx = FontContext::new();
        let w = ctx.measure_string(" ", "Helvetica", 400, FontStyle::Normal, 12.0, 0.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_unknown_family_falls_back_to_helvetica() {
        let ctx = FontContext::new();
        let known = ctx.measure_string("A", "Helvetica", 400, FontStyle::Normal, 12.0, 0.0);
        let unknown = ctx.measure_string("A", "Comic Sans", 400, FontStyle::Normal, 12.0, 0.0);
        assert!((known - unknown).abs() < 0.001);
    }

    #[test]
    fn test_weight_snapping() {
        let ctx = FontContext::new();
        let w700 = ctx.measure_string("A", "Helvetica", 700, FontStyle::Normal, 12.0, 0.0);
        let w800 = ctx.measure_string("A", "Helvetica", 800, FontStyle::Normal, 12.0, 0.0);
        assert!((w700 - w800).abs() < 0.001);
    }

    #[test]
    fn test_register_garbage_fails_soft() {
        let mut ctx = FontContext::new();
        assert!(!ctx.register_custom("Broken", 400, false, vec![0, 1, 2, 3]));
        // Resolution still works through the fallback chain.
        let w = ctx.measure_string("A", "Broken", 400, FontStyle::Normal, 12.0, 0.0);
        assert!(w > 0.0);
    }

    #[test]
    fn test_register_is_idempotent_for_standard_keys() {
        let mut ctx = FontContext::new();
        // Re-registering an existing key is a no-op and reports usable.
        assert!(ctx.register_custom("Helvetica", 400, false, vec![]));
    }

    #[test]
    fn test_invalid_base64_fails_soft() {
        let mut ctx = FontContext::new();
        assert!(!ctx.register_custom_base64("X", 400, false, "!!not-base64!!"));
    }
}
