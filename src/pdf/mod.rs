//! # PDF Serializer
//!
//! Takes laid-out pages and writes a valid PDF file, byte by byte. A
//! from-scratch PDF 1.7 writer: the subset needed for document rendering
//! (Type1 fonts, FlateDecode content streams, image XObjects) is small
//! enough that owning the bytes beats dragging in a PDF library.
//!
//! ## PDF structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Text uses the 14 standard fonts with WinAnsiEncoding, so no font
//! embedding objects are needed. JPEG images pass through with DCTDecode;
//! PNG pixels are deflated with an optional SMask for transparency.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{FontContext, StandardFont};
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::{Color, Edges};

/// Document-level metadata for the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Standard fonts in use, indexed as /F0, /F1, ... Each entry is
    /// (font, object_id).
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject obj IDs for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, image_position_in_page) to an index in
    /// `image_objects`, consulted while writing content streams.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &PdfMetadata,
        font_context: &FontContext,
    ) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then per-page objects and content streams
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_fonts(&mut builder, pages, font_context);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let content =
                self.build_content_stream(page, page_idx, &builder, font_context);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let font_resources = builder
                .font_objects
                .iter()
                .enumerate()
                .map(|(i, (_, obj_id))| format!("/F{i} {obj_id} 0 R"))
                .collect::<Vec<_>>()
                .join(" ");
            let xobject_resources = self.xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {font_resources} >>")
            } else {
                format!("/Font << {font_resources} >> /XObject << {xobject_resources} >>")
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject { data: page_dict.into_bytes() });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = if metadata.title.is_some() || metadata.author.is_some() {
            let id = builder.objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
            }
            if let Some(ref author) = metadata.author {
                let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
            }
            info.push_str("/Producer (vitae) >>");
            builder.objects.push(PdfObject { data: info.into_bytes() });
            Some(id)
        } else {
            None
        };

        self.serialize(&builder, info_obj_id)
    }

    // ── Content streams ─────────────────────────────────────────────

    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> String {
        let mut stream = String::new();

        if let Some(bg) = page.background {
            let _ = write!(
                stream,
                "q\n{:.3} {:.3} {:.3} rg\n0 0 {:.2} {:.2} re\nf\nQ\n",
                bg.r, bg.g, bg.b, page.width, page.height
            );
        }

        let mut image_counter = 0usize;
        for element in &page.elements {
            self.write_element(
                &mut stream,
                element,
                page.height,
                builder,
                page_idx,
                &mut image_counter,
                font_context,
            );
        }

        stream
    }

    /// Write a single layout element as PDF operators.
    #[allow(clippy::too_many_arguments)]
    fn write_element(
        &self,
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        builder: &PdfBuilder,
        page_idx: usize,
        image_counter: &mut usize,
        font_context: &FontContext,
    ) {
        // PDF y-axis grows upward; layout y grows downward from the top.
        let x = element.x;
        let y = page_height - element.y - element.height;
        let w = element.width;
        let h = element.height;

        match &element.draw {
            DrawCommand::None => {}

            DrawCommand::Rect { background, border_width, border_color } => {
                if let Some(bg) = background {
                    if bg.a > 0.0 {
                        let _ = write!(
                            stream,
                            "q\n{:.3} {:.3} {:.3} rg\n{x:.2} {y:.2} {w:.2} {h:.2} re\nf\nQ\n",
                            bg.r, bg.g, bg.b
                        );
                    }
                }
                write_borders(stream, x, y, w, h, border_width, border_color);
            }

            DrawCommand::Text {
                lines,
                font_family,
                font_size,
                font_weight,
                font_style,
                letter_spacing,
                color,
            } => {
                let font = font_context.draw_font(font_family, *font_weight, *font_style);
                let font_idx = builder
                    .font_objects
                    .iter()
                    .position(|(f, _)| *f == font)
                    .unwrap_or(0);

                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n",
                    color.r, color.g, color.b, font_idx, font_size
                );
                if *letter_spacing != 0.0 {
                    let _ = write!(stream, "{letter_spacing:.2} Tc\n");
                }

                for line in lines {
                    let pdf_y = page_height - line.y;
                    let _ = write!(
                        stream,
                        "1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
                        line.x,
                        pdf_y,
                        encode_winansi(&line.text)
                    );
                }

                let _ = write!(stream, "ET\n");
            }

            DrawCommand::Image { .. } => {
                let idx = *image_counter;
                *image_counter += 1;
                if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, idx)) {
                    let _ = write!(
                        stream,
                        "q\n{w:.4} 0 0 {h:.4} {x:.2} {y:.2} cm\n/Im{img_idx} Do\nQ\n"
                    );
                } else {
                    write_placeholder(stream, x, y, w, h);
                }
                return;
            }

            DrawCommand::ImagePlaceholder => {
                *image_counter += 1;
                write_placeholder(stream, x, y, w, h);
                return;
            }
        }

        for child in &element.children {
            self.write_element(
                stream,
                child,
                page_height,
                builder,
                page_idx,
                image_counter,
                font_context,
            );
        }
    }

    // ── Fonts ───────────────────────────────────────────────────────

    /// One font object per standard font actually drawn on any page.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[LayoutPage],
        font_context: &FontContext,
    ) {
        let mut fonts: Vec<StandardFont> = Vec::new();
        for page in pages {
            collect_fonts(&page.elements, font_context, &mut fonts);
        }
        fonts.sort_by_key(|f| f.pdf_name());
        fonts.dedup();
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }

        for font in fonts {
            let obj_id = builder.objects.len();
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject { data: dict.into_bytes() });
            builder.font_objects.push((font, obj_id));
        }
    }

    // ── Images ──────────────────────────────────────────────────────

    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            let mut image_counter = 0usize;
            collect_images(&page.elements, page_idx, &mut image_counter, builder);
        }
    }

    fn xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);
        entries.dedup();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{idx} {obj_id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        // Binary marker bytes so transports treat the file as binary.
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{i} 0 obj\n");
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{offset:010} 00000 n \n");
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R",
            builder.objects.len()
        );
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {info_id} 0 R");
        }
        let _ = write!(output, " >>\nstartxref\n{xref_offset}\n%%EOF\n");

        output
    }
}

fn collect_fonts(
    elements: &[LayoutElement],
    font_context: &FontContext,
    fonts: &mut Vec<StandardFont>,
) {
    for element in elements {
        if let DrawCommand::Text {
            font_family,
            font_weight,
            font_style,
            ..
        } = &element.draw
        {
            fonts.push(font_context.draw_font(font_family, *font_weight, *font_style));
        }
        collect_fonts(&element.children, font_context, fonts);
    }
}

fn collect_images(
    elements: &[LayoutElement],
    page_idx: usize,
    image_counter: &mut usize,
    builder: &mut PdfBuilder,
) {
    for element in elements {
        match &element.draw {
            DrawCommand::Image { image } => {
                let idx = *image_counter;
                *image_counter += 1;
                let img_idx = builder.image_objects.len();
                let xobj_id = write_image_xobject(builder, image);
                builder.image_objects.push(xobj_id);
                builder.image_index_map.insert((page_idx, idx), img_idx);
            }
            DrawCommand::ImagePlaceholder => {
                *image_counter += 1;
            }
            _ => collect_images(&element.children, page_idx, image_counter, builder),
        }
    }
}

/// Write an image as one or two XObjects (main plus optional SMask).
/// Returns the main XObject ID.
fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, grayscale } => {
            let color_space = if *grayscale { "/DeviceGray" } else { "/DeviceRGB" };
            let obj_id = builder.objects.len();
            let mut obj_data: Vec<u8> = Vec::new();
            let _ = write!(
                obj_data,
                "<< /Type /XObject /Subtype /Image \
                 /Width {} /Height {} \
                 /ColorSpace {} \
                 /BitsPerComponent 8 \
                 /Filter /DCTDecode \
                 /Length {} >>\nstream\n",
                image.width_px,
                image.height_px,
                color_space,
                data.len()
            );
            obj_data.extend_from_slice(data);
            obj_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: obj_data });
            obj_id
        }

        ImagePixelData::Decoded { rgb, alpha } => {
            let smask_id = alpha.as_ref().map(|alpha_data| {
                let compressed = compress_to_vec_zlib(alpha_data, 6);
                let smask_obj_id = builder.objects.len();
                let mut smask_data: Vec<u8> = Vec::new();
                let _ = write!(
                    smask_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceGray \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len()
                );
                smask_data.extend_from_slice(&compressed);
                smask_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: smask_data });
                smask_obj_id
            });

            let compressed_rgb = compress_to_vec_zlib(rgb, 6);
            let obj_id = builder.objects.len();
            let mut obj_data: Vec<u8> = Vec::new();
            let smask_ref = smask_id
                .map(|id| format!(" /SMask {id} 0 R"))
                .unwrap_or_default();
            let _ = write!(
                obj_data,
                "<< /Type /XObject /Subtype /Image \
                 /Width {} /Height {} \
                 /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 \
                 /Filter /FlateDecode \
                 /Length {}{} >>\nstream\n",
                image.width_px,
                image.height_px,
                compressed_rgb.len(),
                smask_ref
            );
            obj_data.extend_from_slice(&compressed_rgb);
            obj_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: obj_data });
            obj_id
        }
    }
}

fn write_placeholder(stream: &mut String, x: f64, y: f64, w: f64, h: f64) {
    let _ = write!(stream, "q\n0.9 0.9 0.9 rg\n{x:.2} {y:.2} {w:.2} {h:.2} re\nf\nQ\n");
}

fn write_borders(stream: &mut String, x: f64, y: f64, w: f64, h: f64, bw: &Edges, color: &Color) {
    if bw.top <= 0.0 && bw.right <= 0.0 && bw.bottom <= 0.0 && bw.left <= 0.0 {
        return;
    }

    let uniform = (bw.top - bw.right).abs() < 0.001
        && (bw.right - bw.bottom).abs() < 0.001
        && (bw.bottom - bw.left).abs() < 0.001;

    if uniform {
        let _ = write!(
            stream,
            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{x:.2} {y:.2} {w:.2} {h:.2} re\nS\nQ\n",
            color.r, color.g, color.b, bw.top
        );
        return;
    }

    let mut side = |width: f64, x1: f64, y1: f64, x2: f64, y2: f64| {
        if width > 0.0 {
            let _ = write!(
                stream,
                "q\n{:.3} {:.3} {:.3} RG\n{width:.2} w\n{x1:.2} {y1:.2} m\n{x2:.2} {y2:.2} l\nS\nQ\n",
                color.r, color.g, color.b
            );
        }
    };
    side(bw.top, x, y + h, x + w, y + h);
    side(bw.bottom, x, y, x + w, y);
    side(bw.left, x, y, x, y + h);
    side(bw.right, x + w, y, x + w, y + h);
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode text for a `Tj` operator under WinAnsiEncoding, escaping PDF
/// string delimiters and writing non-ASCII bytes as octal escapes.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Codepoints in 0x20..=0x7E and
/// 0xA0..=0xFF map directly; the 0x80..=0x9F range holds smart quotes,
/// bullets, dashes and a few Latin extras.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextLine;
    use crate::style::FontStyle;

    fn text_element(text: &str) -> LayoutElement {
        LayoutElement {
            x: 36.0,
            y: 36.0,
            width: 100.0,
            height: 14.0,
            draw: DrawCommand::Text {
                lines: vec![TextLine {
                    x: 36.0,
                    y: 44.0,
                    width: 50.0,
                    text: text.to_string(),
                }],
                font_family: "Helvetica".to_string(),
                font_size: 10.0,
                font_weight: 400,
                font_style: FontStyle::Normal,
                letter_spacing: 0.0,
                color: Color::BLACK,
            },
            children: Vec::new(),
        }
    }

    fn page_with(elements: Vec<LayoutElement>) -> LayoutPage {
        LayoutPage {
            width: 595.28,
            height: 841.89,
            background: None,
            elements,
        }
    }

    #[test]
    fn test_structural_markers() {
        let fc = FontContext::new();
        let pdf = PdfWriter::new().write(&[page_with(vec![])], &PdfMetadata::default(), &fc);
        assert!(pdf.starts_with(b"%PDF-1.7"));
        let tail = String::from_utf8_lossy(&pdf[pdf.len().saturating_sub(200)..]).to_string();
        assert!(tail.contains("startxref"));
        assert!(tail.trim_end().ends_with("%%EOF"));
        let body = String::from_utf8_lossy(&pdf);
        assert!(body.contains("/Type /Catalog"));
        assert!(body.contains("/Count 1"));
    }

    #[test]
    fn test_page_count_in_pages_dict() {
        let fc = FontContext::new();
        let pdf = PdfWriter::new().write(
            &[page_with(vec![]), page_with(vec![]), page_with(vec![])],
            &PdfMetadata::default(),
            &fc,
        );
        let body = String::from_utf8_lossy(&pdf);
        assert!(body.contains("/Count 3"));
    }

    #[test]
    fn test_info_dict_present_when_title_set() {
        let fc = FontContext::new();
        let meta = PdfMetadata {
            title: Some("Ada (Lovelace)".to_string()),
            author: None,
        };
        let pdf = PdfWriter::new().write(&[page_with(vec![])], &meta, &fc);
        let body = String::from_utf8_lossy(&pdf);
        assert!(body.contains("/Title (Ada \\(Lovelace\\))"));
        assert!(body.contains("/Info"));
    }

    #[test]
    fn test_bold_text_registers_bold_font() {
        let fc = FontContext::new();
        let mut el = text_element("hi");
        if let DrawCommand::Text { font_weight, .. } = &mut el.draw {
            *font_weight = 700;
        }
        let pdf = PdfWriter::new().write(&[page_with(vec![el])], &PdfMetadata::default(), &fc);
        let body = String::from_utf8_lossy(&pdf);
        assert!(body.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(encode_winansi("abc"), "abc");
        assert_eq!(encode_winansi("(x)"), "\\(x\\)");
        // En dash maps to 0x96 as an octal escape; unmapped chars become '?'.
        assert_eq!(encode_winansi("\u{2013}"), "\\226");
        assert_eq!(encode_winansi("\u{4e16}"), "?");
    }

    fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .rposition(|w| w == needle)
    }

    #[test]
    fn test_xref_offsets_are_valid() {
        let fc = FontContext::new();
        let pdf = PdfWriter::new().write(
            &[page_with(vec![text_element("check")])],
            &PdfMetadata::default(),
            &fc,
        );

        // Offsets are byte positions, so the check stays in byte space;
        // compressed streams make the file non-UTF-8.
        let xref_pos = rfind_bytes(&pdf, b"xref\n0 ").unwrap();
        let sx = rfind_bytes(&pdf, b"startxref\n").unwrap();
        let sx_line = &pdf[sx + 10..];
        let end = sx_line.iter().position(|&b| b == b'\n').unwrap();
        let startxref: usize = std::str::from_utf8(&sx_line[..end])
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_pos);

        // Every in-use offset in the table must point at "N 0 obj".
        let table = &pdf[xref_pos..sx];
        let text = String::from_utf8_lossy(table);
        for (i, line) in text.lines().skip(2).enumerate() {
            if !line.ends_with("n ") {
                break;
            }
            let offset: usize = line[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert_eq!(&pdf[offset..offset + expected.len()], expected.as_bytes());
        }
    }
}
