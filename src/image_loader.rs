//! # Image Loading
//!
//! Loads the profile photo and background graphics from file paths, data
//! URIs, or raw base64 strings and prepares them for embedding. JPEG bytes
//! pass through without re-encoding (the PDF supports DCTDecode natively);
//! PNG decodes to RGB pixels with a separate alpha channel for SMask
//! transparency.
//!
//! Loading failures are ordinary `Err` values here; the layout engine turns
//! them into an omitted asset, never a failed render.

use std::io::Cursor;

/// A loaded image ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// Decoded RGB pixels plus optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes of alpha. None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// Load an image from a source string: a `data:image/...;base64,` URI, a
/// file path, or raw base64.
pub fn load_image(src: &str) -> Result<LoadedImage, String> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Read only the dimensions, for layout measurement before embedding.
pub fn load_image_dimensions(src: &str) -> Result<(u32, u32), String> {
    let raw_bytes = read_source_bytes(src)?;
    let reader = image::io::Reader::new(Cursor::new(raw_bytes))
        .with_guessed_format()
        .map_err(|e| format!("image format detection error: {e}"))?;
    reader
        .into_dimensions()
        .map_err(|e| format!("failed to read image dimensions: {e}"))
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, String> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 contains '/' too.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|e| format!("failed to read image file '{src}': {e}"));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| format!("base64 decode error: {e}"))
}

fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and component count without decoding pixels; the
/// raw bytes pass through to the PDF.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {e}"))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("failed to read JPEG dimensions: {e}"))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            grayscale: jpeg_is_grayscale(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count.
fn jpeg_is_grayscale(data: &[u8]) -> bool {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            if i + 9 < data.len() {
                return data[i + 9] == 1;
            }
            break;
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    false
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {e}"))?;
    let img = reader
        .decode()
        .map_err(|e| format!("failed to decode PNG: {e}"))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        let a = pixel[3];
        alpha.push(a);
        if a != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(pixels: &[(u8, u8, u8, u8)]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(pixels.len() as u32, 1);
        for (i, &(r, g, b, a)) in pixels.iter().enumerate() {
            img.put_pixel(i as u32, 0, image::Rgba([r, g, b, a]));
        }
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            pixels.len() as u32,
            1,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_magic_byte_detection() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_opaque_png_has_no_alpha_channel() {
        let buf = encode_png(&[(255, 0, 0, 255)]);
        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (1, 1));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert!(alpha.is_none());
            }
            _ => panic!("PNG should decode"),
        }
    }

    #[test]
    fn test_transparent_png_keeps_alpha() {
        let buf = encode_png(&[(0, 255, 0, 128)]);
        let loaded = decode_image_bytes(&buf).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.as_deref(), Some(&[128][..]));
            }
            _ => panic!("PNG should decode"),
        }
    }

    #[test]
    fn test_jpeg_passthrough() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, grayscale } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert!(!grayscale);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_data_uri_roundtrip() {
        use base64::Engine;
        let buf = encode_png(&[(1, 2, 3, 255)]);
        let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
        let loaded = load_image(&format!("data:image/png;base64,{b64}")).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (1, 1));
    }

    #[test]
    fn test_invalid_sources_err() {
        assert!(load_image("data:image/png;base64").is_err());
        assert!(load_image("definitely not base64 ***").is_err());
        assert!(decode_image_bytes(&[0, 1]).is_err());
    }
}
