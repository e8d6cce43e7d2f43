//! Logo field resolution and upload encoding.
//!
//! A logo travels as one untagged string that holds either a hyperlink or a
//! base64-encoded image. `resolve` decides which, checking for a hyperlink
//! first and only then trying base64, and falls back to a placeholder when
//! neither applies.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use ureq::http::Uri;

/// Largest source image accepted by `encode_upload` (4 MB).
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Links with an explicit scheme and a non-empty host.
static SCHEME_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:https?|ftp)://[^\s/?#]+(?:[/?#]\S*)?$").expect("Invalid scheme link regex")
});

/// Scheme-less links such as `www.example.com/logo.png`.
static BARE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("Invalid bare link regex")
});

/// How a logo string should be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// Load the image from this URL.
    Remote(String),
    /// The string was an image embedded as base64.
    Inline(InlineImage),
    /// Absent, empty, or unrecognizable.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("image exceeds the upload limit ({0} bytes)")]
    TooLarge(usize),
    #[error("not a decodable image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

pub fn resolve(logo: Option<&str>) -> LogoSource {
    let Some(logo) = logo.filter(|s| !s.is_empty()) else {
        return LogoSource::Placeholder;
    };
    if is_hyperlink(logo) {
        return LogoSource::Remote(logo.to_string());
    }
    match decode_inline(logo) {
        Some(image) => LogoSource::Inline(image),
        None => LogoSource::Placeholder,
    }
}

/// True when the whole string, not just a part of it, is a hyperlink.
pub fn is_hyperlink(text: &str) -> bool {
    if SCHEME_LINK.is_match(text) {
        return text.parse::<Uri>().is_ok_and(|uri| uri.host().is_some());
    }
    if BARE_LINK.is_match(text) {
        return format!("http://{text}").parse::<Uri>().is_ok();
    }
    false
}

fn decode_inline(text: &str) -> Option<InlineImage> {
    let bytes = BASE64.decode(text).ok()?;
    let format = image::guess_format(&bytes).ok()?;
    // Header only; pixels are decoded by whoever draws the image.
    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .ok()?;
    Some(InlineImage {
        format,
        width,
        height,
        bytes,
    })
}

/// Turn a picked image (any supported format) into the base64 JPEG text the
/// add and edit flows send as `logo`. `quality` is clamped to 1..=100.
pub fn encode_upload(bytes: &[u8], quality: u8) -> Result<String, LogoError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(LogoError::TooLarge(bytes.len()));
    }
    let img = image::load_from_memory(bytes).map_err(|e| LogoError::Decode(e.to_string()))?;
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| LogoError::Encode(e.to_string()))?;
    Ok(BASE64.encode(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(2, 3, Rgba([200, 120, 10, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn absent_and_empty_are_placeholders() {
        assert_eq!(resolve(None), LogoSource::Placeholder);
        assert_eq!(resolve(Some("")), LogoSource::Placeholder);
    }

    #[test]
    fn full_url_is_remote() {
        assert_eq!(
            resolve(Some("https://example.com/logo.png")),
            LogoSource::Remote("https://example.com/logo.png".to_string())
        );
    }

    #[test]
    fn bare_domain_is_remote() {
        assert!(matches!(
            resolve(Some("www.example.com/logo.png")),
            LogoSource::Remote(_)
        ));
    }

    #[test]
    fn partial_link_is_rejected() {
        assert!(!is_hyperlink("see https://example.com/logo.png"));
        assert!(!is_hyperlink("https://example.com/logo.png "));
        assert!(!is_hyperlink("http://"));
        assert_eq!(
            resolve(Some("logo at https://example.com")),
            LogoSource::Placeholder
        );
    }

    #[test]
    fn base64_that_is_not_an_image_falls_back() {
        assert!(!is_hyperlink("aGVsbG8="));
        assert_eq!(resolve(Some("aGVsbG8=")), LogoSource::Placeholder);
    }

    #[test]
    fn base64_png_is_inline() {
        let encoded = BASE64.encode(png_bytes());
        match resolve(Some(&encoded)) {
            LogoSource::Inline(image) => {
                assert_eq!(image.format, ImageFormat::Png);
                assert_eq!((image.width, image.height), (2, 3));
            }
            other => panic!("expected inline image, got {other:?}"),
        }
    }

    #[test]
    fn inline_dimensions_come_from_the_header() {
        let img: RgbaImage = ImageBuffer::from_pixel(1200, 800, Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        match resolve(Some(&BASE64.encode(&buf))) {
            LogoSource::Inline(image) => {
                assert_eq!((image.width, image.height), (1200, 800));
                assert_eq!(image.bytes, buf);
            }
            other => panic!("expected inline image, got {other:?}"),
        }
    }

    #[test]
    fn upload_is_reencoded_as_jpeg() {
        let encoded = encode_upload(&png_bytes(), 0).unwrap();
        match resolve(Some(&encoded)) {
            LogoSource::Inline(image) => {
                assert_eq!(image.format, ImageFormat::Jpeg);
                assert_eq!((image.width, image.height), (2, 3));
            }
            other => panic!("expected inline image, got {other:?}"),
        }
    }

    #[test]
    fn upload_rejects_non_images() {
        assert!(matches!(
            encode_upload(b"definitely not an image", 80),
            Err(LogoError::Decode(_))
        ));
    }

    #[test]
    fn upload_rejects_oversized_input() {
        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(encode_upload(&big, 80), Err(LogoError::TooLarge(_))));
    }
}
