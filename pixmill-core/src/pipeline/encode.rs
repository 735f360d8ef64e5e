//! The fixed quality-reduction transform.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::error::{PipelineError, Result};

/// Encoder quality applied to every recompressed image. Fixed by the
/// processing contract, not configurable.
pub const ENCODE_QUALITY: u8 = 50;

/// A recompressed image, still in its source container format.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    /// Preferred file extension for the container format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Re-encode image bytes at [`ENCODE_QUALITY`] in their original container
/// format, forcing 3-channel color (no alpha, no palette) first.
pub fn recompress(bytes: &[u8]) -> Result<EncodedImage> {
    recompress_at(bytes, ENCODE_QUALITY)
}

fn recompress_at(bytes: &[u8], quality: u8) -> Result<EncodedImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| PipelineError::InvalidImage(format!("unrecognized format: {e}")))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PipelineError::InvalidImage(format!("failed to decode: {e}")))?;

    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| PipelineError::InvalidImage(format!("failed to encode: {e}")))?;
        }
        // Formats without an encoder quality knob re-encode at their
        // defaults; the RGB8 conversion alone drops alpha and palette
        // weight.
        _ => {
            rgb.write_to(&mut out, format)
                .map_err(|e| PipelineError::InvalidImage(format!("failed to encode: {e}")))?;
        }
    }

    Ok(EncodedImage {
        bytes: out.into_inner(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};

    /// A gradient stands in for photographic content: smooth tonal ramps
    /// compress progressively better as quality drops.
    fn photo_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((x + y) * 128 / (width + height)) as u8,
            ])
        });

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn preserves_dimensions_and_container_format() {
        let source = photo_jpeg(96, 64);

        let encoded = recompress(&source).unwrap();

        assert_eq!(encoded.format, ImageFormat::Jpeg);
        assert_eq!(encoded.extension(), "jpg");

        let reopened = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!(reopened.dimensions(), (96, 64));
    }

    #[test]
    fn reduced_quality_beats_a_full_quality_re_encode() {
        let source = photo_jpeg(128, 128);

        let full = recompress_at(&source, 100).unwrap();
        let reduced = recompress(&source).unwrap();

        assert!(reduced.bytes.len() < full.bytes.len());
    }

    #[test]
    fn strips_alpha_down_to_three_channels() {
        let img = RgbaImage::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 128, 64]));
        let mut source = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut source, ImageFormat::Png)
            .unwrap();

        let encoded = recompress(source.get_ref()).unwrap();

        assert_eq!(encoded.format, ImageFormat::Png);
        let reopened = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!(reopened.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let err = recompress(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage(_)));
    }
}
