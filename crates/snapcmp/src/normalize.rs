//! Conversion of arbitrary bitmaps into the canonical byte layout the
//! comparator works on.
//!
//! Canonical layout: row-major RGBA, 8 bits per channel, no row padding,
//! color channels premultiplied by alpha, sRGB. Every bitmap is re-rendered
//! into a fresh buffer, even one that is already RGBA8, so that two images
//! with the same appearance always produce the same bytes.

use image::RgbaImage;
use thiserror::Error;

use crate::bitmap::{Bitmap, Dimensions};

pub const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("pixel source is unavailable")]
    NoPixelSource,

    #[error("image has no pixels ({0})")]
    Empty(Dimensions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBuffer {
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

impl CanonicalBuffer {
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn normalize(bitmap: &dyn Bitmap) -> Result<CanonicalBuffer, DecodeFailure> {
    let declared = bitmap.dimensions();
    if declared.is_empty() {
        return Err(DecodeFailure::Empty(declared));
    }

    let source = bitmap.pixel_source().ok_or(DecodeFailure::NoPixelSource)?;
    let mut rgba = source.to_rgba8();
    let dimensions = Dimensions::new(rgba.width(), rgba.height());
    if dimensions.is_empty() {
        return Err(DecodeFailure::Empty(dimensions));
    }

    premultiply(&mut rgba);
    Ok(CanonicalBuffer {
        dimensions,
        bytes: rgba.into_raw(),
    })
}

/// `round(c * a / 255)` without floating point.
pub(crate) fn mul_div255(c: u8, a: u8) -> u8 {
    let v = c as u32 * a as u32 + 128;
    ((v + (v >> 8)) >> 8) as u8
}

fn premultiply(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let a = px[3];
        if a == u8::MAX {
            continue;
        }
        for c in &mut px.0[..3] {
            *c = mul_div255(*c, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};

    use super::*;
    use crate::bitmap::RasterBitmap;
    use crate::codec::CodecError;

    struct Unreadable;

    impl Bitmap for Unreadable {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            4
        }
        fn scale(&self) -> f32 {
            1.0
        }
        fn pixel_source(&self) -> Option<Cow<'_, DynamicImage>> {
            None
        }
        fn encode(&self) -> Result<Vec<u8>, CodecError> {
            Ok(Vec::new())
        }
    }

    fn raster(img: DynamicImage) -> RasterBitmap {
        RasterBitmap::new(img, 1.0)
    }

    #[test]
    fn zero_width_is_a_decode_failure() {
        let bitmap = raster(DynamicImage::new_rgba8(0, 10));
        assert_eq!(
            normalize(&bitmap),
            Err(DecodeFailure::Empty(Dimensions::new(0, 10)))
        );
    }

    #[test]
    fn zero_height_is_a_decode_failure() {
        let bitmap = raster(DynamicImage::new_rgba8(10, 0));
        assert!(matches!(normalize(&bitmap), Err(DecodeFailure::Empty(_))));
    }

    #[test]
    fn missing_pixel_source_is_a_decode_failure() {
        assert_eq!(normalize(&Unreadable), Err(DecodeFailure::NoPixelSource));
    }

    #[test]
    fn buffer_is_four_bytes_per_pixel() {
        let buf = normalize(&raster(DynamicImage::new_rgba8(7, 3))).unwrap();
        assert_eq!(buf.len(), 7 * 3 * CHANNELS);
        assert_eq!(buf.dimensions(), Dimensions::new(7, 3));
    }

    #[test]
    fn alpha_is_premultiplied() {
        let img = ImageBuffer::from_pixel(1, 1, Rgba([255u8, 100, 0, 128]));
        let buf = normalize(&raster(DynamicImage::ImageRgba8(img))).unwrap();
        assert_eq!(buf.as_bytes(), &[128, 50, 0, 128]);
    }

    #[test]
    fn fully_transparent_pixels_collapse() {
        let a = ImageBuffer::from_pixel(2, 2, Rgba([255u8, 0, 0, 0]));
        let b = ImageBuffer::from_pixel(2, 2, Rgba([0u8, 0, 255, 0]));
        let a = normalize(&raster(DynamicImage::ImageRgba8(a))).unwrap();
        let b = normalize(&raster(DynamicImage::ImageRgba8(b))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_layouts_converge() {
        let rgb = ImageBuffer::from_pixel(3, 2, Rgb([9u8, 9, 9]));
        let gray = ImageBuffer::from_pixel(3, 2, Luma([9u8]));
        let rgba = ImageBuffer::from_pixel(3, 2, Rgba([9u8, 9, 9, 255]));

        let rgb = normalize(&raster(DynamicImage::ImageRgb8(rgb))).unwrap();
        let gray = normalize(&raster(DynamicImage::ImageLuma8(gray))).unwrap();
        let rgba = normalize(&raster(DynamicImage::ImageRgba8(rgba))).unwrap();
        assert_eq!(rgb, rgba);
        assert_eq!(gray, rgba);
    }

    #[test]
    fn sixteen_bit_sources_are_reduced_to_eight() {
        let wide = ImageBuffer::from_pixel(2, 2, Rgba([0xFFFFu16, 0, 0x8080, 0xFFFF]));
        let buf = normalize(&raster(DynamicImage::ImageRgba16(wide))).unwrap();
        assert_eq!(&buf.as_bytes()[..4], &[255, 0, 128, 255]);
    }

    #[test]
    fn mul_div255_matches_rounded_division() {
        for c in [0u8, 1, 77, 128, 254, 255] {
            for a in [0u8, 1, 64, 128, 200, 255] {
                let expected = ((c as f64 * a as f64) / 255.0).round() as u8;
                assert_eq!(mul_div255(c, a), expected, "c={c} a={a}");
            }
        }
    }
}
