use std::borrow::Cow;
use std::fmt;

use image::DynamicImage;

use crate::codec::{Codec, CodecError, PngCodec};

/// Scale used when a snapshot does not say how many pixels make up a logical unit.
pub const DEFAULT_SCALE: f32 = 1.0;

/// Pixel dimensions of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What the comparator needs from an image, whatever produced it.
pub trait Bitmap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Pixels per logical unit.
    fn scale(&self) -> f32;

    /// Readable pixels, or `None` when the backing store cannot be rasterized.
    fn pixel_source(&self) -> Option<Cow<'_, DynamicImage>>;

    /// Bytes in the snapshot's storage format.
    fn encode(&self) -> Result<Vec<u8>, CodecError>;

    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// Size in logical units (`pixels / scale`).
    fn logical_size(&self) -> (f32, f32) {
        let scale = self.scale();
        (self.width() as f32 / scale, self.height() as f32 / scale)
    }
}

/// A decoded, in-memory bitmap stored as PNG.
#[derive(Debug, Clone)]
pub struct RasterBitmap {
    image: DynamicImage,
    scale: f32,
}

impl RasterBitmap {
    /// Wrap a decoded image. Non-positive or non-finite scales fall back to
    /// [`DEFAULT_SCALE`].
    pub fn new(image: DynamicImage, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            DEFAULT_SCALE
        };
        Self { image, scale }
    }

    pub fn from_png(bytes: &[u8], scale: f32) -> Result<Self, CodecError> {
        Ok(Self::new(PngCodec.decode(bytes)?, scale))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Copy any bitmap into an owned raster, if its pixels are readable.
    pub fn capture(bitmap: &dyn Bitmap) -> Option<Self> {
        let source = bitmap.pixel_source()?;
        Some(Self::new(source.into_owned(), bitmap.scale()))
    }
}

impl Bitmap for RasterBitmap {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn pixel_source(&self) -> Option<Cow<'_, DynamicImage>> {
        Some(Cow::Borrowed(&self.image))
    }

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        PngCodec.encode(&self.image)
    }
}
