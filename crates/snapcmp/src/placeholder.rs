use image::{DynamicImage, Rgba, RgbaImage};

use crate::bitmap::{DEFAULT_SCALE, RasterBitmap};

const SIZE: u32 = 16;
const CELL: u32 = 4;
const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Stand-in artifact for a snapshot that has nothing to show (zero width or
/// height). Magenta and black checkerboard, so it is never mistaken for content.
pub fn placeholder() -> RasterBitmap {
    let img = RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        if (x / CELL + y / CELL) % 2 == 0 {
            MAGENTA
        } else {
            BLACK
        }
    });
    RasterBitmap::new(DynamicImage::ImageRgba8(img), DEFAULT_SCALE)
}
