use image::{DynamicImage, Rgba, RgbaImage};

use crate::bitmap::{Bitmap, RasterBitmap};
use crate::normalize::{CanonicalBuffer, mul_div255, normalize};

/// Render the per-channel absolute difference of two snapshots.
///
/// The canvas covers both operands (max width, max height) at the larger of
/// their scales. `candidate` is drawn first, then `reference` is composited
/// on top with a difference blend, so agreeing pixels come out black and
/// divergent ones bright. An operand with no readable pixels contributes
/// nothing, and pixels beyond an operand's declared size are ignored.
pub fn synthesize(reference: &dyn Bitmap, candidate: &dyn Bitmap) -> RasterBitmap {
    let width = reference.width().max(candidate.width());
    let height = reference.height().max(candidate.height());
    let scale = reference.scale().max(candidate.scale());

    // Premultiplied RGBA while compositing.
    let mut canvas = RgbaImage::new(width, height);

    if let Ok(layer) = normalize(candidate) {
        draw(&mut canvas, &layer, |_, src| src);
    }
    if let Ok(layer) = normalize(reference) {
        draw(&mut canvas, &layer, difference);
    }

    unpremultiply(&mut canvas);
    RasterBitmap::new(DynamicImage::ImageRgba8(canvas), scale)
}

fn draw(
    canvas: &mut RgbaImage,
    layer: &CanonicalBuffer,
    blend: impl Fn([u8; 4], [u8; 4]) -> [u8; 4],
) {
    let (width, height) = canvas.dimensions();
    let row_len = layer.dimensions().width as usize * 4;
    let rows = layer.as_bytes().chunks_exact(row_len).take(height as usize);
    for (y, row) in rows.enumerate() {
        for (x, px) in row.chunks_exact(4).take(width as usize).enumerate() {
            let dst = canvas.get_pixel_mut(x as u32, y as u32);
            let src = [px[0], px[1], px[2], px[3]];
            *dst = Rgba(blend(dst.0, src));
        }
    }
}

/// Absolute channel-wise difference of premultiplied colors, with the alpha
/// union `ao = as + ab - as * ab`.
fn difference(backdrop: [u8; 4], source: [u8; 4]) -> [u8; 4] {
    let (ab, as_) = (backdrop[3], source[3]);
    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = backdrop[i].abs_diff(source[i]);
    }
    out[3] = as_ + (ab - mul_div255(as_, ab));
    out
}

fn unpremultiply(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let a = px[3] as u32;
        if a == 255 {
            continue;
        }
        if a == 0 {
            *px = Rgba([0, 0, 0, 0]);
            continue;
        }
        for c in &mut px.0[..3] {
            *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
