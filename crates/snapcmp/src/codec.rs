use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image")]
    Encode(#[source] image::ImageError),
}

/// Storage encoding for snapshots.
///
/// The comparator uses it to round-trip a candidate before declaring a
/// difference, so implementations must be deterministic.
pub trait Codec: Send + Sync {
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;
}

/// Lossless PNG, the on-disk format of reference snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl Codec for PngCodec {
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(CodecError::Encode)?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(CodecError::Decode)
    }
}
