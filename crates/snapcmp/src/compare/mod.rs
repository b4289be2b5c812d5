pub mod diff;
pub mod message;

use serde::Serialize;
use tracing::{debug, warn};

use crate::bitmap::{Bitmap, RasterBitmap};
use crate::codec::{Codec, PngCodec};
use crate::normalize::{CanonicalBuffer, normalize};
use crate::precision::Precision;

pub use self::diff::synthesize;
pub use self::message::failure_message;

/// Classification of a reference/candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// Byte-identical, or within tolerance.
    Same,
    /// Canonical buffers differ by more than the tolerance allows.
    Different { total: usize, differing: usize },
    /// A side failed to decode, had no pixels, or the dimensions differ.
    Invalid,
}

impl ComparisonOutcome {
    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same)
    }

    /// Percentage of differing bytes, for `Different` outcomes.
    pub fn difference_percentage(&self) -> Option<f64> {
        match *self {
            Self::Different { total, differing } if total > 0 => {
                Some(differing as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Compare a candidate against a reference, round-tripping the candidate
/// through PNG when the first pass finds a difference.
pub fn compare(
    reference: &dyn Bitmap,
    candidate: &dyn Bitmap,
    precision: Precision,
) -> ComparisonOutcome {
    compare_with(&PngCodec, reference, candidate, precision)
}

/// Four steps, first match wins:
///
/// 1. Undecodable, empty, or differently sized operands are `Invalid`.
/// 2. Identical canonical buffers are `Same`.
/// 3. The candidate is encoded with `codec`, decoded and normalized again;
///    if that matches the reference buffer the pair is `Same`.
/// 4. Mismatching bytes between the reference and the round-tripped
///    candidate are counted and checked against `precision`.
///
/// Only the candidate is round-tripped. The reference is assumed to already
/// be in its stored form; a reference that went through a lossy codec at
/// some other time can make step 4 over- or under-count.
pub fn compare_with(
    codec: &dyn Codec,
    reference: &dyn Bitmap,
    candidate: &dyn Bitmap,
    precision: Precision,
) -> ComparisonOutcome {
    let (reference_dims, candidate_dims) = (reference.dimensions(), candidate.dimensions());
    if reference_dims != candidate_dims {
        debug!(%reference_dims, %candidate_dims, "dimension mismatch");
        return ComparisonOutcome::Invalid;
    }

    let reference_buf = match normalize(reference) {
        Ok(buf) => buf,
        Err(e) => {
            debug!(error = %e, "reference did not decode");
            return ComparisonOutcome::Invalid;
        }
    };
    let candidate_buf = match normalize(candidate) {
        Ok(buf) => buf,
        Err(e) => {
            debug!(error = %e, "candidate did not decode");
            return ComparisonOutcome::Invalid;
        }
    };
    if reference_buf.dimensions() != candidate_buf.dimensions() {
        debug!("pixel sources disagree with declared dimensions");
        return ComparisonOutcome::Invalid;
    }

    if reference_buf == candidate_buf {
        return ComparisonOutcome::Same;
    }

    let round_tripped = match round_trip(codec, candidate) {
        Some(buf) if buf.dimensions() == reference_buf.dimensions() => buf,
        Some(_) => {
            warn!("round-tripped candidate changed dimensions");
            return ComparisonOutcome::Invalid;
        }
        None => return ComparisonOutcome::Invalid,
    };
    if round_tripped == reference_buf {
        debug!("candidate matches after round-trip");
        return ComparisonOutcome::Same;
    }

    let total = reference_buf.len();
    let differing = count_mismatches(&reference_buf, &round_tripped);
    debug!(total, differing, %precision, "byte mismatch");
    if precision.is_exceeded_by(total, differing) {
        ComparisonOutcome::Different { total, differing }
    } else {
        ComparisonOutcome::Same
    }
}

fn round_trip(codec: &dyn Codec, candidate: &dyn Bitmap) -> Option<CanonicalBuffer> {
    let Some(source) = candidate.pixel_source() else {
        warn!("candidate lost its pixel source");
        return None;
    };
    let encoded = codec
        .encode(&source)
        .map_err(|e| warn!(error = %e, "failed to encode candidate"))
        .ok()?;
    let decoded = codec
        .decode(&encoded)
        .map_err(|e| warn!(error = %e, "failed to decode re-encoded candidate"))
        .ok()?;
    let rebuilt = RasterBitmap::new(decoded, candidate.scale());
    normalize(&rebuilt)
        .map_err(|e| warn!(error = %e, "re-encoded candidate did not normalize"))
        .ok()
}

fn count_mismatches(a: &CanonicalBuffer, b: &CanonicalBuffer) -> usize {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .filter(|(x, y)| x != y)
        .count()
}
