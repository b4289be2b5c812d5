use std::convert::Infallible;
use std::fmt;

use tracing::debug;

use crate::bitmap::{Bitmap, RasterBitmap};
use crate::codec::{Codec, PngCodec};
use crate::compare::{ComparisonOutcome, compare_with, failure_message, synthesize};
use crate::placeholder::placeholder;
use crate::precision::Precision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Reference,
    Failure,
    Difference,
}

impl ArtifactKind {
    pub const ALL: [Self; 3] = [Self::Reference, Self::Failure, Self::Difference];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Failure => "failure",
            Self::Difference => "difference",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named image attached to a failed comparison.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub image: RasterBitmap,
}

/// Everything a report needs about one comparison.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub outcome: ComparisonOutcome,
    pub message: Option<String>,
    pub artifacts: Vec<Artifact>,
}

impl Verdict {
    pub fn pass(&self) -> bool {
        self.outcome.is_same()
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&RasterBitmap> {
        self.artifacts
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| &a.image)
    }

    pub fn diff_image(&self) -> Option<&RasterBitmap> {
        self.artifact(ArtifactKind::Difference)
    }
}

/// Compare, and on failure build the message and the reference, failure and
/// difference artifacts.
pub fn verify(reference: &dyn Bitmap, candidate: &dyn Bitmap, precision: Precision) -> Verdict {
    verify_with(&PngCodec, reference, candidate, precision)
}

pub fn verify_with(
    codec: &dyn Codec,
    reference: &dyn Bitmap,
    candidate: &dyn Bitmap,
    precision: Precision,
) -> Verdict {
    let outcome = compare_with(codec, reference, candidate, precision);
    let message = failure_message(&outcome, reference, candidate);
    if outcome.is_same() {
        return Verdict {
            outcome,
            message,
            artifacts: Vec::new(),
        };
    }

    let reference_img = renderable(reference);
    let candidate_img = renderable(candidate);
    let difference = match (&reference_img, &candidate_img) {
        (Some(r), Some(c)) => Some(synthesize(r, c)),
        _ => {
            debug!("skipping difference image, an operand has no pixels");
            None
        }
    };

    let mut artifacts = vec![
        Artifact {
            kind: ArtifactKind::Reference,
            image: reference_img.unwrap_or_else(placeholder),
        },
        Artifact {
            kind: ArtifactKind::Failure,
            image: candidate_img.unwrap_or_else(placeholder),
        },
    ];
    if let Some(image) = difference {
        artifacts.push(Artifact {
            kind: ArtifactKind::Difference,
            image,
        });
    }

    Verdict {
        outcome,
        message,
        artifacts,
    }
}

fn renderable(bitmap: &dyn Bitmap) -> Option<RasterBitmap> {
    if bitmap.dimensions().is_empty() {
        return None;
    }
    RasterBitmap::capture(bitmap).filter(|r| !r.dimensions().is_empty())
}

/// Receives the verdict of each named comparison.
pub trait ReportSink {
    type Error;

    fn record(&mut self, name: &str, verdict: &Verdict) -> Result<(), Self::Error>;
}

/// Collects verdicts in memory.
impl ReportSink for Vec<(String, Verdict)> {
    type Error = Infallible;

    fn record(&mut self, name: &str, verdict: &Verdict) -> Result<(), Self::Error> {
        self.push((name.to_owned(), verdict.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgba, RgbaImage};

    use super::*;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RasterBitmap {
        RasterBitmap::new(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color))),
            1.0,
        )
    }

    #[test]
    fn passing_verdict_has_no_message_or_artifacts() {
        let a = solid(4, 4, [1, 2, 3, 255]);
        let v = verify(&a, &a, Precision::EXACT);
        assert!(v.pass());
        assert!(v.message.is_none());
        assert!(v.artifacts.is_empty());
    }

    #[test]
    fn black_against_white_reports_full_difference() {
        let black = solid(10, 10, [0, 0, 0, 0]);
        let white = solid(10, 10, [255, 255, 255, 255]);
        let v = verify(&black, &white, Precision::EXACT);

        assert!(!v.pass());
        let msg = v.message.as_deref().unwrap();
        assert!(msg.contains("100.00%"), "{msg}");

        let kinds: Vec<_> = v.artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ArtifactKind::ALL);
        let diff = v.diff_image().unwrap().image().to_rgba8();
        assert!(diff.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn dimension_mismatch_still_gets_a_difference_image() {
        let v = verify(
            &solid(5, 5, [0, 0, 0, 255]),
            &solid(8, 8, [0, 0, 0, 255]),
            Precision::EXACT,
        );
        assert_eq!(v.outcome, ComparisonOutcome::Invalid);
        let msg = v.message.unwrap();
        assert!(msg.contains("5x5") && msg.contains("8x8"), "{msg}");
        let diff = v.artifacts.last().unwrap();
        assert_eq!(diff.kind, ArtifactKind::Difference);
        assert_eq!((diff.image.width(), diff.image.height()), (8, 8));
    }

    #[test]
    fn empty_candidate_is_replaced_by_placeholder() {
        let reference = solid(6, 6, [9, 9, 9, 255]);
        let candidate = solid(0, 6, [9, 9, 9, 255]);
        let v = verify(&reference, &candidate, Precision::EXACT);

        assert_eq!(v.outcome, ComparisonOutcome::Invalid);
        assert!(v.message.is_some());
        assert!(v.diff_image().is_none());
        let failure = v.artifact(ArtifactKind::Failure).unwrap();
        assert_eq!(
            failure.image().to_rgba8(),
            placeholder().image().to_rgba8()
        );
    }

    #[test]
    fn vec_sink_collects_verdicts() {
        let a = solid(2, 2, [0, 0, 0, 255]);
        let b = solid(2, 2, [255, 0, 0, 255]);
        let mut sink: Vec<(String, Verdict)> = Vec::new();
        sink.record("same", &verify(&a, &a, Precision::EXACT)).unwrap();
        sink.record("changed", &verify(&a, &b, Precision::EXACT)).unwrap();

        let passes: Vec<_> = sink.iter().map(|(n, v)| (n.as_str(), v.pass())).collect();
        assert_eq!(passes, [("same", true), ("changed", false)]);
    }
}
