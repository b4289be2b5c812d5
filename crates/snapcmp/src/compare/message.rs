use std::fmt;

use super::ComparisonOutcome;
use crate::bitmap::{Bitmap, Dimensions};

/// Size of one operand as shown in failure messages.
struct SnapshotSize {
    dimensions: Dimensions,
    scale: f32,
}

impl SnapshotSize {
    fn of(bitmap: &dyn Bitmap) -> Self {
        Self {
            dimensions: bitmap.dimensions(),
            scale: bitmap.scale(),
        }
    }
}

impl fmt::Display for SnapshotSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 1.0 {
            write!(f, "{}", self.dimensions)
        } else {
            write!(f, "{} ({}x scale)", self.dimensions, self.scale)
        }
    }
}

/// Human-readable explanation of a failed comparison. `None` for `Same`.
pub fn failure_message(
    outcome: &ComparisonOutcome,
    reference: &dyn Bitmap,
    candidate: &dyn Bitmap,
) -> Option<String> {
    let reference_size = SnapshotSize::of(reference);
    let candidate_size = SnapshotSize::of(candidate);

    match *outcome {
        ComparisonOutcome::Same => None,
        ComparisonOutcome::Invalid => {
            if reference_size.dimensions != candidate_size.dimensions {
                Some(format!(
                    "Newly-taken snapshot ({candidate_size}) does not match reference ({reference_size})."
                ))
            } else {
                Some("Newly-taken snapshot does not match reference.".to_string())
            }
        }
        ComparisonOutcome::Different { total, differing } => {
            let pct = outcome.difference_percentage().unwrap_or(0.0);
            let counts = format!("{differing} of {total} bytes differ ({pct:.2}%)");
            if reference.logical_size() != candidate.logical_size() {
                Some(format!(
                    "Newly-taken snapshot ({candidate_size}) does not match reference ({reference_size}): {counts}."
                ))
            } else {
                Some(format!(
                    "Newly-taken snapshot does not match reference: {counts}."
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::DynamicImage;

    use super::*;
    use crate::bitmap::RasterBitmap;

    fn blank(w: u32, h: u32, scale: f32) -> RasterBitmap {
        RasterBitmap::new(DynamicImage::new_rgba8(w, h), scale)
    }

    #[test]
    fn same_has_no_message() {
        let a = blank(4, 4, 1.0);
        assert_eq!(failure_message(&ComparisonOutcome::Same, &a, &a), None);
    }

    #[test]
    fn invalid_with_different_dimensions_names_both() {
        let msg = failure_message(
            &ComparisonOutcome::Invalid,
            &blank(5, 5, 1.0),
            &blank(8, 8, 1.0),
        )
        .unwrap();
        assert_eq!(
            msg,
            "Newly-taken snapshot (8x8) does not match reference (5x5)."
        );
    }

    #[test]
    fn invalid_with_equal_dimensions_is_generic() {
        let msg = failure_message(
            &ComparisonOutcome::Invalid,
            &blank(0, 5, 1.0),
            &blank(0, 5, 1.0),
        )
        .unwrap();
        assert_eq!(msg, "Newly-taken snapshot does not match reference.");
    }

    #[test]
    fn different_reports_count_and_percentage() {
        let a = blank(10, 10, 1.0);
        let outcome = ComparisonOutcome::Different {
            total: 400,
            differing: 400,
        };
        let msg = failure_message(&outcome, &a, &a).unwrap();
        assert_eq!(
            msg,
            "Newly-taken snapshot does not match reference: 400 of 400 bytes differ (100.00%)."
        );
    }

    #[test]
    fn different_includes_sizes_when_logical_size_changes() {
        let outcome = ComparisonOutcome::Different {
            total: 1600,
            differing: 4,
        };
        let msg = failure_message(&outcome, &blank(20, 20, 2.0), &blank(20, 20, 1.0)).unwrap();
        assert!(msg.contains("(20x20 (2x scale))"), "{msg}");
        assert!(msg.contains("4 of 1600 bytes differ (0.25%)"), "{msg}");
    }
}
