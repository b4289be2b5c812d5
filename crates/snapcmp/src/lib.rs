//! Visual regression comparison of reference and captured snapshots.
//!
//! [`compare`] classifies a pair of bitmaps as the same, different, or not
//! comparable; [`verify`] adds a failure message and the reference, failure
//! and difference artifacts. [`SnapshotStore`] keeps references on disk and
//! records new ones on first run.

pub mod bitmap;
pub mod codec;
pub mod compare;
pub mod normalize;
pub mod placeholder;
pub mod precision;
pub mod store;
pub mod verdict;

pub use bitmap::{Bitmap, DEFAULT_SCALE, Dimensions, RasterBitmap};
pub use codec::{Codec, CodecError, PngCodec};
pub use compare::{ComparisonOutcome, compare, compare_with, failure_message, synthesize};
pub use normalize::{CanonicalBuffer, DecodeFailure, normalize};
pub use placeholder::placeholder;
pub use precision::{InvalidPrecision, Precision};
pub use store::{SnapshotResult, SnapshotStore, StoreError};
pub use verdict::{Artifact, ArtifactKind, ReportSink, Verdict, verify, verify_with};
