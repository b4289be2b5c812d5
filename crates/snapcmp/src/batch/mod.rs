mod job;
mod plan;
mod runner;

pub use self::job::{CompareJob, matches_filter};
pub use self::plan::ComparePlan;
