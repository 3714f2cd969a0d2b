//! Conference (manual verification) workflow.

mod classification;
mod session;

pub use classification::{classify, Classification, ClassificationCounts};
pub use session::{ConferenceSession, Summary};
