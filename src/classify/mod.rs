//! Classification engine: candidate collection, keyword tie-breaking and
//! resolution to a single category.

pub mod batch;
pub mod engine;
pub mod pattern;
pub mod scorer;

pub use batch::classify_batch;
pub use engine::{ClassificationResult, Classifier, Confidence};
pub use pattern::{CandidateSource, Candidates, candidates};
pub use scorer::{CategoryScore, best, score};
