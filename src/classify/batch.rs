//! Parallel classification of many change sets against one table.

use rayon::prelude::*;
use tracing::debug;

use crate::change::ChangeSet;
use crate::error::ClassifyError;

use super::engine::{ClassificationResult, Classifier};

/// Classify every change set in parallel, keeping input order.
///
/// Per-item errors are returned in place. [`ClassifyError::UnknownCategory`]
/// is a table integrity fault and aborts the whole batch instead.
pub fn classify_batch(
    classifier: &Classifier<'_>,
    change_sets: &[ChangeSet],
) -> Result<Vec<Result<ClassificationResult, ClassifyError>>, ClassifyError> {
    debug!("Classifying batch of {} change set(s)", change_sets.len());

    change_sets
        .par_iter()
        .map(|change_set| match classifier.resolve(change_set) {
            Err(fatal @ ClassifyError::UnknownCategory(_)) => Err(fatal),
            other => Ok(other),
        })
        .collect()
}
