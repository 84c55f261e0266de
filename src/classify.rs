// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classification top-k selection.

use std::fmt::Write as _;

/// One classification entry: class index and its probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    /// Class index into the model's label set.
    pub class_id: usize,
    /// Predicted probability for the class.
    pub score: f32,
}

/// Select the `min(k, len)` highest-scoring classes, sorted descending.
///
/// Ties beyond the score ordering are not guaranteed any particular order.
/// Short inputs simply return fewer entries; a vector with fewer classes
/// than `k` is not an error.
///
/// # Arguments
///
/// * `scores` - Flat probability vector, one entry per class.
/// * `k` - Maximum number of entries to return.
///
/// # Returns
///
/// * `(class_id, score)` pairs in descending score order.
#[must_use]
pub fn top_k(scores: &[f32], k: usize) -> Vec<ClassScore> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(k);
    indices
        .into_iter()
        .map(|class_id| ClassScore {
            class_id,
            score: scores[class_id],
        })
        .collect()
}

/// Render top-k entries as the two-column table the driver pipelines print.
#[must_use]
pub fn format_table(entries: &[ClassScore]) -> String {
    let mut out = String::from("classid probability\n------- -----------\n");
    for entry in entries {
        let _ = writeln!(out, "{:<7} {:.6}", entry.class_id, entry.score);
    }
    out
}
