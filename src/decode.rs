// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Box decoding from raw detection output.
//!
//! YOLO detection heads emit a `[4 + num_classes, num_anchors]` matrix:
//! per anchor a grid-space box `(cx, cy, w, h)` followed by one score per
//! class. Decoding scans anchors, picks the best class, filters by the
//! confidence cutoff, and maps surviving boxes to pixel space.

use ndarray::{s, ArrayView2};

use crate::error::{PostprocessError, Result};
use crate::results::Rect;
use crate::scale::ScaleContext;

/// View a flat row-major buffer as a `[channels, anchors]` matrix.
///
/// # Arguments
///
/// * `data` - Flat model output buffer.
/// * `channels` - Expected channel count (rows).
/// * `anchors` - Expected anchor count (columns).
///
/// # Errors
///
/// Returns [`PostprocessError::InvalidInput`] when the buffer length does
/// not equal `channels * anchors`.
pub fn output_view(data: &[f32], channels: usize, anchors: usize) -> Result<ArrayView2<'_, f32>> {
    if data.len() != channels * anchors {
        return Err(PostprocessError::InvalidInput(format!(
            "output buffer holds {} elements, expected {} ({channels} channels x {anchors} anchors)",
            data.len(),
            channels * anchors
        )));
    }
    ArrayView2::from_shape((channels, anchors), data)
        .map_err(|err| PostprocessError::InvalidInput(err.to_string()))
}

/// Candidate box emitted by the decoder, consumed by NMS.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Decoded box in pixel space.
    pub rect: Rect,
    /// Class with the highest score at this anchor.
    pub class_id: usize,
    /// That class's score.
    pub score: f32,
    /// Anchor index the candidate came from. Segmentation uses it to pull
    /// the matching mask-coefficient row after suppression.
    pub anchor: usize,
}

/// Map a grid-space center box to a pixel-space rectangle.
///
/// Coordinates are truncated to integers (cast, not round), matching the
/// decode the rest of the pipeline is calibrated against.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn decode_rect(cx: f32, cy: f32, w: f32, h: f32, scale: &ScaleContext) -> Rect {
    Rect::new(
        ((cx - 0.5 * w) * scale.scale_x) as i32,
        ((cy - 0.5 * h) * scale.scale_y) as i32,
        (w * scale.scale_x) as i32,
        (h * scale.scale_y) as i32,
    )
}

/// Scan a `[4 + num_classes, num_anchors]` output view for candidates.
///
/// Per anchor: argmax over the class-score slice; anchors whose best score
/// does not exceed `confidence_threshold` are dropped silently. Output
/// order is anchor scan order, unsorted.
///
/// # Arguments
///
/// * `output` - Shape-checked `[4 + num_classes, num_anchors]` view.
/// * `num_classes` - Number of class channels following the box channels.
/// * `scale` - Scale context for the decoded image.
/// * `confidence_threshold` - Cutoff the best class score must exceed.
#[must_use]
pub fn decode_boxes(
    output: &ArrayView2<'_, f32>,
    num_classes: usize,
    scale: &ScaleContext,
    confidence_threshold: f32,
) -> Vec<Candidate> {
    let anchors = output.t();
    let mut candidates = Vec::new();

    for (i, row) in anchors.outer_iter().enumerate() {
        let class_scores = row.slice(s![4..4 + num_classes]);

        // Find best class (treat NaN as lowest to avoid panic)
        let (best_class, best_score) = class_scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Less))
            .map(|(idx, &score)| (idx, if score.is_nan() { 0.0 } else { score }))
            .unwrap_or((0, 0.0));

        if best_score <= confidence_threshold {
            continue;
        }

        candidates.push(Candidate {
            rect: decode_rect(row[0], row[1], row[2], row[3], scale),
            class_id: best_class,
            score: best_score,
            anchor: i,
        });
    }

    candidates
}
