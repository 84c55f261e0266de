// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Non-Maximum Suppression over decoded candidate boxes.
//!
//! Suppression follows the classic `NMSBoxes` contract: candidates at or
//! below the score threshold are discarded before any overlap comparison,
//! then greedy selection keeps the best remaining box and drops every
//! candidate overlapping it beyond the `IoU` threshold.

/// Intersection over Union of two corner-form boxes.
///
/// # Arguments
///
/// * `box1` - First box as `[x1, y1, x2, y2]`.
/// * `box2` - Second box as `[x1, y1, x2, y2]`.
///
/// # Returns
///
/// Overlap ratio in `0.0..=1.0`; disjoint or degenerate boxes yield 0.0.
#[must_use]
pub fn calculate_iou(box1: &[f32; 4], box2: &[f32; 4]) -> f32 {
    let inter_w = (box1[2].min(box2[2]) - box1[0].max(box2[0])).max(0.0);
    let inter_h = (box1[3].min(box2[3]) - box1[1].max(box2[1])).max(0.0);
    let intersection = inter_w * inter_h;

    let union = area(box1) + area(box2) - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

fn area(b: &[f32; 4]) -> f32 {
    (b[2] - b[0]) * (b[3] - b[1])
}

/// Non-Maximum Suppression (NMS) over scored boxes.
///
/// Candidates whose score does not exceed `score_threshold` are discarded
/// up front; they are neither kept nor allowed to suppress anything else.
/// Survivors come back in selection order, i.e. descending score.
///
/// # Arguments
///
/// * `boxes` - Corner-form boxes with scores `[(bbox, score)]`.
/// * `score_threshold` - Minimum score a candidate must exceed to enter
///   suppression.
/// * `iou_threshold` - Overlap beyond which the lower-scored box is dropped.
///
/// # Returns
///
/// Indices of boxes to keep.
///
/// # Panics
///
/// Panics if `partial_cmp` fails for floating point comparisons (e.g. NaN).
#[must_use]
pub fn nms(boxes: &[([f32; 4], f32)], score_threshold: f32, iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| boxes[i].1 > score_threshold)
        .collect();
    order.sort_by(|&a, &b| boxes[b].1.partial_cmp(&boxes[a].1).unwrap());

    let mut keep = Vec::new();
    while let Some(&best) = order.first() {
        keep.push(best);
        order.retain(|&i| {
            i != best && calculate_iou(&boxes[best].0, &boxes[i].0) <= iou_threshold
        });
    }
    keep
}

/// Per-class Non-Maximum Suppression (NMS) over scored, classed boxes.
///
/// Boxes only compete with boxes of the same class; overlapping candidates
/// of different classes all survive. The built-in pipelines use the
/// class-agnostic [`nms`]; this variant is public for callers that want
/// class-aware suppression.
///
/// # Arguments
///
/// * `boxes` - Corner-form boxes with scores and class ids
///   `[(bbox, score, class_id)]`.
/// * `score_threshold` - Minimum score a candidate must exceed to enter
///   suppression.
/// * `iou_threshold` - Overlap beyond which the lower-scored box is dropped.
///
/// # Returns
///
/// Indices of boxes to keep.
///
/// # Panics
///
/// Panics if `partial_cmp` fails for floating point comparisons (e.g. NaN).
#[must_use]
pub fn nms_per_class(
    boxes: &[([f32; 4], f32, usize)],
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| boxes[i].1 > score_threshold)
        .collect();
    order.sort_by(|&a, &b| boxes[b].1.partial_cmp(&boxes[a].1).unwrap());

    let mut keep = Vec::new();
    while let Some(&best) = order.first() {
        keep.push(best);
        let class = boxes[best].2;
        order.retain(|&i| {
            i != best
                && (boxes[i].2 != class
                    || calculate_iou(&boxes[best].0, &boxes[i].0) <= iou_threshold)
        });
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_iou() {
        let box1 = [0.0, 0.0, 10.0, 10.0];
        let box2 = [2.0, 2.0, 12.0, 12.0];
        let iou = calculate_iou(&box1, &box2);
        assert!((iou - 0.470_588).abs() < 0.001); // 64 / (100 + 100 - 64)
    }

    #[test]
    fn test_iou_disjoint() {
        let box1 = [0.0, 0.0, 10.0, 10.0];
        let box2 = [20.0, 20.0, 30.0, 30.0];
        assert!(calculate_iou(&box1, &box2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_iou_degenerate_boxes() {
        let point = [5.0, 5.0, 5.0, 5.0];
        assert!(calculate_iou(&point, &point).abs() < f32::EPSILON);
    }

    #[test]
    fn test_nms() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9),
            ([1.0, 1.0, 11.0, 11.0], 0.8),
            ([100.0, 100.0, 110.0, 110.0], 0.95),
        ];
        let keep = nms(&boxes, 0.0, 0.5);
        // Survivors in descending-score order; the overlapping 0.8 box is gone.
        assert_eq!(keep, vec![2, 0]);
    }

    #[test]
    fn test_nms_empty() {
        let keep = nms(&[], 0.0, 0.5);
        assert!(keep.is_empty());
    }

    #[test]
    fn test_nms_single() {
        let boxes = vec![([0.0, 0.0, 10.0, 10.0], 0.9)];
        let keep = nms(&boxes, 0.3, 0.5);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_nms_score_prefilter() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9),
            ([100.0, 100.0, 110.0, 110.0], 0.2), // non-overlapping but below threshold
        ];
        let keep = nms(&boxes, 0.3, 0.5);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_nms_survivors_disjoint() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9),
            ([2.0, 2.0, 12.0, 12.0], 0.85),
            ([4.0, 4.0, 14.0, 14.0], 0.8),
            ([50.0, 50.0, 60.0, 60.0], 0.7),
        ];
        let keep = nms(&boxes, 0.0, 0.4);
        for (n, &i) in keep.iter().enumerate() {
            for &j in &keep[n + 1..] {
                assert!(calculate_iou(&boxes[i].0, &boxes[j].0) <= 0.4);
            }
        }
    }

    #[test]
    fn test_nms_per_class_keeps_other_classes() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            ([1.0, 1.0, 11.0, 11.0], 0.8, 1), // overlapping, different class
            ([100.0, 100.0, 110.0, 110.0], 0.95, 0),
        ];
        let keep = nms_per_class(&boxes, 0.0, 0.5);
        assert_eq!(keep.len(), 3);
    }

    #[test]
    fn test_nms_per_class_suppression() {
        let boxes = vec![
            ([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            ([1.0, 1.0, 11.0, 11.0], 0.8, 0), // overlapping, same class
        ];
        let keep = nms_per_class(&boxes, 0.0, 0.5);
        assert_eq!(keep, vec![0]);
    }
}
