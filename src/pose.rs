// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose keypoint data and skeleton topology.
//!
//! A pose model predicts 17 COCO keypoints per person. This module holds the
//! decoded per-person keypoint record plus the fixed tables presentation
//! code needs: the bone graph and the keypoint display names.

use std::fmt;

use crate::scale::ScaleContext;

/// Number of keypoints predicted per person.
pub const NUM_KEYPOINTS: usize = 17;

/// Channel count of a pose head: box, confidence, then 17 keypoint triples.
pub const POSE_CHANNELS: usize = 5 + NUM_KEYPOINTS * 3;

/// Bone graph joining keypoint indices, drawn between visible endpoints.
pub const SKELETON: [[usize; 2]; 17] = [
    [0, 1],
    [0, 2],
    [1, 3],
    [2, 4],
    [3, 5],
    [4, 6],
    [5, 7],
    [6, 8],
    [7, 9],
    [8, 10],
    [5, 11],
    [6, 12],
    [11, 13],
    [12, 14],
    [13, 15],
    [14, 16],
    [11, 12],
];

/// Keypoint display names in decode order.
pub const KEYPOINT_NAMES: [&str; NUM_KEYPOINTS] = [
    "Nose",
    "Left Eye",
    "Right Eye",
    "Left Ear",
    "Right Ear",
    "Left Shoulder",
    "Right Shoulder",
    "Left Elbow",
    "Right Elbow",
    "Left Wrist",
    "Right Wrist",
    "Left Hip",
    "Right Hip",
    "Left Knee",
    "Right Knee",
    "Left Ankle",
    "Right Ankle",
];

/// Decoded keypoints for one person.
///
/// Both arrays are always exactly [`NUM_KEYPOINTS`] long; index `i` of one
/// pairs with index `i` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseData {
    /// Per-keypoint confidence, unscaled.
    pub scores: [f32; NUM_KEYPOINTS],
    /// Per-keypoint (x, y) position in original-image pixels.
    pub points: [(f32, f32); NUM_KEYPOINTS],
}

impl PoseData {
    /// Decode a raw 51-float keypoint block.
    ///
    /// Element layout is `[x0, y0, conf0, x1, y1, conf1, ...]` in
    /// network-space; positions are scaled to pixel-space, confidences are
    /// passed through unchanged.
    ///
    /// # Arguments
    ///
    /// * `data` - At least `17 * 3` floats from the model output row.
    /// * `scale` - Scale context for the decoded image.
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `17 * 3` elements.
    #[must_use]
    pub fn from_slice(data: &[f32], scale: &ScaleContext) -> Self {
        let mut scores = [0.0; NUM_KEYPOINTS];
        let mut points = [(0.0, 0.0); NUM_KEYPOINTS];
        for i in 0..NUM_KEYPOINTS {
            points[i] = (data[3 * i] * scale.scale_x, data[3 * i + 1] * scale.scale_y);
            scores[i] = data[3 * i + 2];
        }
        Self { scores, points }
    }

    /// Iterate keypoints as `(name, point, confidence)` in decode order.
    pub fn keypoints(&self) -> impl Iterator<Item = (&'static str, (f32, f32), f32)> + '_ {
        KEYPOINT_NAMES
            .iter()
            .zip(self.points.iter().zip(self.scores.iter()))
            .map(|(&name, (&point, &score))| (name, point, score))
    }

    /// Number of keypoints whose confidence exceeds `threshold`.
    #[must_use]
    pub fn visible_count(&self, threshold: f32) -> usize {
        self.scores.iter().filter(|&&s| s > threshold).count()
    }
}

impl fmt::Display for PoseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoseData({NUM_KEYPOINTS} keypoints)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_indices_in_range() {
        for edge in &SKELETON {
            assert!(edge[0] < NUM_KEYPOINTS);
            assert!(edge[1] < NUM_KEYPOINTS);
        }
        assert_eq!(KEYPOINT_NAMES.len(), NUM_KEYPOINTS);
    }

    #[test]
    fn test_from_slice_scaling() {
        let mut data = vec![0.0; NUM_KEYPOINTS * 3];
        // Keypoint 3: grid position (100, 50), confidence 0.7.
        data[9] = 100.0;
        data[10] = 50.0;
        data[11] = 0.7;

        let scale = ScaleContext::new(2.0, 3.0, 1920, 1280);
        let pose = PoseData::from_slice(&data, &scale);

        assert!((pose.points[3].0 - 200.0).abs() < 1e-6);
        assert!((pose.points[3].1 - 150.0).abs() < 1e-6);
        // Confidence is never scaled.
        assert!((pose.scores[3] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_keypoints_iter_names() {
        let scale = ScaleContext::new(1.0, 1.0, 640, 640);
        let pose = PoseData::from_slice(&vec![0.0; 51], &scale);
        let kp: Vec<_> = pose.keypoints().collect();
        assert_eq!(kp.len(), NUM_KEYPOINTS);
        assert_eq!(kp[0].0, "Nose");
        assert_eq!(kp[16].0, "Right Ankle");
    }

    #[test]
    fn test_visible_count() {
        let scale = ScaleContext::new(1.0, 1.0, 640, 640);
        let mut data = vec![0.0; 51];
        data[2] = 0.9; // nose visible
        data[5] = 0.4;
        let pose = PoseData::from_slice(&data, &scale);
        assert_eq!(pose.visible_count(0.5), 1);
        assert_eq!(pose.visible_count(0.3), 2);
    }
}
