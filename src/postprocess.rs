// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Task pipelines turning raw model output buffers into typed results.
//!
//! [`Postprocessor`] owns the model constants (class count, anchor count),
//! the scale context for one decoded image, and the tunable thresholds.
//! Each task method validates the buffer shape up front, then runs decode,
//! suppression, and any per-task reconstruction. Instances are cheap and
//! hold no buffer state between calls.

use image::Rgb;
use ndarray::s;
use rand::Rng;

use crate::classify::{top_k, ClassScore};
use crate::config::PostprocessConfig;
use crate::decode::{decode_boxes, decode_rect, output_view, Candidate};
use crate::error::Result;
use crate::mask::{protos_view, MaskCanvas};
use crate::nms::nms;
use crate::pose::{PoseData, POSE_CHANNELS};
use crate::results::{Detections, Poses, Rect, Segmentations};
use crate::scale::ScaleContext;
use crate::task::Task;

/// Anchor count of the standard 640x640 detection head.
pub const DEFAULT_NUM_ANCHORS: usize = 8400;

/// Decoder for one image's raw output buffers.
///
/// # Example
///
/// ```no_run
/// use yolo_postprocess::{Postprocessor, ScaleContext};
///
/// let scale = ScaleContext::from_image_size(1920, 1080, 640);
/// let postprocessor = Postprocessor::new(scale, 80);
/// # let output = vec![0.0_f32; 84 * 8400];
/// let detections = postprocessor.detect(&output)?;
/// println!("{detections}");
/// # Ok::<(), yolo_postprocess::PostprocessError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Postprocessor {
    scale: ScaleContext,
    num_classes: usize,
    num_anchors: usize,
    config: PostprocessConfig,
}

impl Postprocessor {
    /// Create a postprocessor with default thresholds and the standard
    /// 8400-anchor head.
    ///
    /// # Arguments
    ///
    /// * `scale` - Scale context for the image the buffers were produced
    ///   from.
    /// * `num_classes` - Class channel count of the model.
    #[must_use]
    pub fn new(scale: ScaleContext, num_classes: usize) -> Self {
        Self {
            scale,
            num_classes,
            num_anchors: DEFAULT_NUM_ANCHORS,
            config: PostprocessConfig::new(),
        }
    }

    /// Replace the threshold configuration.
    #[must_use]
    pub const fn with_config(mut self, config: PostprocessConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the anchor count for non-640 input heads.
    #[must_use]
    pub const fn with_num_anchors(mut self, num_anchors: usize) -> Self {
        self.num_anchors = num_anchors;
        self
    }

    /// The scale context this postprocessor decodes into.
    #[must_use]
    pub const fn scale(&self) -> &ScaleContext {
        &self.scale
    }

    /// The active threshold configuration.
    #[must_use]
    pub const fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Decode a detection buffer of shape `[4 + num_classes, num_anchors]`.
    ///
    /// Candidates are kept when their best class score exceeds the
    /// confidence threshold and they survive class-agnostic NMS. Results
    /// are ordered by descending score.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PostprocessError::InvalidInput`] when the buffer
    /// length does not match the expected shape.
    pub fn detect(&self, output: &[f32]) -> Result<Detections> {
        let channels = Task::Detect.head_channels(self.num_classes);
        let view = output_view(output, channels, self.num_anchors)?;
        let candidates = decode_boxes(
            &view,
            self.num_classes,
            &self.scale,
            self.config.confidence_threshold,
        );
        let keep = self.suppress(&candidates);

        let mut detections = Detections::new();
        for &idx in &keep {
            let candidate = candidates[idx];
            detections.push(candidate.score, candidate.rect, candidate.class_id);
        }
        Ok(detections)
    }

    /// Decode a segmentation buffer of shape
    /// `[36 + num_classes, num_anchors]` plus its `[32, 25600]` prototype
    /// tensor.
    ///
    /// Box handling matches [`detect`](Self::detect); each surviving
    /// candidate additionally gets a full-canvas mask layer composited in
    /// score order onto a shared canvas, so later layers contain earlier
    /// candidates' paint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PostprocessError::InvalidInput`] when either buffer
    /// length does not match its expected shape.
    pub fn segment(&self, output: &[f32], protos: &[f32]) -> Result<Segmentations> {
        let channels = Task::Segment.head_channels(self.num_classes);
        let view = output_view(output, channels, self.num_anchors)?;
        let protos = protos_view(protos)?;
        let candidates = decode_boxes(
            &view,
            self.num_classes,
            &self.scale,
            self.config.confidence_threshold,
        );
        let keep = self.suppress(&candidates);

        let anchors = view.t();
        let mut rng = rand::thread_rng();
        let mut canvas = MaskCanvas::new(&self.scale);
        let mut segmentations = Segmentations::new();
        for &idx in &keep {
            let candidate = candidates[idx];
            let row = anchors.row(candidate.anchor);
            let coeffs = row.slice(s![4 + self.num_classes..channels]);
            let color = Rgb([
                rng.gen_range(0..255),
                rng.gen_range(0..255),
                rng.gen_range(0..255),
            ]);
            let layer = canvas.composite(
                coeffs,
                protos.view(),
                candidate.rect,
                &self.scale,
                self.config.mask_intensity,
                color,
            );
            segmentations.push(candidate.score, candidate.rect, candidate.class_id, layer);
        }
        Ok(segmentations)
    }

    /// Decode a pose buffer of shape `[56, num_anchors]`.
    ///
    /// Anchors are kept when the single confidence channel exceeds the
    /// confidence threshold and the box survives NMS. Keypoint coordinates
    /// are scaled to pixel space; keypoint confidences are passed through
    /// unscaled.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PostprocessError::InvalidInput`] when the buffer
    /// length does not match the expected shape.
    pub fn pose(&self, output: &[f32]) -> Result<Poses> {
        let view = output_view(output, POSE_CHANNELS, self.num_anchors)?;
        let anchors = view.t();

        let mut candidates: Vec<(Rect, f32, usize)> = Vec::new();
        for (i, row) in anchors.outer_iter().enumerate() {
            let confidence = row[4];
            if confidence <= self.config.confidence_threshold {
                continue;
            }
            let rect = decode_rect(row[0], row[1], row[2], row[3], &self.scale);
            candidates.push((rect, confidence, i));
        }

        let boxes: Vec<([f32; 4], f32)> = candidates
            .iter()
            .map(|&(rect, confidence, _)| (rect.as_xyxy(), confidence))
            .collect();
        let keep = nms(
            &boxes,
            self.config.score_threshold,
            self.config.iou_threshold,
        );

        let mut poses = Poses::new();
        for &idx in &keep {
            let (rect, confidence, anchor) = candidates[idx];
            let row = anchors.row(anchor);
            let keypoints: Vec<f32> = row.slice(s![5..POSE_CHANNELS]).iter().copied().collect();
            poses.push(confidence, rect, PoseData::from_slice(&keypoints, &self.scale));
        }
        Ok(poses)
    }

    /// Rank a classification score slice, highest first.
    ///
    /// Takes the configured top-K, capped at the slice length; short inputs
    /// return fewer entries rather than erroring.
    #[must_use]
    pub fn classify(&self, output: &[f32]) -> Vec<ClassScore> {
        top_k(output, self.config.top_k)
    }

    /// Class-agnostic NMS over decoded candidates, returning kept indices
    /// in descending-score order.
    fn suppress(&self, candidates: &[Candidate]) -> Vec<usize> {
        let boxes: Vec<([f32; 4], f32)> = candidates
            .iter()
            .map(|c| (c.rect.as_xyxy(), c.score))
            .collect();
        nms(
            &boxes,
            self.config.score_threshold,
            self.config.iou_threshold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostprocessError;
    use crate::mask::{PROTO_CHANNELS, PROTO_SIZE};
    use crate::pose::NUM_KEYPOINTS;

    /// Build a zeroed column-major `[channels, anchors]` buffer with the
    /// given `(channel, value)` pairs written at one anchor.
    fn buffer_with_anchor(
        channels: usize,
        anchors: usize,
        anchor: usize,
        values: &[(usize, f32)],
    ) -> Vec<f32> {
        let mut buffer = vec![0.0_f32; channels * anchors];
        for &(channel, value) in values {
            buffer[channel * anchors + anchor] = value;
        }
        buffer
    }

    fn identity_scale() -> ScaleContext {
        ScaleContext::new(1.0, 1.0, 640, 640)
    }

    #[test]
    fn test_detect_single_candidate() {
        let postprocessor = Postprocessor::new(identity_scale(), 80);
        let buffer = buffer_with_anchor(
            84,
            DEFAULT_NUM_ANCHORS,
            0,
            &[(0, 320.0), (1, 320.0), (2, 100.0), (3, 200.0), (9, 0.9)],
        );

        let detections = postprocessor.detect(&buffer).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections.classes[0], 5);
        assert!((detections.scores[0] - 0.9).abs() < 1e-6);
        assert_eq!(detections.rects[0], Rect::new(270, 220, 100, 200));
    }

    #[test]
    fn test_detect_rejects_wrong_length() {
        let postprocessor = Postprocessor::new(identity_scale(), 80);
        let err = postprocessor.detect(&[0.0; 10]).unwrap_err();
        assert!(matches!(err, PostprocessError::InvalidInput(_)));
    }

    #[test]
    fn test_detect_empty_buffer_yields_empty_result() {
        let postprocessor = Postprocessor::new(identity_scale(), 80);
        let buffer = vec![0.0_f32; 84 * DEFAULT_NUM_ANCHORS];
        let detections = postprocessor.detect(&buffer).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_detect_nms_suppresses_overlaps() {
        let postprocessor = Postprocessor::new(identity_scale(), 80);
        let mut buffer = buffer_with_anchor(
            84,
            DEFAULT_NUM_ANCHORS,
            0,
            &[(0, 320.0), (1, 320.0), (2, 100.0), (3, 100.0), (4, 0.9)],
        );
        // Near-duplicate of anchor 0 with a lower score.
        for &(channel, value) in &[(0, 322.0_f32), (1, 322.0), (2, 100.0), (3, 100.0), (4, 0.8)] {
            buffer[channel * DEFAULT_NUM_ANCHORS + 1] = value;
        }
        // Distant box that must survive.
        for &(channel, value) in &[(0, 100.0_f32), (1, 100.0), (2, 50.0), (3, 50.0), (4, 0.7)] {
            buffer[channel * DEFAULT_NUM_ANCHORS + 2] = value;
        }

        let detections = postprocessor.detect(&buffer).unwrap();

        assert_eq!(detections.len(), 2);
        assert!((detections.scores[0] - 0.9).abs() < 1e-6);
        assert!((detections.scores[1] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_detect_custom_anchor_count() {
        let scale = ScaleContext::from_image_size(1280, 1280, 640);
        let postprocessor = Postprocessor::new(scale, 3).with_num_anchors(100);
        let buffer = buffer_with_anchor(
            7,
            100,
            50,
            &[(0, 64.0), (1, 64.0), (2, 32.0), (3, 32.0), (6, 0.6)],
        );

        let detections = postprocessor.detect(&buffer).unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections.classes[0], 2);
        assert_eq!(detections.rects[0], Rect::new(96, 96, 64, 64));
    }

    #[test]
    fn test_segment_emits_full_canvas_masks() {
        let postprocessor = Postprocessor::new(identity_scale(), 1).with_num_anchors(100);
        let channels = 4 + 1 + PROTO_CHANNELS;
        let mut values = vec![(0, 320.0), (1, 320.0), (2, 100.0), (3, 100.0), (4, 0.9)];
        for coeff in 0..PROTO_CHANNELS {
            values.push((5 + coeff, 1.0));
        }
        let buffer = buffer_with_anchor(channels, 100, 10, &values);
        let protos = vec![1.0_f32; PROTO_CHANNELS * PROTO_SIZE * PROTO_SIZE];

        let segmentations = postprocessor.segment(&buffer, &protos).unwrap();

        assert_eq!(segmentations.len(), 1);
        assert_eq!(segmentations.classes[0], 0);
        assert!((segmentations.scores[0] - 0.9).abs() < 1e-6);
        assert_eq!(segmentations.rects[0], Rect::new(270, 270, 100, 100));
        assert_eq!(segmentations.masks[0].dimensions(), (640, 640));
    }

    #[test]
    fn test_segment_rejects_bad_protos() {
        let postprocessor = Postprocessor::new(identity_scale(), 1).with_num_anchors(100);
        let buffer = vec![0.0_f32; (4 + 1 + PROTO_CHANNELS) * 100];
        let err = postprocessor.segment(&buffer, &[0.0; 10]).unwrap_err();
        assert!(matches!(err, PostprocessError::InvalidInput(_)));
    }

    #[test]
    fn test_pose_single_candidate() {
        let scale = ScaleContext::new(2.0, 2.0, 1280, 1280);
        let postprocessor = Postprocessor::new(scale, 1);
        let mut values = vec![(0, 320.0), (1, 320.0), (2, 100.0), (3, 200.0), (4, 0.9)];
        for kp in 0..NUM_KEYPOINTS {
            values.push((5 + kp * 3, 10.0 + kp as f32));
            values.push((6 + kp * 3, 20.0 + kp as f32));
            values.push((7 + kp * 3, 0.8));
        }
        let buffer = buffer_with_anchor(POSE_CHANNELS, DEFAULT_NUM_ANCHORS, 0, &values);

        let poses = postprocessor.pose(&buffer).unwrap();

        assert_eq!(poses.len(), 1);
        assert!((poses.scores[0] - 0.9).abs() < 1e-6);
        assert_eq!(poses.rects[0], Rect::new(540, 440, 200, 400));
        let pose = &poses.poses[0];
        assert_eq!(pose.points[0], (20.0, 40.0));
        assert_eq!(pose.points[16], (52.0, 72.0));
        assert!((pose.scores[16] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_pose_low_confidence_yields_empty() {
        let postprocessor = Postprocessor::new(identity_scale(), 1);
        let buffer = vec![0.1_f32; POSE_CHANNELS * DEFAULT_NUM_ANCHORS];
        let poses = postprocessor.pose(&buffer).unwrap();
        assert!(poses.is_empty());
    }

    #[test]
    fn test_classify_respects_configured_top_k() {
        let config = PostprocessConfig::new().with_top_k(3);
        let postprocessor = Postprocessor::new(identity_scale(), 5).with_config(config);
        let ranked = postprocessor.classify(&[0.1, 0.5, 0.3, 0.9, 0.2]);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].class_id, 3);
        assert_eq!(ranked[1].class_id, 1);
        assert_eq!(ranked[2].class_id, 2);
    }

    #[test]
    fn test_classify_short_input_returns_all() {
        let postprocessor = Postprocessor::new(identity_scale(), 4);
        let ranked = postprocessor.classify(&[0.4, 0.1, 0.6, 0.2]);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].class_id, 2);
    }
}
