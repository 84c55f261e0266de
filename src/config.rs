// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing configuration.
//!
//! This module defines the [`PostprocessConfig`] struct, which controls the
//! thresholds and constants used when decoding raw model output: confidence
//! cutoff, Non-Maximum Suppression (NMS) thresholds, mask intensity, and the
//! classification top-k count.

/// Configuration for YOLO output post-processing.
///
/// The defaults reproduce the behavior of the YOLOv8 reference pipelines;
/// anything else chains through the builder methods.
///
/// # Example
///
/// ```rust
/// use yolo_postprocess::PostprocessConfig;
///
/// let config = PostprocessConfig::new()
///     .with_confidence(0.4)
///     .with_iou(0.6)
///     .with_top_k(5);
/// ```
#[derive(Debug, Clone)]
pub struct PostprocessConfig {
    /// Confidence cutoff applied while scanning anchors (0.0 to 1.0).
    /// Anchors whose best class score (or box confidence for pose) does not
    /// exceed this value are dropped before NMS.
    pub confidence_threshold: f32,
    /// Score threshold applied by NMS before suppression (0.0 to 1.0).
    /// Candidates below it are discarded up front. With the default decode
    /// cutoff of 0.25 and this default of 0.3 the prefilter does most of its
    /// work on pose/detect scores in the 0.25..0.3 band.
    pub score_threshold: f32,
    /// Intersection over Union (IoU) threshold for NMS (0.0 to 1.0).
    /// Overlapping boxes above this threshold are considered duplicates.
    pub iou_threshold: f32,
    /// Intensity written into binarized mask pixels before compositing.
    pub mask_intensity: u8,
    /// Number of entries returned by the classification selector.
    /// Short score vectors return fewer entries, never an error.
    pub top_k: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            score_threshold: 0.3,
            iou_threshold: 0.5,
            mask_intensity: 200,
            top_k: 10,
        }
    }
}

impl PostprocessConfig {
    /// Create a configuration with the stock pipeline thresholds.
    ///
    /// # Returns
    ///
    /// * A new `PostprocessConfig` carrying the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence cutoff used while scanning anchors.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum score an anchor must exceed (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// * The modified `PostprocessConfig`.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the NMS score prefilter threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum score a candidate must reach to enter
    ///   suppression (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// * The modified `PostprocessConfig`.
    #[must_use]
    pub const fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the `IoU` threshold used by suppression.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Overlap ratio above which the lower-scored box is
    ///   dropped (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// * The modified `PostprocessConfig`.
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the intensity written into binarized mask pixels.
    ///
    /// # Arguments
    ///
    /// * `intensity` - The 8-bit value foreground mask pixels take.
    ///
    /// # Returns
    ///
    /// * The modified `PostprocessConfig`.
    #[must_use]
    pub const fn with_mask_intensity(mut self, intensity: u8) -> Self {
        self.mask_intensity = intensity;
        self
    }

    /// Set the number of entries the classification selector returns.
    ///
    /// # Arguments
    ///
    /// * `k` - The maximum number of (class, score) pairs to return.
    ///
    /// # Returns
    ///
    /// * The modified `PostprocessConfig`.
    #[must_use]
    pub const fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostprocessConfig::default();
        assert!((config.confidence_threshold - 0.25).abs() < f32::EPSILON);
        assert!((config.score_threshold - 0.3).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.mask_intensity, 200);
        assert_eq!(config.top_k, 10);
    }

    #[test]
    fn test_builder_chain() {
        let config = PostprocessConfig::new()
            .with_confidence(0.45)
            .with_score_threshold(0.4)
            .with_iou(0.65)
            .with_mask_intensity(255)
            .with_top_k(3);
        assert!((config.confidence_threshold - 0.45).abs() < f32::EPSILON);
        assert!((config.score_threshold - 0.4).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.65).abs() < f32::EPSILON);
        assert_eq!(config.mask_intensity, 255);
        assert_eq!(config.top_k, 3);
    }
}
