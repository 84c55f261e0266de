// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Task definitions for YOLO output decoding.
//!
//! This module defines the model tasks whose raw output this library can
//! decode, along with predicates describing what each task produces.

use std::fmt;
use std::str::FromStr;

use crate::mask::PROTO_CHANNELS;
use crate::pose::POSE_CHANNELS;

/// YOLO model task types.
///
/// Each task corresponds to a different output head layout and decoding
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Box detection: a `[4 + classes, anchors]` head decoded into scored
    /// rectangles.
    Detect,
    /// Instance segmentation: the detection head plus 32 mask coefficients
    /// per anchor and a shared prototype tensor.
    Segment,
    /// Pose estimation: a fixed 56-channel head carrying 17 keypoint
    /// triples per anchor.
    Pose,
    /// Whole-image classification: a flat probability vector, one entry
    /// per class.
    Classify,
}

impl Task {
    /// Returns the canonical string representation of the task.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Segment => "segment",
            Self::Pose => "pose",
            Self::Classify => "classify",
        }
    }

    /// Channel count of this task's output head for a model with
    /// `num_classes` classes.
    ///
    /// Detection heads carry 4 box channels plus one score per class;
    /// segmentation heads append the 32 mask coefficients; pose heads have
    /// a fixed 56-channel layout independent of `num_classes`; a
    /// classification head is just the score vector.
    #[must_use]
    pub const fn head_channels(&self, num_classes: usize) -> usize {
        match self {
            Self::Detect => 4 + num_classes,
            Self::Segment => 4 + num_classes + PROTO_CHANNELS,
            Self::Pose => POSE_CHANNELS,
            Self::Classify => num_classes,
        }
    }

    /// Whether decoding this task yields bounding boxes.
    #[must_use]
    pub const fn has_boxes(&self) -> bool {
        matches!(self, Self::Detect | Self::Segment | Self::Pose)
    }

    /// Whether decoding this task yields instance mask layers.
    #[must_use]
    pub const fn has_masks(&self) -> bool {
        matches!(self, Self::Segment)
    }

    /// Whether decoding this task yields keypoints.
    #[must_use]
    pub const fn has_keypoints(&self) -> bool {
        matches!(self, Self::Pose)
    }

    /// Whether decoding this task yields a class probability ranking.
    #[must_use]
    pub const fn has_probs(&self) -> bool {
        matches!(self, Self::Classify)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Task {
    type Err = TaskParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detect" | "detection" | "det" => Ok(Self::Detect),
            "segment" | "segmentation" | "seg" => Ok(Self::Segment),
            "pose" | "keypoint" | "keypoints" => Ok(Self::Pose),
            "classify" | "classification" | "cls" => Ok(Self::Classify),
            _ => Err(TaskParseError(s.to_string())),
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::Detect
    }
}

/// Error returned when parsing an invalid task string.
#[derive(Debug, Clone)]
pub struct TaskParseError(String);

impl fmt::Display for TaskParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid task '{}', expected one of: detect, segment, pose, classify",
            self.0
        )
    }
}

impl std::error::Error for TaskParseError {}
