// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result containers for decoded YOLO output.
//!
//! One variant struct per task, unified under the [`Predictions`] enum so a
//! caller never has to guess which parallel arrays are populated.

use std::fmt;

use image::RgbImage;

use crate::pose::PoseData;
use crate::task::Task;

/// Axis-aligned rectangle in original-image pixel space.
///
/// Coordinates are truncated to integers at decode time (cast, not round)
/// and may be negative; clamping to the canvas happens only where a mask is
/// composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive) in pixels.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive) in pixels.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Corner representation `[x1, y1, x2, y2]` as used by NMS.
    #[must_use]
    pub fn as_xyxy(&self) -> [f32; 4] {
        #[allow(clippy::cast_precision_loss)]
        [
            self.x as f32,
            self.y as f32,
            self.right() as f32,
            self.bottom() as f32,
        ]
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}x{}}}", self.x, self.y, self.width, self.height)
    }
}

/// Object detection results: parallel class / score / box vectors.
#[derive(Debug, Clone, Default)]
pub struct Detections {
    /// Class id per detection.
    pub classes: Vec<usize>,
    /// Confidence score per detection.
    pub scores: Vec<f32>,
    /// Bounding box per detection.
    pub rects: Vec<Rect>,
}

impl Detections {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one detection. Keeps all parallel vectors the same length.
    pub fn push(&mut self, score: f32, rect: Rect, class_id: usize) {
        self.scores.push(score);
        self.rects.push(rect);
        self.classes.push(class_id);
    }

    /// Number of detections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no detections were kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl fmt::Display for Detections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detection result:")?;
        for i in 0..self.len() {
            writeln!(
                f,
                "{}: {}\t{}   {}",
                i + 1,
                self.classes[i],
                self.scores[i],
                self.rects[i]
            )?;
        }
        Ok(())
    }
}

/// Instance segmentation results.
///
/// Each entry carries a full-canvas colored mask layer. Layers are clones of
/// the running composition canvas, so paint from earlier entries persists
/// into later ones (see [`crate::mask::MaskCanvas`]).
#[derive(Debug, Clone, Default)]
pub struct Segmentations {
    /// Class id per instance.
    pub classes: Vec<usize>,
    /// Confidence score per instance.
    pub scores: Vec<f32>,
    /// Bounding box per instance.
    pub rects: Vec<Rect>,
    /// Full-canvas colored mask layer per instance.
    pub masks: Vec<RgbImage>,
}

impl Segmentations {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instance. Keeps all parallel vectors the same length.
    pub fn push(&mut self, score: f32, rect: Rect, class_id: usize, mask: RgbImage) {
        self.scores.push(score);
        self.rects.push(rect);
        self.classes.push(class_id);
        self.masks.push(mask);
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no instances were kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl fmt::Display for Segmentations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segmentation result:")?;
        for i in 0..self.len() {
            writeln!(
                f,
                "{}: {}\t{}   {}",
                i + 1,
                self.classes[i],
                self.scores[i],
                self.rects[i]
            )?;
        }
        Ok(())
    }
}

/// Pose estimation results: one skeleton per kept person box.
#[derive(Debug, Clone, Default)]
pub struct Poses {
    /// Box confidence per person.
    pub scores: Vec<f32>,
    /// Bounding box per person.
    pub rects: Vec<Rect>,
    /// Decoded keypoints per person.
    pub poses: Vec<PoseData>,
}

impl Poses {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pose. Keeps all parallel vectors the same length.
    pub fn push(&mut self, score: f32, rect: Rect, pose: PoseData) {
        self.scores.push(score);
        self.rects.push(rect);
        self.poses.push(pose);
    }

    /// Number of poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no poses were kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl fmt::Display for Poses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pose result:")?;
        for i in 0..self.len() {
            writeln!(
                f,
                "{}: 1   {}   {}  {}",
                i + 1,
                self.scores[i],
                self.rects[i],
                self.poses[i]
            )?;
        }
        Ok(())
    }
}

/// Decoded output for one image, tagged by task variant.
///
/// The variant is fixed at construction; there are no nullable cross-variant
/// fields to probe.
#[derive(Debug, Clone)]
pub enum Predictions {
    /// Bounding-box detection output.
    Detect(Detections),
    /// Instance segmentation output.
    Segment(Segmentations),
    /// Keypoint estimation output.
    Pose(Poses),
}

impl Predictions {
    /// Number of kept candidates in the active variant.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Detect(d) => d.len(),
            Self::Segment(s) => s.len(),
            Self::Pose(p) => p.len(),
        }
    }

    /// Whether the active variant holds no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The task this result was decoded for.
    #[must_use]
    pub const fn task(&self) -> Task {
        match self {
            Self::Detect(_) => Task::Detect,
            Self::Segment(_) => Task::Segment,
            Self::Pose(_) => Task::Pose,
        }
    }
}

impl fmt::Display for Predictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detect(d) => d.fmt(f),
            Self::Segment(s) => s.fmt(f),
            Self::Pose(p) => p.fmt(f),
        }
    }
}

impl From<Detections> for Predictions {
    fn from(detections: Detections) -> Self {
        Self::Detect(detections)
    }
}

impl From<Segmentations> for Predictions {
    fn from(segmentations: Segmentations) -> Self {
        Self::Segment(segmentations)
    }
}

impl From<Poses> for Predictions {
    fn from(poses: Poses) -> Self {
        Self::Pose(poses)
    }
}
