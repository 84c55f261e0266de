// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # YOLO Post-Processing Library
//!
//! [![crates.io](https://img.shields.io/crates/v/yolo-postprocess.svg)](https://crates.io/crates/yolo-postprocess)
//! [![docs.rs](https://docs.rs/yolo-postprocess/badge.svg)](https://docs.rs/yolo-postprocess)
//!
//! Decoding of raw YOLO-family model outputs into typed results, written in
//! Rust. This crate starts where inference ends: feed it the flat `f32`
//! tensors an inference runtime hands back and it produces bounding boxes,
//! instance masks, pose skeletons, or classification rankings.
//!
//! ## Features
//!
//! - **All Decode Tasks** - Detection, instance segmentation, pose
//!   estimation, and classification heads
//! - **Runtime Agnostic** - Consumes plain `f32` slices; pairs with any
//!   inference backend that exposes its output buffers
//! - **Typed Results** - Tagged [`Predictions`] variants instead of
//!   nullable fields; parallel-array collections with `Display` summaries
//! - **Shape Checked** - Buffer lengths are validated up front and
//!   mismatches surface as typed errors, never as panics
//! - **Annotation** - Optional drawing of boxes, masks, and skeletons via
//!   the `annotate` feature
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! yolo-postprocess = "0.1"
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use yolo_postprocess::{Postprocessor, ScaleContext};
//!
//! fn main() -> Result<(), yolo_postprocess::PostprocessError> {
//!     // A 1920x1080 frame was padded square and resized to 640x640.
//!     let scale = ScaleContext::from_image_size(1920, 1080, 640);
//!     let postprocessor = Postprocessor::new(scale, 80);
//!
//!     // Flat [4 + 80, 8400] output copied from the inference runtime.
//!     let output = vec![0.0_f32; 84 * 8400];
//!     let detections = postprocessor.detect(&output)?;
//!
//!     println!("{detections}");
//!     Ok(())
//! }
//! ```
//!
//! ## Task-Specific Examples
//!
//! Segmentation additionally takes the prototype tensor and returns one
//! full-canvas mask layer per candidate:
//!
//! ```no_run
//! use yolo_postprocess::{Postprocessor, ScaleContext};
//!
//! # fn main() -> Result<(), yolo_postprocess::PostprocessError> {
//! let scale = ScaleContext::from_image_size(1920, 1080, 640);
//! let postprocessor = Postprocessor::new(scale, 80);
//!
//! # let output = vec![0.0_f32; 116 * 8400];
//! # let protos = vec![0.0_f32; 32 * 25600];
//! let segmentations = postprocessor.segment(&output, &protos)?;
//! for mask in &segmentations.masks {
//!     println!("mask layer {}x{}", mask.width(), mask.height());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Pose heads have a fixed 56-channel layout and decode into 17 named COCO
//! keypoints:
//!
//! ```no_run
//! use yolo_postprocess::{Postprocessor, ScaleContext};
//!
//! # fn main() -> Result<(), yolo_postprocess::PostprocessError> {
//! let scale = ScaleContext::from_image_size(1280, 720, 640);
//! let postprocessor = Postprocessor::new(scale, 1);
//!
//! # let output = vec![0.0_f32; 56 * 8400];
//! let poses = postprocessor.pose(&output)?;
//! for pose in &poses.poses {
//!     for (name, point, score) in pose.keypoints() {
//!         println!("{name}: {point:?} ({score:.2})");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Classification ranks the raw score vector:
//!
//! ```
//! use yolo_postprocess::{Postprocessor, ScaleContext};
//!
//! let scale = ScaleContext::from_image_size(224, 224, 224);
//! let postprocessor = Postprocessor::new(scale, 5);
//!
//! let ranked = postprocessor.classify(&[0.01, 0.7, 0.05, 0.2, 0.04]);
//! assert_eq!(ranked[0].class_id, 1);
//! ```
//!
//! ## Scale Context
//!
//! Decoded coordinates land in original-image pixel space. The mapping is
//! captured by [`ScaleContext`], built either from the original dimensions
//! (square top-left padding assumed) or from a raw factors array:
//!
//! ```
//! use yolo_postprocess::ScaleContext;
//!
//! let scale = ScaleContext::from_image_size(1920, 1080, 640);
//! assert_eq!(scale.scale_x, 3.0);
//!
//! let same = ScaleContext::from_factors([3.0, 3.0, 1080.0, 1920.0]);
//! assert_eq!(scale, same);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`postprocess`] | [`Postprocessor`] task pipelines (detect, segment, pose, classify) |
//! | [`results`] | Output types ([`Predictions`], [`Detections`], [`Segmentations`], [`Poses`], [`Rect`]) |
//! | [`config`] | [`PostprocessConfig`] threshold tuning |
//! | [`scale`] | [`ScaleContext`] output-to-pixel coordinate mapping |
//! | [`decode`] | Box decoding and output-buffer shape validation |
//! | [`nms`] | `IoU` and non-maximum suppression |
//! | [`mask`] | Prototype-based mask reconstruction ([`MaskCanvas`]) |
//! | [`pose`] | Keypoint decoding, COCO skeleton and names |
//! | [`classify`] | Top-K ranking of classification scores |
//! | [`labels`] | Class-name label file loading |
//! | [`task`] | [`Task`] variants |
//! | [`error`] | Error types ([`PostprocessError`], [`Result`]) |
//! | `annotate` | Drawing of boxes/masks/skeletons (feature `annotate`) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Image annotation via `imageproc` and `ab_glyph` (default) |
//!
//! ## License
//!
//! Licensed under [AGPL-3.0](https://ultralytics.com/license) for
//! open-source use.

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod classify;
pub mod config;
pub mod decode;
pub mod error;
pub mod labels;
pub mod mask;
pub mod nms;
pub mod pose;
pub mod postprocess;
pub mod results;
pub mod scale;
pub mod task;

// Re-export main types for convenience
pub use config::PostprocessConfig;
pub use error::{PostprocessError, Result};
pub use postprocess::{Postprocessor, DEFAULT_NUM_ANCHORS};
pub use results::{Detections, Poses, Predictions, Rect, Segmentations};
pub use scale::ScaleContext;
pub use task::{Task, TaskParseError};

// Re-export the per-task building blocks for callers assembling their own
// pipelines.
pub use classify::{format_table, top_k, ClassScore};
pub use decode::{decode_boxes, decode_rect, output_view, Candidate};
pub use labels::{load_labels, parse_labels};
pub use mask::{protos_view, MaskCanvas, PROTO_CHANNELS, PROTO_SIZE};
pub use nms::{calculate_iou, nms, nms_per_class};
pub use pose::{PoseData, KEYPOINT_NAMES, NUM_KEYPOINTS, POSE_CHANNELS, SKELETON};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // Version should be semver format like "0.1.0"
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "yolo-postprocess");
    }
}
