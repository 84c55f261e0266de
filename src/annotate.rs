// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Drawing of decoded results onto images (feature `annotate`).
//!
//! Boxes and label strips follow the fixed red/yellow convention;
//! skeletons use the 18-color pose palette. Fonts are caller-supplied:
//! without one, label strips and text are skipped and boxes still draw.

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_polygon_mut,
    draw_text_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect as PixelRect;

use crate::pose::{PoseData, NUM_KEYPOINTS, SKELETON};
use crate::results::{Detections, Poses, Rect, Segmentations};

/// Box outline color.
pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Label strip fill color.
pub const LABEL_BACKGROUND: Rgb<u8> = Rgb([255, 255, 0]);

/// Label text color.
pub const LABEL_TEXT: Rgb<u8> = Rgb([0, 0, 0]);

/// Height of the label strip drawn along a box's top edge.
const LABEL_HEIGHT: i32 = 30;

/// Box outline thickness.
const BOX_THICKNESS: i32 = 2;

/// Half-thickness of a skeleton bone capsule.
const STICK_WIDTH: f32 = 2.0;

/// Keypoint score below which a joint (and its bones) is not drawn.
pub const DEFAULT_VISIBLE_THRESHOLD: f32 = 0.2;

/// Pose color palette, indexed by keypoint or bone index.
pub const POSE_PALETTE: [[u8; 3]; 18] = [
    [255, 0, 0],
    [255, 85, 0],
    [255, 170, 0],
    [255, 255, 0],
    [170, 255, 0],
    [85, 255, 0],
    [0, 255, 0],
    [0, 255, 85],
    [0, 255, 170],
    [0, 255, 255],
    [0, 170, 255],
    [0, 85, 255],
    [0, 0, 255],
    [85, 0, 255],
    [170, 0, 255],
    [255, 0, 255],
    [255, 0, 170],
    [255, 0, 85],
];

/// Get the palette color for a keypoint or bone index.
#[must_use]
pub fn pose_color(index: usize) -> Rgb<u8> {
    Rgb(POSE_PALETTE[index % POSE_PALETTE.len()])
}

/// Draw detection boxes and labels onto an image.
///
/// # Arguments
///
/// * `image` - Target image, decoded at the original resolution.
/// * `detections` - Decoded detection result.
/// * `labels` - Class names indexed by class id; missing ids fall back to
///   `"object"`.
/// * `font` - Label font; `None` draws boxes only.
pub fn draw_detections(
    image: &mut RgbImage,
    detections: &Detections,
    labels: &[String],
    font: Option<&FontRef<'_>>,
) {
    for i in 0..detections.len() {
        let rect = detections.rects[i];
        draw_box(image, rect, BOX_COLOR, BOX_THICKNESS);
        let name = labels
            .get(detections.classes[i])
            .map(String::as_str)
            .unwrap_or("object");
        let label = format!("{}-{}", name, detections.scores[i]);
        draw_label(image, rect, &label, font);
    }
}

/// Draw segmentation boxes and labels, then blend the mask overlay in.
///
/// The image is averaged 50/50 with the last candidate's mask layer, which
/// carries all earlier candidates' paint; with no candidates the image is
/// left annotated but unblended.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_segmentations(
    image: &mut RgbImage,
    segmentations: &Segmentations,
    labels: &[String],
    font: Option<&FontRef<'_>>,
) {
    for i in 0..segmentations.len() {
        let rect = segmentations.rects[i];
        draw_box(image, rect, BOX_COLOR, BOX_THICKNESS);
        let name = labels
            .get(segmentations.classes[i])
            .map(String::as_str)
            .unwrap_or("object");
        let label = format!("{}-{}", name, segmentations.scores[i]);
        draw_label(image, rect, &label, font);
    }

    if let Some(layer) = segmentations.masks.last() {
        for (dst, src) in image.pixels_mut().zip(layer.pixels()) {
            for c in 0..3 {
                dst.0[c] = ((u16::from(dst.0[c]) + u16::from(src.0[c]) + 1) / 2) as u8;
            }
        }
    }
}

/// Draw pose boxes and skeletons onto an image.
///
/// # Arguments
///
/// * `image` - Target image, decoded at the original resolution.
/// * `poses` - Decoded pose result.
/// * `visible_threshold` - Keypoint score below which joints and their
///   bones are skipped (commonly [`DEFAULT_VISIBLE_THRESHOLD`]).
pub fn draw_poses(image: &mut RgbImage, poses: &Poses, visible_threshold: f32) {
    for i in 0..poses.len() {
        draw_box(image, poses.rects[i], BOX_COLOR, BOX_THICKNESS);
        draw_pose(image, &poses.poses[i], visible_threshold);
    }
}

/// Draw one skeleton: filled joint circles, then capsule-shaped bones.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_pose(image: &mut RgbImage, pose: &PoseData, visible_threshold: f32) {
    for p in 0..NUM_KEYPOINTS {
        if pose.scores[p] < visible_threshold {
            continue;
        }
        let (x, y) = pose.points[p];
        draw_filled_circle_mut(image, (x.round() as i32, y.round() as i32), 2, pose_color(p));
    }

    for (p, edge) in SKELETON.iter().enumerate() {
        if pose.scores[edge[0]] < visible_threshold || pose.scores[edge[1]] < visible_threshold {
            continue;
        }
        let polygon = capsule_polygon(pose.points[edge[0]], pose.points[edge[1]], STICK_WIDTH);
        if polygon.len() >= 3 {
            draw_polygon_mut(image, &polygon, pose_color(p));
        }
    }
}

/// Approximate a bone as a rotated ellipse spanning the two joints.
///
/// Sampled at one-degree steps like the raster it replaces; consecutive and
/// closing duplicates are removed so the polygon stays an open path.
#[allow(clippy::cast_possible_truncation)]
fn capsule_polygon(from: (f32, f32), to: (f32, f32), half_width: f32) -> Vec<Point<i32>> {
    let cx = ((from.0 + to.0) / 2.0) as i32;
    let cy = ((from.1 + to.1) / 2.0) as i32;
    let length = ((from.0 - to.0).powi(2) + (from.1 - to.1).powi(2)).sqrt();
    let angle = (from.1 - to.1).atan2(from.0 - to.0).to_degrees() as i32;
    let theta = (angle as f32).to_radians();

    let a = length / 2.0;
    let (sin, cos) = theta.sin_cos();
    let mut points = Vec::with_capacity(360);
    for step in 0..360 {
        let t = (step as f32).to_radians();
        let ex = a * t.cos();
        let ey = half_width * t.sin();
        let px = (cx as f32 + ex * cos - ey * sin).round() as i32;
        let py = (cy as f32 + ex * sin + ey * cos).round() as i32;
        points.push(Point::new(px, py));
    }
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Draw a hollow box of the given thickness, clamped to the image.
///
/// Corners are inclusive: the pixels at `rect.right()` and `rect.bottom()`
/// are part of the outline.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn draw_box(image: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: i32) {
    let (width, height) = image.dimensions();
    let x1 = rect.x.clamp(0, width as i32 - 1);
    let y1 = rect.y.clamp(0, height as i32 - 1);
    let x2 = rect.right().clamp(0, width as i32 - 1);
    let y2 = rect.bottom().clamp(0, height as i32 - 1);
    if x2 <= x1 || y2 <= y1 {
        return;
    }

    for t in 0..thickness {
        let tx1 = (x1 + t).min(x2);
        let ty1 = (y1 + t).min(y2);
        let tx2 = (x2 - t).max(tx1);
        let ty2 = (y2 - t).max(ty1);
        if tx2 > tx1 && ty2 > ty1 {
            // imageproc rects span left..=left+width-1, so inclusive
            // corners need the +1.
            let outline =
                PixelRect::at(tx1, ty1).of_size((tx2 - tx1 + 1) as u32, (ty2 - ty1 + 1) as u32);
            draw_hollow_rect_mut(image, outline, color);
        }
    }
}

/// Label strip region along a box's top edge, clamped to the image.
///
/// Sized inclusively like [`draw_box`]'s outline, so the strip meets the
/// outline's right edge. `None` for degenerate regions.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn label_strip(rect: Rect, width: u32, height: u32) -> Option<PixelRect> {
    let x1 = rect.x.clamp(0, width as i32 - 1);
    let y1 = rect.y.clamp(0, height as i32 - 1);
    let x2 = rect.right().clamp(0, width as i32 - 1);
    let y2 = (rect.y + LABEL_HEIGHT).clamp(0, height as i32 - 1);
    if x2 > x1 && y2 > y1 {
        Some(PixelRect::at(x1, y1).of_size((x2 - x1 + 1) as u32, (y2 - y1 + 1) as u32))
    } else {
        None
    }
}

/// Draw the label strip along a box's top edge with the label text inside.
/// Skipped entirely without a font.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn draw_label(image: &mut RgbImage, rect: Rect, text: &str, font: Option<&FontRef<'_>>) {
    let Some(font) = font else {
        return;
    };
    let (width, height) = image.dimensions();

    if let Some(strip) = label_strip(rect, width, height) {
        draw_filled_rect_mut(image, strip, LABEL_BACKGROUND);
    }

    let text_x = rect.x.max(0);
    let text_y = rect.y + 5;
    if text_x < width as i32 && text_y >= 0 && text_y < height as i32 {
        let scale = PxScale::from(20.0);
        draw_text_mut(image, LABEL_TEXT, text_x, text_y, scale, font, text);
    }
}
