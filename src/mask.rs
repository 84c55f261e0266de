// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Instance mask reconstruction and compositing.
//!
//! Segmentation models emit 32 mask coefficients per candidate plus a
//! shared `[32, 160x160]` prototype tensor. A candidate's mask is the
//! sigmoid of its coefficient row multiplied against the prototypes,
//! cropped to its box, upscaled to pixel space, and binarized. Candidates
//! are then painted one after another onto a shared color canvas.

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{Rgb, RgbImage};
use ndarray::{ArrayView1, ArrayView2};

use crate::error::{PostprocessError, Result};
use crate::results::Rect;
use crate::scale::ScaleContext;

/// Mask basis count in the prototype tensor.
pub const PROTO_CHANNELS: usize = 32;

/// Side length of the square prototype plane.
pub const PROTO_SIZE: usize = 160;

/// Fixed network-to-prototype downscale (160 / 640). A property of the
/// model family, not a tunable.
const PROTO_RATIO: f32 = 0.25;

/// View a flat prototype buffer as a `[32, 25600]` matrix.
///
/// Each of the 32 rows is one mask basis laid out as a flattened 160x160
/// plane.
///
/// # Errors
///
/// Returns [`PostprocessError::InvalidInput`] when the buffer length does
/// not equal `32 * 25600`.
pub fn protos_view(data: &[f32]) -> Result<ArrayView2<'_, f32>> {
    let plane = PROTO_SIZE * PROTO_SIZE;
    if data.len() != PROTO_CHANNELS * plane {
        return Err(PostprocessError::InvalidInput(format!(
            "prototype buffer holds {} elements, expected {} ({PROTO_CHANNELS} bases x {plane} plane positions)",
            data.len(),
            PROTO_CHANNELS * plane
        )));
    }
    ArrayView2::from_shape((PROTO_CHANNELS, plane), data)
        .map_err(|err| PostprocessError::InvalidInput(err.to_string()))
}

/// Sigmoid activation.
#[must_use]
pub fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Binarize at the 0.5 foreground threshold.
///
/// Strictly greater: a value of exactly 0.5 (e.g. sigmoid of an all-zero
/// mask) stays background.
#[must_use]
pub fn binarize(v: f32) -> f32 {
    if v > 0.5 { 1.0 } else { 0.0 }
}

/// Running color canvas that candidate masks are composited onto.
///
/// Compositing is additive and order-dependent: each candidate adds its
/// color at its foreground pixels with saturating arithmetic, and the layer
/// returned for a candidate is a clone of the canvas at that point. Paint
/// from earlier candidates therefore persists into later candidates'
/// layers. Callers that want per-candidate isolation must use one canvas
/// per candidate; the pipelines deliberately do not.
pub struct MaskCanvas {
    canvas: RgbImage,
    resizer: Resizer,
}

impl MaskCanvas {
    /// Create a zeroed canvas covering the original image.
    #[must_use]
    pub fn new(scale: &ScaleContext) -> Self {
        Self {
            canvas: RgbImage::new(scale.orig_width, scale.orig_height),
            resizer: Resizer::new(),
        }
    }

    /// Reconstruct one candidate's mask and paint it onto the canvas.
    ///
    /// Steps: coefficient x prototype product, sigmoid, crop to the box in
    /// prototype space, bilinear upscale to the box in pixel space,
    /// binarize, scale by `intensity`, then add `color` at every foreground
    /// pixel. The paste region is clamped to the canvas; degenerate regions
    /// paint nothing. Returns a clone of the canvas after this candidate's
    /// paint.
    ///
    /// # Arguments
    ///
    /// * `coeffs` - The candidate's 32-element coefficient row.
    /// * `protos` - Shared prototype tensor, shape `[32, 25600]`.
    /// * `rect` - The candidate's pixel-space box.
    /// * `scale` - Scale context for the decoded image.
    /// * `intensity` - 8-bit value foreground mask pixels take.
    /// * `color` - Tint added at foreground pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn composite(
        &mut self,
        coeffs: ArrayView1<'_, f32>,
        protos: ArrayView2<'_, f32>,
        rect: Rect,
        scale: &ScaleContext,
        intensity: u8,
        color: Rgb<u8>,
    ) -> RgbImage {
        // Clamp the box origin to the canvas; the far edge keeps its decoded
        // position so the crop below sees the true extent.
        let x1 = rect.x.max(0);
        let y1 = rect.y.max(0);
        let x2 = rect.right();
        let y2 = rect.bottom();
        let paste_w = x2 - x1;
        let paste_h = y2 - y1;
        if paste_w <= 0 || paste_h <= 0 {
            return self.canvas.clone();
        }

        // Candidate box in the 160x160 prototype plane.
        let proto_side = PROTO_SIZE as i32;
        let mx1 = (((x1 as f32 / scale.scale_x) * PROTO_RATIO) as i32).clamp(0, proto_side);
        let mx2 = (((x2 as f32 / scale.scale_x) * PROTO_RATIO) as i32).clamp(0, proto_side);
        let my1 = (((y1 as f32 / scale.scale_y) * PROTO_RATIO) as i32).clamp(0, proto_side);
        let my2 = (((y2 as f32 / scale.scale_y) * PROTO_RATIO) as i32).clamp(0, proto_side);
        let crop_w = mx2 - mx1;
        let crop_h = my2 - my1;
        if crop_w <= 0 || crop_h <= 0 {
            return self.canvas.clone();
        }

        // coeffs (1x32) . protos (32x25600) -> 25600, sigmoid into [0, 1].
        let raw = coeffs.dot(&protos);
        let flat: Vec<f32> = raw.iter().map(|&v| sigmoid(v)).collect();

        // Crop the prototype plane to the box and upscale to box size.
        let src_bytes: &[u8] = bytemuck::cast_slice(&flat);
        let src = match Image::from_vec_u8(
            PROTO_SIZE as u32,
            PROTO_SIZE as u32,
            src_bytes.to_vec(),
            PixelType::F32,
        ) {
            Ok(img) => img,
            Err(err) => {
                eprintln!("WARNING ⚠️ Failed to build prototype plane image: {err}. Skipping mask.");
                return self.canvas.clone();
            }
        };
        let mut dst = Image::new(paste_w as u32, paste_h as u32, PixelType::F32);
        let options = ResizeOptions::new()
            .resize_alg(ResizeAlg::Convolution(FilterType::Bilinear))
            .crop(
                f64::from(mx1),
                f64::from(my1),
                f64::from(crop_w),
                f64::from(crop_h),
            );
        if let Err(err) = self.resizer.resize(&src, &mut dst, &options) {
            eprintln!("WARNING ⚠️ Mask resize failed: {err}. Skipping mask.");
            return self.canvas.clone();
        }
        let resized: &[f32] = bytemuck::cast_slice(dst.buffer());

        // Clamp the paste region so it never exceeds the canvas. A region
        // flush with an edge loses its last row/column, as the decode this
        // pipeline is calibrated against has always done.
        let orig_w = scale.orig_width as i32;
        let orig_h = scale.orig_height as i32;
        let clipped_w = if x1 + paste_w >= orig_w {
            orig_w - 1 - x1
        } else {
            paste_w
        };
        let clipped_h = if y1 + paste_h >= orig_h {
            orig_h - 1 - y1
        } else {
            paste_h
        };
        if clipped_w <= 0 || clipped_h <= 0 {
            return self.canvas.clone();
        }

        for dy in 0..clipped_h {
            for dx in 0..clipped_w {
                let v = resized[(dy * paste_w + dx) as usize];
                let value = (binarize(v) * f32::from(intensity)) as u8;
                if value != 0 {
                    let px = self.canvas.get_pixel_mut((x1 + dx) as u32, (y1 + dy) as u32);
                    px.0[0] = px.0[0].saturating_add(color.0[0]);
                    px.0[1] = px.0[1].saturating_add(color.0[1]);
                    px.0[2] = px.0[2].saturating_add(color.0[2]);
                }
            }
        }

        self.canvas.clone()
    }

    /// Consume the canvas, returning the final composition.
    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.canvas
    }
}
