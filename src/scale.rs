// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Mapping between network-space and original-image coordinates.

/// Scale descriptor shared by all decoders for one image.
///
/// `scale_x`/`scale_y` convert network-space lengths back to pixel-space;
/// `orig_height`/`orig_width` bound the output canvas. Created once per
/// image and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleContext {
    /// Horizontal network-to-pixel scale factor.
    pub scale_x: f32,
    /// Vertical network-to-pixel scale factor.
    pub scale_y: f32,
    /// Height of the original image in pixels.
    pub orig_height: u32,
    /// Width of the original image in pixels.
    pub orig_width: u32,
}

impl ScaleContext {
    /// Create a scale context from explicit factors and canvas bounds.
    #[must_use]
    pub const fn new(scale_x: f32, scale_y: f32, orig_height: u32, orig_width: u32) -> Self {
        Self {
            scale_x,
            scale_y,
            orig_height,
            orig_width,
        }
    }

    /// Create a scale context from the raw 4-element factor array
    /// `[scale_x, scale_y, orig_height, orig_width]` used by the driver
    /// pipelines.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_factors(factors: [f32; 4]) -> Self {
        Self {
            scale_x: factors[0],
            scale_y: factors[1],
            orig_height: factors[2] as u32,
            orig_width: factors[3] as u32,
        }
    }

    /// Create a scale context for an image padded to a square before being
    /// resized to the model input.
    ///
    /// The image is assumed to be pasted at the top-left of a
    /// `max(width, height)` square, so both axes share one factor:
    /// `max_side / input_size`.
    ///
    /// # Arguments
    ///
    /// * `orig_width` - Width of the original image in pixels.
    /// * `orig_height` - Height of the original image in pixels.
    /// * `input_size` - Side length of the square model input (e.g. 640).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_image_size(orig_width: u32, orig_height: u32, input_size: u32) -> Self {
        let max_side = orig_width.max(orig_height);
        let scale = max_side as f32 / input_size as f32;
        Self {
            scale_x: scale,
            scale_y: scale,
            orig_height,
            orig_width,
        }
    }
}
