//! Frame compositor.
//!
//! Places the raw face-swap result inside a decorative frame and encodes
//! the result as PNG. The transform is pure: the same `(result, frame,
//! layout)` triple always produces byte-identical output.
//!
//! Drawing order:
//!
//! 1. Transparent canvas sized exactly to the frame.
//! 2. Result resized to its placement and, under the fixed-size policy,
//!    clipped to a rounded rectangle. The clip is applied to a separate
//!    layer, so it can never affect the frame drawn afterwards.
//! 3. Frame drawn last over the whole canvas; transparent cut-outs in the
//!    frame reveal the result underneath.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};

/// Subsamples per axis used to anti-alias the rounded clip edge.
const CLIP_SUBSAMPLES: u32 = 2;

/// Largest placed layer, per axis, as a multiple of the frame.
const MAX_LAYER_TO_FRAME: u64 = 4;

// ---------------------------------------------------------------------------
// Layout policy
// ---------------------------------------------------------------------------

/// Which corners of the clip rectangle are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerStyle {
    /// Top-left and bottom-left only.
    Left,
    All,
}

/// How the result image is sized and positioned inside the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameLayout {
    /// Absolute size, centered, clipped to a rounded rectangle.
    FixedSizeCentered {
        width: u32,
        height: u32,
        corner_radius: u32,
        corners: CornerStyle,
    },
    /// Width is `scale * frame_width`, height follows the result's aspect
    /// ratio; centered horizontally and shifted `offset_y` pixels from the
    /// vertical center. No clipping.
    ScaledWithOffset { scale: f32, offset_y: i64 },
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::FixedSizeCentered {
            width: 1150,
            height: 1650,
            corner_radius: 120,
            corners: CornerStyle::Left,
        }
    }
}

/// Where the result lands on the canvas. `x`/`y` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl FrameLayout {
    /// Compute the placement of a `result_w x result_h` image inside a
    /// `frame_w x frame_h` frame.
    pub fn placement(
        &self,
        frame_w: u32,
        frame_h: u32,
        result_w: u32,
        result_h: u32,
    ) -> Result<Placement, CompositionError> {
        let (width, height, offset_y) = match *self {
            Self::FixedSizeCentered { width, height, .. } => (width, height, 0),
            Self::ScaledWithOffset { scale, offset_y } => {
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CompositionError::InvalidLayout(format!(
                        "scale must be positive, got {scale}"
                    )));
                }
                if result_w == 0 || result_h == 0 {
                    return Err(CompositionError::InvalidLayout(
                        "result image has zero size".into(),
                    ));
                }
                let width = (frame_w as f64 * scale as f64).round() as u32;
                let height =
                    (width as f64 * result_h as f64 / result_w as f64).round() as u32;
                (width, height, offset_y)
            }
        };

        if width == 0 || height == 0 {
            return Err(CompositionError::InvalidLayout(format!(
                "target size {width}x{height} is empty"
            )));
        }
        if u64::from(width) > u64::from(frame_w) * MAX_LAYER_TO_FRAME
            || u64::from(height) > u64::from(frame_h) * MAX_LAYER_TO_FRAME
        {
            return Err(CompositionError::InvalidLayout(format!(
                "target size {width}x{height} exceeds {MAX_LAYER_TO_FRAME}x the \
                 {frame_w}x{frame_h} frame"
            )));
        }

        Ok(Placement {
            x: (frame_w as i64 - width as i64).div_euclid(2),
            y: (frame_h as i64 - height as i64).div_euclid(2) + offset_y,
            width,
            height,
        })
    }

    fn clip(&self) -> Option<(u32, CornerStyle)> {
        match *self {
            Self::FixedSizeCentered {
                corner_radius,
                corners,
                ..
            } if corner_radius > 0 => Some((corner_radius, corners)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which of the two inputs a decode failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Result,
    Frame,
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Result => f.write_str("result"),
            Self::Frame => f.write_str("frame"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("Failed to decode {role} image: {reason}")]
    Decode { role: ImageRole, reason: String },

    #[error("Frame image has zero size")]
    EmptyFrame,

    #[error("Invalid frame layout: {0}")]
    InvalidLayout(String),

    #[error("Failed to encode composed image: {0}")]
    Encode(String),
}

// ---------------------------------------------------------------------------
// Compose
// ---------------------------------------------------------------------------

/// Decode both inputs and compose them.
pub fn compose_encoded(
    result_bytes: &[u8],
    frame_bytes: &[u8],
    layout: &FrameLayout,
) -> Result<Vec<u8>, CompositionError> {
    let result = decode(result_bytes, ImageRole::Result)?;
    let frame = decode(frame_bytes, ImageRole::Frame)?;
    compose(&result, &frame, layout)
}

/// Compose `result` under `frame` and return PNG bytes.
pub fn compose(
    result: &DynamicImage,
    frame: &DynamicImage,
    layout: &FrameLayout,
) -> Result<Vec<u8>, CompositionError> {
    let frame = frame.to_rgba8();
    let (frame_w, frame_h) = frame.dimensions();
    if frame_w == 0 || frame_h == 0 {
        return Err(CompositionError::EmptyFrame);
    }

    let placement = layout.placement(frame_w, frame_h, result.width(), result.height())?;

    let mut canvas = RgbaImage::new(frame_w, frame_h);

    let mut layer = imageops::resize(
        &result.to_rgba8(),
        placement.width,
        placement.height,
        FilterType::Triangle,
    );
    if let Some((radius, corners)) = layout.clip() {
        clip_rounded(&mut layer, radius, corners);
    }
    imageops::overlay(&mut canvas, &layer, placement.x, placement.y);

    imageops::overlay(&mut canvas, &frame, 0, 0);

    encode_png(&canvas)
}

fn decode(bytes: &[u8], role: ImageRole) -> Result<DynamicImage, CompositionError> {
    image::load_from_memory(bytes).map_err(|e| CompositionError::Decode {
        role,
        reason: e.to_string(),
    })
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CompositionError> {
    let mut buf = Cursor::new(Vec::new());
    canvas
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CompositionError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

// ---------------------------------------------------------------------------
// Rounded-rectangle clip
// ---------------------------------------------------------------------------

/// Scale every pixel's alpha by its coverage of the rounded rectangle
/// spanning the whole layer.
fn clip_rounded(layer: &mut RgbaImage, radius: u32, corners: CornerStyle) {
    let (w, h) = layer.dimensions();
    let r = radius.min(w / 2).min(h / 2) as f32;
    if r <= 0.0 {
        return;
    }

    let samples = (CLIP_SUBSAMPLES * CLIP_SUBSAMPLES) as f32;
    let step = 1.0 / CLIP_SUBSAMPLES as f32;

    for (x, y, pixel) in layer.enumerate_pixels_mut() {
        // Pixels away from every corner box are fully covered.
        let near_left = (x as f32) < r;
        let near_right = (x as f32) >= w as f32 - r;
        let near_top = (y as f32) < r;
        let near_bottom = (y as f32) >= h as f32 - r;
        let in_corner_box = match corners {
            CornerStyle::Left => near_left && (near_top || near_bottom),
            CornerStyle::All => (near_left || near_right) && (near_top || near_bottom),
        };
        if !in_corner_box {
            continue;
        }

        let mut inside = 0u32;
        for sy in 0..CLIP_SUBSAMPLES {
            for sx in 0..CLIP_SUBSAMPLES {
                let px = x as f32 + (sx as f32 + 0.5) * step;
                let py = y as f32 + (sy as f32 + 0.5) * step;
                if covers(px, py, w as f32, h as f32, r, corners) {
                    inside += 1;
                }
            }
        }

        let coverage = inside as f32 / samples;
        pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
    }
}

/// Whether point `(px, py)` lies inside the rounded rectangle `[0,w]x[0,h]`.
fn covers(px: f32, py: f32, w: f32, h: f32, r: f32, corners: CornerStyle) -> bool {
    let round_right = corners == CornerStyle::All;

    let cx = if px < r {
        Some(r)
    } else if round_right && px > w - r {
        Some(w - r)
    } else {
        None
    };
    let cy = if py < r {
        Some(r)
    } else if py > h - r {
        Some(h - r)
    } else {
        None
    };

    match (cx, cy) {
        (Some(cx), Some(cy)) => {
            let dx = px - cx;
            let dy = py - cy;
            dx * dx + dy * dy <= r * r
        }
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
