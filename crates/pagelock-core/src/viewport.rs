//! Mapping between the decoder's analysis frame and the on-screen preview.
//!
//! The preview is a center-crop "fill" of the sensor frame: it always
//! covers the whole destination rectangle and crops whichever dimension
//! overflows. It never letterboxes.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::ScaleOffset;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Width and height of a pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

impl FrameSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Width and height exchanged, for sensors mounted at 90 or 270 degrees.
    #[inline]
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Viewport mapping errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ViewportError {
    #[error("viewport not ready: analysis and preview sizes must both be known")]
    NotReady,
    #[error("frame dimensions must be > 0 (width={width}, height={height})")]
    InvalidSize { width: f32, height: f32 },
    #[error("rotation must be a multiple of 90 degrees (got {0})")]
    InvalidRotation(i32),
}

fn check_size(size: FrameSize) -> Result<(), ViewportError> {
    if size.is_valid() {
        Ok(())
    } else {
        Err(ViewportError::InvalidSize {
            width: size.width,
            height: size.height,
        })
    }
}

/// Compute the center-crop mapping from `source` (analysis frame) into
/// `dest` (preview), given the sensor rotation in degrees.
///
/// For an odd multiple of 90 degrees the source is transposed before the
/// aspect ratios are compared. The returned offset is in destination
/// pixels and is never positive.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(source, dest)))]
pub fn compute_scale_offset(
    source: FrameSize,
    dest: FrameSize,
    rotation_deg: i32,
) -> Result<ScaleOffset, ViewportError> {
    check_size(source)?;
    check_size(dest)?;
    if rotation_deg.rem_euclid(90) != 0 {
        return Err(ViewportError::InvalidRotation(rotation_deg));
    }

    let src = if rotation_deg.rem_euclid(180) != 0 {
        source.transposed()
    } else {
        source
    };

    let so = if src.aspect() > dest.aspect() {
        // source relatively wider: fit height, crop left/right
        let s = dest.height / src.height;
        let crop = (src.width * s - dest.width) / 2.0;
        ScaleOffset::uniform(s, Vector2::new(-crop, 0.0))
    } else {
        // source relatively taller: fit width, crop top/bottom
        let s = dest.width / src.width;
        let crop = (src.height * s - dest.height) / 2.0;
        ScaleOffset::uniform(s, Vector2::new(0.0, -crop))
    };

    log::debug!(
        "viewport: source {}x{} (rot {}) -> preview {}x{}: scale ({}, {}), offset ({}, {})",
        src.width,
        src.height,
        rotation_deg,
        dest.width,
        dest.height,
        so.scale.x,
        so.scale.y,
        so.offset.x,
        so.offset.y
    );

    Ok(so)
}

/// Holder for the analysis size, sensor rotation and preview size.
///
/// The frame-delivery side reports the analysis size and rotation, the
/// display side reports the preview size. The mapping is recomputed
/// lazily, only after one of the inputs actually changed.
#[derive(Clone, Debug, Default)]
pub struct ViewportMapper {
    source: Option<FrameSize>,
    rotation_deg: Option<i32>,
    preview: Option<FrameSize>,
    cached: Option<ScaleOffset>,
    recomputations: u64,
}

impl ViewportMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the analysis frame size and sensor rotation.
    pub fn set_source(&mut self, size: FrameSize, rotation_deg: i32) {
        if self.source != Some(size) || self.rotation_deg != Some(rotation_deg) {
            self.source = Some(size);
            self.rotation_deg = Some(rotation_deg);
            self.cached = None;
        }
    }

    /// Record the preview (display) size.
    pub fn set_preview(&mut self, size: FrameSize) {
        if self.preview != Some(size) {
            self.preview = Some(size);
            self.cached = None;
        }
    }

    pub fn source(&self) -> Option<FrameSize> {
        self.source
    }

    pub fn preview(&self) -> Option<FrameSize> {
        self.preview
    }

    pub fn rotation_deg(&self) -> Option<i32> {
        self.rotation_deg
    }

    /// True once both sizes and the rotation are known.
    pub fn is_ready(&self) -> bool {
        self.source.is_some() && self.preview.is_some() && self.rotation_deg.is_some()
    }

    /// Drop the cached mapping; the next call to `scale_offset` recomputes it.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of times the mapping has actually been computed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Current analysis -> preview mapping, recomputed only if required.
    pub fn scale_offset(&mut self) -> Result<ScaleOffset, ViewportError> {
        if let Some(so) = self.cached {
            return Ok(so);
        }
        let (Some(source), Some(preview), Some(rotation)) =
            (self.source, self.preview, self.rotation_deg)
        else {
            return Err(ViewportError::NotReady);
        };
        let so = compute_scale_offset(source, preview, rotation)?;
        self.cached = Some(so);
        self.recomputations += 1;
        Ok(so)
    }
}
