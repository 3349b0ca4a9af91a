use pagelock_core::Quad;
use serde::{Deserialize, Serialize};

/// Template validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("template key must not be empty")]
    EmptyKey,
    #[error("duplicate template key {0:?}")]
    DuplicateKey(String),
    #[error("template {key:?} has a degenerate layout (width={width}, height={height})")]
    DegenerateLayout { key: String, width: f32, height: f32 },
    #[error("template {0:?} has non-finite coordinates")]
    NonFinite(String),
}

/// Axis-aligned page placement relative to the marker, in marker units.
///
/// `offset_x`/`offset_y` measure how far the page's top-left corner lies
/// *before* the marker's top-left corner along the marker's top and left
/// edges. `width_units = 9.5` means the page is 9.5 marker-widths wide.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageExtent {
    pub offset_x: f32,
    pub offset_y: f32,
    pub width_units: f32,
    pub height_units: f32,
}

impl PageExtent {
    /// The extent as a quad in marker-unit space.
    pub fn to_layout(&self) -> Quad {
        Quad::from_rect(
            -self.offset_x,
            -self.offset_y,
            self.width_units,
            self.height_units,
        )
    }
}

/// A known page layout, looked up by exact marker payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    /// Decoded marker payload; matched byte for byte.
    pub key: String,
    /// Free-form page type tag carried through to the result.
    #[serde(default)]
    pub kind: String,
    /// Page corners in marker-unit space.
    pub layout: Quad,
}

impl PageTemplate {
    pub fn new(key: impl Into<String>, kind: impl Into<String>, layout: Quad) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
            layout,
        }
    }

    pub fn from_extent(key: impl Into<String>, kind: impl Into<String>, extent: PageExtent) -> Self {
        Self::new(key, kind, extent.to_layout())
    }

    /// Offsets and size read from the layout's top-left, top-right and
    /// bottom-left corners.
    pub fn extent(&self) -> PageExtent {
        let l = &self.layout;
        PageExtent {
            // `0.0 - x` keeps a zero offset from printing as -0
            offset_x: 0.0 - l.top_left.x,
            offset_y: 0.0 - l.top_left.y,
            width_units: l.top_right.x - l.top_left.x,
            height_units: l.bottom_left.y - l.top_left.y,
        }
    }

    /// Check the key and layout.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.key.is_empty() {
            return Err(TemplateError::EmptyKey);
        }
        if self
            .layout
            .corners()
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(TemplateError::NonFinite(self.key.clone()));
        }
        let e = self.extent();
        if e.width_units == 0.0 || e.height_units == 0.0 {
            return Err(TemplateError::DegenerateLayout {
                key: self.key.clone(),
                width: e.width_units,
                height: e.height_units,
            });
        }
        Ok(())
    }
}
