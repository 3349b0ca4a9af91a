use serde::{Deserialize, Serialize};

use super::{DetectError, ParamsError};
use crate::{ResolverKind, StabilizerParams, ValidatorParams};

/// Which marker quad feeds the page resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSource {
    /// The smoothed marker, after the marker stabilizer.
    #[default]
    Stabilized,
    /// The decoder's corners for this frame.
    Raw,
}

/// Configuration for [`FrameTracker`](super::FrameTracker).
///
/// Missing JSON fields take their defaults. A partially given stabilizer
/// section is completed from `StabilizerParams::default()`, not from the
/// page preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Marker smoothing, in analysis pixels.
    pub marker: StabilizerParams,
    /// Page smoothing, in preview pixels.
    pub page: StabilizerParams,
    pub validator: ValidatorParams,
    pub resolver: ResolverKind,
    pub resolve_from: MarkerSource,
    /// Median window applied after page smoothing; 0 or 1 disables it.
    pub page_median_window: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            marker: StabilizerParams::for_marker(),
            page: StabilizerParams::for_page(),
            validator: ValidatorParams::default(),
            resolver: ResolverKind::default(),
            resolve_from: MarkerSource::default(),
            page_median_window: 0,
        }
    }
}

impl TrackerParams {
    pub fn validate(&self) -> Result<(), DetectError> {
        self.marker.check().map_err(invalid("marker"))?;
        self.page.check().map_err(invalid("page"))?;
        self.validator.check().map_err(invalid("validator"))?;
        Ok(())
    }
}

fn invalid(section: &'static str) -> impl FnOnce(ParamsError) -> DetectError {
    move |source| DetectError::InvalidParams { section, source }
}
