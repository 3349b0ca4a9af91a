use nalgebra::Point2;
use pagelock_core::Quad;
use serde::{Deserialize, Serialize};

/// One decoder report: the marker payload and its corners in analysis
/// space, ordered top-left, top-right, bottom-right, bottom-left.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerEvent {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub corners: Option<Vec<Point2<f32>>>,
}

impl MarkerEvent {
    pub fn new(payload: impl Into<String>, corners: [Point2<f32>; 4]) -> Self {
        Self {
            payload: Some(payload.into()),
            corners: Some(corners.to_vec()),
        }
    }

    /// The marker quad, if the decoder delivered exactly four corners.
    pub fn quad(&self) -> Option<Quad> {
        self.corners.as_deref().and_then(Quad::from_slice)
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}
