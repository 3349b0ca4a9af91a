//! Rotation and perspective sanity checks on a page quad.

use std::fmt;

use pagelock_core::Quad;
use serde::{Deserialize, Serialize};

use crate::ParamsError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorParams {
    /// Largest accepted `|rotation_angle_deg|`.
    pub max_rotation_deg: f32,
    /// Largest accepted `|a - b| / max(a, b)` for either pair of opposite
    /// sides.
    pub max_perspective_ratio: f32,
}

impl Default for ValidatorParams {
    fn default() -> Self {
        Self {
            max_rotation_deg: 25.0,
            max_perspective_ratio: 0.5,
        }
    }
}

impl ValidatorParams {
    pub(crate) fn check(&self) -> Result<(), ParamsError> {
        if !(self.max_rotation_deg >= 0.0 && self.max_rotation_deg <= 180.0) {
            return Err(ParamsError::OutOfRange {
                name: "max_rotation_deg",
                range: "[0, 180]",
                value: self.max_rotation_deg,
            });
        }
        if !(self.max_perspective_ratio >= 0.0 && self.max_perspective_ratio <= 1.0) {
            return Err(ParamsError::OutOfRange {
                name: "max_perspective_ratio",
                range: "[0, 1]",
                value: self.max_perspective_ratio,
            });
        }
        Ok(())
    }
}

/// Reason a page quad is not trusted. `Display` gives the user-facing hint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValidationIssue {
    Rotation { degrees: f32 },
    Perspective,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Rotation { degrees } => write!(
                f,
                "Rotate camera to align with page ({}° tilt)",
                *degrees as i32
            ),
            ValidationIssue::Perspective => f.write_str("Hold camera more directly above page"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BoundsValidator {
    params: ValidatorParams,
}

impl BoundsValidator {
    pub fn new(params: ValidatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ValidatorParams {
        &self.params
    }

    pub fn is_valid(&self, quad: &Quad) -> bool {
        self.issues(quad).is_empty()
    }

    /// Every failed check, rotation first.
    pub fn issues(&self, quad: &Quad) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let degrees = quad.rotation_angle_deg();
        if degrees.abs() > self.params.max_rotation_deg {
            issues.push(ValidationIssue::Rotation { degrees });
        }

        let [top, right, bottom, left] = quad.side_lengths();
        if self.skewed(top, bottom) || self.skewed(left, right) {
            issues.push(ValidationIssue::Perspective);
        }

        if !issues.is_empty() {
            log::debug!("validator: {:?}", issues);
        }
        issues
    }

    fn skewed(&self, a: f32, b: f32) -> bool {
        let longest = a.max(b);
        if longest <= 0.0 {
            // a collapsed pair of sides cannot be trusted
            return true;
        }
        (a - b).abs() / longest > self.params.max_perspective_ratio
    }
}
