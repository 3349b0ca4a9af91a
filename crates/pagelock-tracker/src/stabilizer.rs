//! Exponential smoothing with large-jump rejection and a stability counter.

use pagelock_core::Quad;
use serde::{Deserialize, Serialize};

use crate::ParamsError;

/// Tuning for one [`QuadStabilizer`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerParams {
    /// Weight of the current frame, in `(0, 1]`. Smaller is smoother and
    /// slower to react.
    pub smoothing_factor: f32,
    /// A frame with any corner further than this from the previous smoothed
    /// value is discarded outright.
    pub reject_threshold_px: f32,
    /// A frame counts as stable when every smoothed corner moved less than
    /// this.
    pub similarity_threshold_px: f32,
    /// Consecutive stable frames needed before `is_stable` reports true.
    pub required_stable_frames: u32,
    /// Re-seed the track from the current frame once more than this many
    /// frames in a row were rejected. 0 keeps rejecting indefinitely.
    ///
    /// Without it a real move larger than `reject_threshold_px` is never
    /// accepted; the track only reports unstable until it is reset.
    pub max_consecutive_rejections: u32,
}

impl Default for StabilizerParams {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.15,
            reject_threshold_px: 200.0,
            similarity_threshold_px: 5.0,
            required_stable_frames: 3,
            max_consecutive_rejections: 0,
        }
    }
}

impl StabilizerParams {
    /// Marker tracking in analysis space.
    pub fn for_marker() -> Self {
        Self::default()
    }

    /// Page tracking in preview space. The extrapolated page amplifies
    /// marker jitter, so glitches are rejected much earlier.
    pub fn for_page() -> Self {
        Self {
            smoothing_factor: 0.7,
            reject_threshold_px: 50.0,
            ..Self::default()
        }
    }

    pub(crate) fn check(&self) -> Result<(), ParamsError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(ParamsError::OutOfRange {
                name: "smoothing_factor",
                range: "(0, 1]",
                value: self.smoothing_factor,
            });
        }
        if !(self.reject_threshold_px > 0.0) {
            return Err(ParamsError::OutOfRange {
                name: "reject_threshold_px",
                range: "(0, inf)",
                value: self.reject_threshold_px,
            });
        }
        if !(self.similarity_threshold_px > 0.0) {
            return Err(ParamsError::OutOfRange {
                name: "similarity_threshold_px",
                range: "(0, inf)",
                value: self.similarity_threshold_px,
            });
        }
        if self.required_stable_frames == 0 {
            return Err(ParamsError::Zero {
                name: "required_stable_frames",
            });
        }
        Ok(())
    }
}

/// Tracking state of a stabilizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StabilizerState {
    #[default]
    Empty,
    Tracking {
        previous: Quad,
        stable_frames: u32,
        /// Frames rejected in a row since the last accepted one.
        rejected: u32,
    },
}

/// Smooths one tracked quadrilateral over time.
///
/// The smoothed value and the stable count are committed only at the end
/// of an accepted `stabilize` call. A rejected frame leaves both alone but
/// is counted, and the track reports unstable until a frame is accepted
/// again, so a stale value is never reported as stable.
#[derive(Clone, Debug)]
pub struct QuadStabilizer {
    params: StabilizerParams,
    state: StabilizerState,
}

impl QuadStabilizer {
    pub fn new(params: StabilizerParams) -> Self {
        Self {
            params,
            state: StabilizerState::Empty,
        }
    }

    pub fn params(&self) -> &StabilizerParams {
        &self.params
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    /// Last smoothed value, if tracking.
    pub fn last(&self) -> Option<Quad> {
        match self.state {
            StabilizerState::Empty => None,
            StabilizerState::Tracking { previous, .. } => Some(previous),
        }
    }

    pub fn stable_frames(&self) -> u32 {
        match self.state {
            StabilizerState::Empty => 0,
            StabilizerState::Tracking { stable_frames, .. } => stable_frames,
        }
    }

    /// Frames rejected in a row since the last accepted one.
    pub fn consecutive_rejections(&self) -> u32 {
        match self.state {
            StabilizerState::Empty => 0,
            StabilizerState::Tracking { rejected, .. } => rejected,
        }
    }

    pub fn stabilize(&mut self, current: &Quad) -> Quad {
        let StabilizerState::Tracking {
            previous,
            stable_frames,
            rejected,
        } = self.state
        else {
            return self.seed(current);
        };

        let jump = current.max_corner_distance(&previous);
        if jump > self.params.reject_threshold_px {
            let rejected = rejected.saturating_add(1);
            let limit = self.params.max_consecutive_rejections;
            if limit > 0 && rejected > limit {
                log::debug!(
                    "stabilizer: {} frames rejected in a row, re-seeding track",
                    rejected
                );
                return self.seed(current);
            }
            log::debug!(
                "stabilizer: rejected frame, corner jump {:.1}px > {:.1}px",
                jump,
                self.params.reject_threshold_px
            );
            self.state = StabilizerState::Tracking {
                previous,
                stable_frames,
                rejected,
            };
            return previous;
        }

        let smoothed = previous.lerp(current, self.params.smoothing_factor);
        let stable_frames =
            if smoothed.max_corner_distance(&previous) < self.params.similarity_threshold_px {
                stable_frames.saturating_add(1)
            } else {
                1
            };

        self.state = StabilizerState::Tracking {
            previous: smoothed,
            stable_frames,
            rejected: 0,
        };
        smoothed
    }

    fn seed(&mut self, current: &Quad) -> Quad {
        self.state = StabilizerState::Tracking {
            previous: *current,
            stable_frames: 1,
            rejected: 0,
        };
        *current
    }

    pub fn reset(&mut self) {
        self.state = StabilizerState::Empty;
    }

    pub fn is_stable(&self) -> bool {
        self.consecutive_rejections() == 0
            && self.stable_frames() >= self.params.required_stable_frames
    }
}

impl Default for QuadStabilizer {
    fn default() -> Self {
        Self::new(StabilizerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn quad() -> Quad {
        Quad::from_rect(100.0, 100.0, 80.0, 80.0)
    }

    #[test]
    fn first_frame_passes_through() {
        let mut s = QuadStabilizer::default();
        assert_eq!(s.stabilize(&quad()), quad());
        assert_eq!(s.stable_frames(), 1);
        assert!(!s.is_stable());
    }

    #[test]
    fn repeated_input_converges_and_becomes_stable_on_time() {
        let params = StabilizerParams {
            required_stable_frames: 4,
            ..StabilizerParams::default()
        };
        let mut s = QuadStabilizer::new(params);
        s.stabilize(&quad().translate(Vector2::new(-3.0, 2.0)));

        let target = quad();
        let mut out = target;
        for frame in 2..=60 {
            out = s.stabilize(&target);
            if frame < params.required_stable_frames {
                assert!(!s.is_stable(), "frame {frame} too early");
            }
        }
        assert!(s.is_stable());
        assert!(out.max_corner_distance(&target) < 1e-3);
    }

    #[test]
    fn stable_after_exactly_required_identical_frames() {
        let mut s = QuadStabilizer::default();
        let q = quad();
        s.stabilize(&q);
        assert!(!s.is_stable());
        s.stabilize(&q);
        assert!(!s.is_stable());
        s.stabilize(&q);
        assert!(s.is_stable());
        assert_eq!(s.stable_frames(), 3);
    }

    #[test]
    fn large_jump_keeps_output_but_drops_stability() {
        let mut s = QuadStabilizer::new(StabilizerParams::for_page());
        let q = quad();
        for _ in 0..3 {
            s.stabilize(&q);
        }
        assert!(s.is_stable());

        let glitch = q.translate(Vector2::new(0.0, 51.0));
        assert_eq!(s.stabilize(&glitch), q);
        assert_eq!(s.last(), Some(q));
        assert_eq!(s.stable_frames(), 3);
        assert_eq!(s.consecutive_rejections(), 1);
        assert!(!s.is_stable());

        // the next accepted frame resumes the count
        assert_eq!(s.stabilize(&q), q);
        assert_eq!(s.consecutive_rejections(), 0);
        assert_eq!(s.stable_frames(), 4);
        assert!(s.is_stable());
    }

    #[test]
    fn sustained_move_is_rejected_forever_by_default() {
        let mut s = QuadStabilizer::new(StabilizerParams::for_page());
        let q = quad();
        for _ in 0..3 {
            s.stabilize(&q);
        }
        let moved = q.translate(Vector2::new(80.0, 0.0));
        for _ in 0..50 {
            assert_eq!(s.stabilize(&moved), q);
            assert!(!s.is_stable());
        }
        assert_eq!(s.consecutive_rejections(), 50);
    }

    #[test]
    fn sustained_move_reseeds_after_rejection_limit() {
        let mut s = QuadStabilizer::new(StabilizerParams {
            max_consecutive_rejections: 2,
            ..StabilizerParams::for_page()
        });
        let q = quad();
        for _ in 0..3 {
            s.stabilize(&q);
        }
        let moved = q.translate(Vector2::new(80.0, 0.0));
        assert_eq!(s.stabilize(&moved), q);
        assert_eq!(s.stabilize(&moved), q);
        assert_eq!(s.stabilize(&moved), moved);
        assert_eq!(s.stable_frames(), 1);
        assert_eq!(s.consecutive_rejections(), 0);

        s.stabilize(&moved);
        s.stabilize(&moved);
        assert!(s.is_stable());
        assert_eq!(s.last(), Some(moved));
    }

    #[test]
    fn movement_resets_the_counter() {
        let mut s = QuadStabilizer::new(StabilizerParams {
            smoothing_factor: 1.0,
            ..StabilizerParams::default()
        });
        let q = quad();
        s.stabilize(&q);
        s.stabilize(&q);
        assert_eq!(s.stable_frames(), 2);
        s.stabilize(&q.translate(Vector2::new(20.0, 0.0)));
        assert_eq!(s.stable_frames(), 1);
    }

    #[test]
    fn smoothing_is_per_corner_lerp() {
        let mut s = QuadStabilizer::new(StabilizerParams {
            smoothing_factor: 0.25,
            ..StabilizerParams::default()
        });
        s.stabilize(&quad());
        let out = s.stabilize(&quad().translate(Vector2::new(40.0, 0.0)));
        assert!((out.top_left.x - 110.0).abs() < 1e-4);
        assert!((out.bottom_right.x - 190.0).abs() < 1e-4);
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut s = QuadStabilizer::default();
        s.stabilize(&quad());
        s.reset();
        assert_eq!(*s.state(), StabilizerState::Empty);
        assert_eq!(s.stable_frames(), 0);
        assert!(s.last().is_none());
        // after a reset any position is accepted again
        let far = quad().translate(Vector2::new(900.0, 900.0));
        assert_eq!(s.stabilize(&far), far);
    }

    #[test]
    fn params_are_checked() {
        assert!(StabilizerParams::default().check().is_ok());
        let bad = StabilizerParams {
            smoothing_factor: 0.0,
            ..StabilizerParams::default()
        };
        assert_eq!(
            bad.check(),
            Err(ParamsError::OutOfRange {
                name: "smoothing_factor",
                range: "(0, 1]",
                value: 0.0,
            })
        );
        let bad = StabilizerParams {
            required_stable_frames: 0,
            ..StabilizerParams::default()
        };
        assert_eq!(
            bad.check(),
            Err(ParamsError::Zero {
                name: "required_stable_frames"
            })
        );
    }
}
