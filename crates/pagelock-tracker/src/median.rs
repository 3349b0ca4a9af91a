//! Sliding-window median over recent page quads.

use std::collections::VecDeque;

use nalgebra::Point2;
use pagelock_core::Quad;

/// Per-corner, per-coordinate median of the last `window` quads.
///
/// Complements the exponential stabilizer: a single outlier that slipped
/// under the jump threshold cannot pull the median, while a sustained move
/// shows up after about half a window.
#[derive(Clone, Debug)]
pub struct QuadMedianFilter {
    window: usize,
    history: VecDeque<Quad>,
}

impl QuadMedianFilter {
    /// `window` is clamped to at least 1; a window of 1 is a pass-through.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Add `quad` to the window and return the current median.
    pub fn push(&mut self, quad: Quad) -> Quad {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(quad);

        let mut out = [Point2::origin(); 4];
        let mut xs = Vec::with_capacity(self.history.len());
        let mut ys = Vec::with_capacity(self.history.len());
        for (i, corner) in out.iter_mut().enumerate() {
            xs.clear();
            ys.clear();
            for q in &self.history {
                let p = q.corners()[i];
                xs.push(p.x);
                ys.push(p.y);
            }
            *corner = Point2::new(median(&mut xs), median(&mut ys));
        }
        Quad::from_corners(out)
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Median of a non-empty slice; the mean of the two middle values when the
/// length is even.
fn median(values: &mut [f32]) -> f32 {
    values.sort_by(f32::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) * 0.5
    }
}
