use pagelock_core::{FrameSize, Quad, ViewportMapper};
use pagelock_template::TemplateMatcher;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{DetectError, DetectionResult, MarkerEvent, MarkerSource, TrackerParams, ALIGN_MESSAGE};
use crate::{BoundsValidator, PageBoundsResolver, QuadMedianFilter, QuadStabilizer};

/// Stateful per-frame page tracker.
///
/// Not `Sync`: frames must be fed one at a time, in arrival order. Use
/// [`spawn_tracker_worker`](crate::spawn_tracker_worker) to run it off the
/// caller's thread.
pub struct FrameTracker {
    matcher: TemplateMatcher,
    params: TrackerParams,
    resolver: Box<dyn PageBoundsResolver + Send>,
    validator: BoundsValidator,
    viewport: ViewportMapper,
    marker: QuadStabilizer,
    page: QuadStabilizer,
    median: Option<QuadMedianFilter>,
    frames: u64,
}

impl FrameTracker {
    pub fn new(matcher: TemplateMatcher, params: TrackerParams) -> Result<Self, DetectError> {
        params.validate()?;
        let median = (params.page_median_window > 1)
            .then(|| QuadMedianFilter::new(params.page_median_window));
        Ok(Self {
            matcher,
            resolver: params.resolver.build(),
            validator: BoundsValidator::new(params.validator),
            viewport: ViewportMapper::new(),
            marker: QuadStabilizer::new(params.marker),
            page: QuadStabilizer::new(params.page),
            median,
            frames: 0,
            params,
        })
    }

    /// Replace the resolver chosen by `params.resolver`.
    pub fn with_resolver(mut self, resolver: Box<dyn PageBoundsResolver + Send>) -> Self {
        self.resolver = resolver;
        self
    }

    #[inline]
    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    #[inline]
    pub fn matcher(&self) -> &TemplateMatcher {
        &self.matcher
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportMapper {
        &mut self.viewport
    }

    /// Analysis frame size and sensor rotation, as reported with each frame.
    pub fn set_source(&mut self, size: FrameSize, rotation_deg: i32) {
        self.viewport.set_source(size, rotation_deg);
    }

    /// Preview size, as reported by the display side.
    pub fn set_preview(&mut self, size: FrameSize) {
        self.viewport.set_preview(size);
    }

    pub fn marker_stabilizer(&self) -> &QuadStabilizer {
        &self.marker
    }

    pub fn page_stabilizer(&self) -> &QuadStabilizer {
        &self.page
    }

    /// Frames processed since construction or the last `reset`.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Forget both tracks; the viewport mapping is kept.
    pub fn reset(&mut self) {
        self.marker.reset();
        self.reset_page();
        self.frames = 0;
    }

    fn reset_page(&mut self) {
        self.page.reset();
        if let Some(median) = self.median.as_mut() {
            median.reset();
        }
    }

    /// Process one decoder report (`None` when nothing was decoded).
    ///
    /// Fails with [`ViewportError::NotReady`](pagelock_core::ViewportError)
    /// until both the analysis and preview sizes are known; the tracking
    /// state is left untouched in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(frame = self.frames)))]
    pub fn process(&mut self, event: Option<&MarkerEvent>) -> Result<DetectionResult, DetectError> {
        let so = self.viewport.scale_offset()?;
        self.frames += 1;

        let payload = event.and_then(MarkerEvent::payload);
        let template = self.matcher.try_match(payload);

        let Some(raw) = event.and_then(MarkerEvent::quad) else {
            if self.marker.last().is_some() {
                log::debug!("frame {}: marker lost, resetting tracks", self.frames);
            }
            self.marker.reset();
            self.reset_page();
            return Ok(DetectionResult::default());
        };

        let marker = self.marker.stabilize(&raw);
        let marker_overlay = marker.scale_with_offset(&so).round();

        let Some(template) = template else {
            if self.page.last().is_some() {
                log::debug!(
                    "frame {}: no template for payload {:?}, resetting page track",
                    self.frames,
                    payload
                );
            }
            self.reset_page();
            return Ok(DetectionResult::marker_only(marker_overlay));
        };

        let mut result = DetectionResult {
            payload: payload.map(str::to_owned),
            template: Some(template.clone()),
            marker_overlay: Some(marker_overlay),
            ..DetectionResult::default()
        };

        // resolve in analysis space, smooth in preview space
        let source = match self.params.resolve_from {
            MarkerSource::Stabilized => &marker,
            MarkerSource::Raw => &raw,
        };
        let page = match self.resolver.resolve(source, template) {
            Ok(page) => self.smooth_page(&page.scale_with_offset(&so)),
            Err(err) => {
                log::debug!("frame {}: page not resolved: {}", self.frames, err);
                result.validation_message = Some(ALIGN_MESSAGE.to_owned());
                return Ok(result);
            }
        };

        let issues = self.validator.issues(&page);
        let stable = self.marker.is_stable() && self.page.is_stable();
        if issues.is_empty() && stable {
            result.match_found = true;
            result.page_overlay = Some(page.round());
        } else {
            let message = issues
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| ALIGN_MESSAGE.to_owned());
            result.validation_message = Some(message);
        }
        Ok(result)
    }

    fn smooth_page(&mut self, page: &Quad) -> Quad {
        let smoothed = self.page.stabilize(page);
        match self.median.as_mut() {
            Some(median) => median.push(smoothed),
            None => smoothed,
        }
    }
}

impl std::fmt::Debug for FrameTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTracker")
            .field("params", &self.params)
            .field("viewport", &self.viewport)
            .field("marker", &self.marker)
            .field("page", &self.page)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
