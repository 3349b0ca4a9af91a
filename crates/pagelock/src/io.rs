//! JSON configuration, recorded sessions and replay reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagelock_core::FrameSize;
use pagelock_template::{TemplateIoError, TemplateMatcher, TemplateTable};
use pagelock_tracker::{DetectError, DetectionResult, FrameTracker, MarkerEvent, TrackerParams};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum PagelockIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("templates: {0}")]
    Template(#[from] TemplateIoError),
    #[error(transparent)]
    Detect(#[from] DetectError),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, PagelockIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), PagelockIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Application configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagelockConfig {
    /// JSON array of page templates. The built-in table is used when
    /// absent. Relative paths are resolved against the working directory.
    pub templates_path: Option<PathBuf>,
    pub tracker: TrackerParams,
}

impl PagelockConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PagelockIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PagelockIoError> {
        write_json(self, path.as_ref())
    }

    /// Template table named by `templates_path`, or the built-in one.
    pub fn load_templates(&self) -> Result<TemplateTable, PagelockIoError> {
        match &self.templates_path {
            Some(path) => {
                let table = TemplateTable::load_json(path)?;
                log::info!(
                    "loaded {} templates from {}",
                    table.len(),
                    path.display()
                );
                Ok(table)
            }
            None => Ok(TemplateTable::builtin()),
        }
    }

    pub fn build_tracker(&self) -> Result<FrameTracker, PagelockIoError> {
        let matcher = TemplateMatcher::new(Arc::new(self.load_templates()?));
        Ok(FrameTracker::new(matcher, self.tracker.clone())?)
    }
}

/// A recorded run: fixed frame geometry plus one decoder report per frame
/// (`null` for frames where nothing was decoded).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub source: FrameSize,
    #[serde(default)]
    pub rotation_deg: i32,
    pub preview: FrameSize,
    pub frames: Vec<Option<MarkerEvent>>,
}

impl Session {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PagelockIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PagelockIoError> {
        write_json(self, path.as_ref())
    }
}

/// Per-frame results of a replayed session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub frames: usize,
    pub matched: usize,
    /// Index of the first frame with `match_found`.
    pub first_match: Option<usize>,
    pub results: Vec<DetectionResult>,
}

impl ReplayReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PagelockIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PagelockIoError> {
        write_json(self, path.as_ref())
    }
}

/// Feed every frame of `session` through `tracker`, in order.
pub fn replay(tracker: &mut FrameTracker, session: &Session) -> Result<ReplayReport, DetectError> {
    tracker.set_source(session.source, session.rotation_deg);
    tracker.set_preview(session.preview);

    let mut report = ReplayReport {
        frames: session.frames.len(),
        ..ReplayReport::default()
    };
    for (idx, event) in session.frames.iter().enumerate() {
        let result = tracker.process(event.as_ref())?;
        if result.match_found {
            report.matched += 1;
            report.first_match.get_or_insert(idx);
        }
        report.results.push(result);
    }
    log::info!(
        "replayed {} frames, {} matched",
        report.frames,
        report.matched
    );
    Ok(report)
}
