//! Running a [`FrameTracker`] on its own thread.
//!
//! Frames are handed over through a [`FrameSlot`] that holds at most one
//! pending frame: a frame published while the previous one is still
//! waiting replaces it. Results come back on a single-consumer channel in
//! frame order.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use pagelock_core::FrameSize;
use parking_lot::{Condvar, Mutex};

use crate::{DetectError, DetectionResult, FrameTracker, MarkerEvent};

struct SlotState<T> {
    pending: Option<(u64, T)>,
    published: u64,
    superseded: u64,
    closed: bool,
}

/// Latest-wins hand-over cell between a producer and one consumer.
pub struct FrameSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                pending: None,
                published: 0,
                superseded: 0,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Store `item` as the pending frame and return its sequence number
    /// (starting at 1). Returns `None` once the slot is closed.
    pub fn publish(&self, item: T) -> Option<u64> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.published += 1;
        let seq = state.published;
        if let Some((old, _)) = state.pending.replace((seq, item)) {
            state.superseded += 1;
            log::trace!("frame slot: frame {} superseded by {}", old, seq);
        }
        drop(state);
        self.ready.notify_one();
        Some(seq)
    }

    /// Take the pending frame without blocking.
    pub fn take(&self) -> Option<(u64, T)> {
        self.state.lock().pending.take()
    }

    /// Block until a frame is pending or the slot is closed.
    ///
    /// A frame published before `close` is still delivered; `None` means
    /// closed and drained.
    pub fn wait(&self) -> Option<(u64, T)> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.pending.take() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Refuse further frames and wake the consumer.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Frames published so far.
    pub fn published(&self) -> u64 {
        self.state.lock().published
    }

    /// Frames replaced before the consumer took them.
    pub fn superseded(&self) -> u64 {
        self.state.lock().superseded
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One frame for the worker: the analysis frame geometry and the decoder
/// report for it.
#[derive(Clone, Debug)]
pub struct FrameInput {
    pub source: FrameSize,
    pub rotation_deg: i32,
    pub event: Option<MarkerEvent>,
}

#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Sequence number returned by [`TrackerWorker::submit`].
    pub sequence: u64,
    pub result: Result<DetectionResult, DetectError>,
}

/// Handle to a tracker running on a dedicated thread.
pub struct TrackerWorker {
    slot: Arc<FrameSlot<FrameInput>>,
    preview: Arc<Mutex<Option<FrameSize>>>,
    results: Receiver<FrameOutput>,
    handle: Option<JoinHandle<FrameTracker>>,
}

impl TrackerWorker {
    /// Queue a frame, replacing any frame the worker has not started yet.
    /// Returns `None` after shutdown.
    pub fn submit(&self, input: FrameInput) -> Option<u64> {
        self.slot.publish(input)
    }

    /// Report a new preview size; applied before the next processed frame.
    pub fn set_preview(&self, size: FrameSize) {
        *self.preview.lock() = Some(size);
    }

    pub fn results(&self) -> &Receiver<FrameOutput> {
        &self.results
    }

    pub fn superseded(&self) -> u64 {
        self.slot.superseded()
    }

    /// Stop accepting frames, let the worker finish the pending one and
    /// return the tracker. `None` if the worker thread panicked.
    pub fn shutdown(mut self) -> Option<FrameTracker> {
        self.slot.close();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(tracker) => Some(tracker),
            Err(_) => {
                log::warn!("tracker worker panicked");
                None
            }
        }
    }
}

impl Drop for TrackerWorker {
    fn drop(&mut self) {
        self.slot.close();
    }
}

/// Move `tracker` onto a new thread and return the handle driving it.
pub fn spawn_tracker_worker(tracker: FrameTracker) -> io::Result<TrackerWorker> {
    let slot = Arc::new(FrameSlot::new());
    let preview = Arc::new(Mutex::new(None));
    let (tx, results) = mpsc::channel();

    let handle = thread::Builder::new().name("pagelock-tracker".into()).spawn({
        let slot = Arc::clone(&slot);
        let preview = Arc::clone(&preview);
        move || run(tracker, &slot, &preview, &tx)
    })?;

    Ok(TrackerWorker {
        slot,
        preview,
        results,
        handle: Some(handle),
    })
}

fn run(
    mut tracker: FrameTracker,
    slot: &FrameSlot<FrameInput>,
    preview: &Mutex<Option<FrameSize>>,
    tx: &Sender<FrameOutput>,
) -> FrameTracker {
    while let Some((sequence, input)) = slot.wait() {
        if let Some(size) = preview.lock().take() {
            tracker.set_preview(size);
        }
        tracker.set_source(input.source, input.rotation_deg);
        let result = tracker.process(input.event.as_ref());
        if tx.send(FrameOutput { sequence, result }).is_err() {
            log::debug!("tracker worker: result receiver dropped, stopping");
            slot.close();
            break;
        }
    }
    tracker
}
