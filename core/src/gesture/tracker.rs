//! Hand-tracker collaborators and detection pacing.
//!
//! The landmark model is external. It sits behind [`HandTracker`], either
//! driven inline from the render loop at a minimum interval
//! ([`GestureController::frame`]) or on its own thread ([`DetectionWorker`])
//! with a latest-wins handoff back to the render thread. Consumers never need
//! to know which.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use thiserror::Error;

use super::landmarks::{select_main_hand, RawHand};
use super::pose::{classify_with, Pose};
use super::state_machine::{ControlSignals, GestureConfig, GestureStateMachine};

/// Failures reported by a hand tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Failed to load hand tracking model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Tracker closed")]
    Closed,
}

impl TrackerError {
    /// Acquisition failures disable gesture control; anything else is
    /// retried on the next tick.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Inference(_))
    }
}

/// Anything that turns the latest video frame into hand landmarks.
pub trait HandTracker: Send {
    /// Run inference against the most recent video frame.
    ///
    /// Returns zero or more hands; the caller picks the main one.
    fn detect(&mut self, timestamp_ms: f64) -> Result<Vec<RawHand>, TrackerError>;

    /// Release the video stream and model resources.
    fn close(&mut self);
}

/// Gesture availability, surfaced as a small status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerStatus {
    Active,
    Disabled { reason: String },
    Stopped,
}

impl TrackerStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Short label for the on-screen indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Tracking",
            Self::Disabled { .. } => "Camera Disabled",
            Self::Stopped => "Stopped",
        }
    }
}

// ============================================================================
// Scripted tracker
// ============================================================================

/// Tracker that replays a fixed script, one entry per `detect` call.
///
/// Once the script runs out every call reports "no hand".
pub struct ScriptedTracker {
    script: VecDeque<Result<Vec<RawHand>, TrackerError>>,
    closed: Arc<AtomicBool>,
    calls: usize,
}

impl ScriptedTracker {
    pub fn new(script: Vec<Result<Vec<RawHand>, TrackerError>>) -> Self {
        Self {
            script: script.into(),
            closed: Arc::new(AtomicBool::new(false)),
            calls: 0,
        }
    }

    /// Script where every tick sees exactly one hand.
    pub fn from_hands(hands: Vec<RawHand>) -> Self {
        Self::new(hands.into_iter().map(|h| Ok(vec![h])).collect())
    }

    /// Flag set once `close` has been called.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl HandTracker for ScriptedTracker {
    fn detect(&mut self, _timestamp_ms: f64) -> Result<Vec<RawHand>, TrackerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TrackerError::Closed);
        }
        self.calls += 1;
        self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

// ============================================================================
// Threaded detection
// ============================================================================

/// One completed inference call.
pub type Detection = Result<Vec<RawHand>, TrackerError>;

/// Runs a tracker on its own thread at a fixed minimum interval.
///
/// Results are handed over through a one-slot channel: a newer result
/// evicts an unread older one, so the render thread always sees the latest
/// completed inference and nothing queues up behind it.
pub struct DetectionWorker {
    alive: Arc<AtomicBool>,
    rx: Receiver<Detection>,
    /// Dropped on shutdown to wake the worker out of its pacing wait.
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionWorker {
    /// Spawn the worker. `init` runs on the worker thread and acquires the
    /// camera and model; its failure is delivered as the first detection.
    pub fn spawn<T, F>(interval: Duration, init: F) -> Self
    where
        T: HandTracker + 'static,
        F: FnOnce() -> Result<T, TrackerError> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let (stop, stop_rx) = bounded::<()>(1);
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);
        let evict = rx.clone();

        let handle = thread::spawn(move || {
            let mut tracker = match init() {
                Ok(t) => t,
                Err(e) => {
                    publish(&tx, &evict, Err(e));
                    return;
                }
            };
            let epoch = Instant::now();
            while worker_alive.load(Ordering::Acquire) {
                let started = Instant::now();
                let result = tracker.detect(epoch.elapsed().as_secs_f64() * 1000.0);
                // Scene may have been torn down while inference ran.
                if !worker_alive.load(Ordering::Acquire) {
                    break;
                }
                let fatal = matches!(&result, Err(e) if e.is_fatal());
                if !publish(&tx, &evict, result) || fatal {
                    break;
                }
                match stop_rx.recv_timeout(interval.saturating_sub(started.elapsed())) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracker.close();
        });

        Self {
            alive,
            rx,
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Latest completed detection, if one arrived since the last call.
    pub fn latest(&self) -> Option<Detection> {
        match self.rx.try_recv() {
            Ok(d) => Some(d),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Stop the loop and wait for the tracker to be closed.
    pub fn shutdown(&mut self) {
        self.alive.store(false, Ordering::Release);
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("detection worker panicked during shutdown");
            }
        }
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Returns false once the receiving side is gone.
fn publish(tx: &Sender<Detection>, evict: &Receiver<Detection>, detection: Detection) -> bool {
    match tx.try_send(detection) {
        Ok(()) => true,
        Err(TrySendError::Full(detection)) => {
            let _ = evict.try_recv();
            !matches!(tx.try_send(detection), Err(TrySendError::Disconnected(_)))
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

// ============================================================================
// Controller
// ============================================================================

enum Source {
    Inline(Box<dyn HandTracker>),
    Worker(DetectionWorker),
    None,
}

/// Render-loop facing gesture front end.
///
/// Owns the state machine and a detection source. Every render frame calls
/// [`frame`](Self::frame), which runs a detection tick when one is due and
/// then applies inertia, so the returned signals are ready before the scene
/// consumes them.
pub struct GestureController {
    machine: GestureStateMachine,
    source: Source,
    status: TrackerStatus,
    last_detection_ms: Option<f64>,
    last_pose: Option<Pose>,
}

impl GestureController {
    /// Detection runs inline from [`frame`](Self::frame).
    pub fn with_tracker(config: GestureConfig, tracker: Box<dyn HandTracker>) -> Self {
        Self::build(config, Source::Inline(tracker), TrackerStatus::Active)
    }

    /// Detection runs on a worker thread.
    pub fn with_worker(config: GestureConfig, worker: DetectionWorker) -> Self {
        Self::build(config, Source::Worker(worker), TrackerStatus::Active)
    }

    /// Outcome of tracker acquisition; failure leaves gestures inert.
    pub fn from_init(
        config: GestureConfig,
        init: Result<Box<dyn HandTracker>, TrackerError>,
    ) -> Self {
        match init {
            Ok(tracker) => Self::with_tracker(config, tracker),
            Err(e) => Self::disabled(config, e),
        }
    }

    /// Gesture control unavailable; the scene keeps its last state.
    pub fn disabled(config: GestureConfig, reason: TrackerError) -> Self {
        log::warn!("gesture control disabled: {}", reason);
        Self::build(
            config,
            Source::None,
            TrackerStatus::Disabled {
                reason: reason.to_string(),
            },
        )
    }

    fn build(config: GestureConfig, source: Source, status: TrackerStatus) -> Self {
        Self {
            machine: GestureStateMachine::new(config),
            source,
            status,
            last_detection_ms: None,
            last_pose: None,
        }
    }

    pub fn status(&self) -> &TrackerStatus {
        &self.status
    }

    pub fn machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    /// Pose from the most recent detection that saw a hand.
    pub fn last_pose(&self) -> Option<Pose> {
        self.last_pose
    }

    /// Advance one render frame.
    pub fn frame(&mut self, now_ms: f64) -> ControlSignals {
        let interval = self.machine.config().detection_interval_ms;
        let due = self
            .last_detection_ms
            .map_or(true, |last| now_ms - last >= interval);

        let detection = match &mut self.source {
            Source::Inline(tracker) if due => {
                self.last_detection_ms = Some(now_ms);
                Some(tracker.detect(now_ms))
            }
            Source::Worker(worker) => worker.latest(),
            _ => None,
        };
        if let Some(detection) = detection {
            self.apply(detection);
        }
        self.machine.tick()
    }

    /// Feed one completed detection into the state machine.
    pub fn apply(&mut self, detection: Detection) {
        if !self.status.is_active() {
            return;
        }
        match detection {
            Ok(hands) => match select_main_hand(&hands) {
                Some(frame) => {
                    let pose = classify_with(&frame, &self.machine.config().thresholds);
                    self.last_pose = Some(pose);
                    self.machine.step(pose, &frame);
                }
                None => {
                    self.machine.hand_lost();
                }
            },
            Err(e) if e.is_fatal() => {
                log::warn!("gesture control disabled: {}", e);
                self.release_source();
                self.status = TrackerStatus::Disabled {
                    reason: e.to_string(),
                };
            }
            Err(e) => log::debug!("skipping detection tick: {}", e),
        }
    }

    /// Tear down: release the camera/model and stop the detection loop.
    pub fn shutdown(&mut self) {
        self.release_source();
        self.status = TrackerStatus::Stopped;
    }

    fn release_source(&mut self) {
        match std::mem::replace(&mut self.source, Source::None) {
            Source::Inline(mut tracker) => tracker.close(),
            Source::Worker(mut worker) => worker.shutdown(),
            Source::None => {}
        }
    }
}

impl Drop for GestureController {
    fn drop(&mut self) {
        self.release_source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_inference_errors_are_not_fatal() {
        assert!(!TrackerError::Inference("x".into()).is_fatal());
        assert!(TrackerError::CameraUnavailable("denied".into()).is_fatal());
        assert!(TrackerError::ModelLoad("404".into()).is_fatal());
    }

    #[test]
    fn test_scripted_tracker_runs_dry() {
        let mut tracker = ScriptedTracker::from_hands(vec![[Vec2::ZERO; 21]]);
        assert_eq!(tracker.detect(0.0).unwrap().len(), 1);
        assert!(tracker.detect(1.0).unwrap().is_empty());
        tracker.close();
        assert_eq!(tracker.detect(2.0), Err(TrackerError::Closed));
    }

    #[test]
    fn test_detection_paced_by_interval() {
        let tracker = ScriptedTracker::new(Vec::new());
        let mut ctl = GestureController::with_tracker(GestureConfig::default(), Box::new(tracker));
        ctl.frame(0.0);
        ctl.frame(10.0);
        ctl.frame(20.0);
        ctl.frame(25.0);
        match &ctl.source {
            Source::Inline(_) => {}
            _ => panic!("expected inline source"),
        }
        assert_eq!(ctl.last_detection_ms, Some(25.0));
    }

    #[test]
    fn test_publish_keeps_latest() {
        let (tx, rx) = bounded(1);
        assert!(publish(&tx, &rx, Ok(Vec::new())));
        assert!(publish(&tx, &rx, Err(TrackerError::Inference("late".into()))));
        assert_eq!(
            rx.try_recv().unwrap(),
            Err(TrackerError::Inference("late".into()))
        );
        assert!(rx.try_recv().is_err());
    }
}
