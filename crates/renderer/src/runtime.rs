use std::time::{Duration, Instant};

/// Supplies the real delta fed to [`FramePipeline::render_with`].
///
/// [`FramePipeline::render_with`]: crate::frame::FramePipeline::render_with
pub trait TimeSource {
    /// Real time elapsed since the previous tick, in seconds.
    fn next_delta(&mut self) -> f64;
}

/// Time source backed by the system monotonic clock.
///
/// The first tick after construction reports zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource {
    last: Option<Instant>,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for SystemTimeSource {
    fn next_delta(&mut self) -> f64 {
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last = Some(now);
        delta
    }
}

/// Reports the same delta every tick, for deterministic offline renders.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepTimeSource {
    step: f64,
}

impl FixedStepTimeSource {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    pub fn from_fps(fps: f64) -> Self {
        Self::new(if fps > 0.0 { 1.0 / fps } else { 0.0 })
    }
}

impl TimeSource for FixedStepTimeSource {
    fn next_delta(&mut self) -> f64 {
        self.step
    }
}

/// Decides when the next frame is due under an optional FPS cap.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// Earliest instant the next frame may render; `None` when uncapped or
    /// before the first frame.
    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.interval?;
        self.last_frame.map(|last| last + interval)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}
