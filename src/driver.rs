//! Continuous frame driver.
//!
//! The display core never sleeps or schedules. [`FrameDriver`] calls
//! [`DotMatrixDisplay::update_frame`] no faster than the configured interval
//! and logs a status line once per [`STATUS_INTERVAL`].
//!
//! Ticks and shape changes may come from different threads. Both go through
//! the one [`Mutex`] in [`SharedDisplay`], so a shape change (flags plus the
//! forced dim redraw) is complete before the next tick sees it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::animations::FrameReport;
use crate::config::{POLL_INTERVAL, STATUS_INTERVAL};
use crate::display::DotMatrixDisplay;
use crate::surface::RenderingSurface;

/// Display shared between the animation loop and input handlers.
pub type SharedDisplay<S> = Arc<Mutex<DotMatrixDisplay<S>>>;

/// Wrap `display` for sharing across threads.
pub fn share<S>(display: DotMatrixDisplay<S>) -> SharedDisplay<S> {
    Arc::new(Mutex::new(display))
}

/// Cloneable stop signal for the animation loop and its helpers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every holder of this token to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Paces [`DotMatrixDisplay::update_frame`] calls.
#[derive(Debug)]
pub struct FrameDriver {
    interval: Duration,
    last_tick: Option<Instant>,
    frames: u64,
    started: Instant,
    last_status: Instant,
}

impl FrameDriver {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last_tick: None,
            frames: 0,
            started: now,
            last_status: now,
        }
    }

    /// Frames ticked so far.
    #[inline]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether a frame is due at `now`. The first call is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_tick
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Run one frame if due at `now`.
    pub fn tick_if_due<S: RenderingSurface>(
        &mut self,
        now: Instant,
        display: &mut DotMatrixDisplay<S>,
    ) -> Option<FrameReport> {
        if !self.is_due(now) {
            return None;
        }

        let render_start = Instant::now();
        let report = display.update_frame();
        let render_time = render_start.elapsed();

        if let Some(last) = self.last_tick {
            let total = now.saturating_duration_since(last);
            display
                .metrics_mut()
                .record_timing(total, render_time, total.saturating_sub(render_time));
        }

        self.last_tick = Some(now);
        self.frames += 1;
        Some(report)
    }

    /// Log a status line if [`STATUS_INTERVAL`] passed since the last one.
    pub fn report_status_if_due<S: RenderingSurface>(
        &mut self,
        now: Instant,
        display: &DotMatrixDisplay<S>,
    ) -> bool {
        if now.saturating_duration_since(self.last_status) < STATUS_INTERVAL {
            return false;
        }
        log::info!(
            "Frame: {} | Time: {:.1}s | Shape: {}",
            self.frames,
            now.saturating_duration_since(self.started).as_secs_f32(),
            display.selected_shape()
        );
        self.last_status = now;
        true
    }

    /// Drive `display` until `token` is cancelled.
    ///
    /// `each_iteration` runs on every loop pass with the display locked,
    /// whether or not a frame was due (e.g. to present the surface).
    pub fn run<S, F>(
        &mut self,
        display: &Mutex<DotMatrixDisplay<S>>,
        token: &CancellationToken,
        mut each_iteration: F,
    )
    where
        S: RenderingSurface,
        F: FnMut(&mut DotMatrixDisplay<S>, Option<FrameReport>),
    {
        log::info!("Starting continuous animation ({} ms per frame)", self.interval.as_millis());

        while !token.is_cancelled() {
            let now = Instant::now();
            {
                let Ok(mut guard) = display.lock() else {
                    log::error!("Display lock poisoned, stopping animation");
                    break;
                };
                let report = self.tick_if_due(now, &mut *guard);
                self.report_status_if_due(now, &*guard);
                each_iteration(&mut *guard, report);
            }
            thread::sleep(POLL_INTERVAL);
        }

        log::info!("Animation stopped after {} frames", self.frames);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::surface::recording::RecordingSurface;

    const INTERVAL: Duration = Duration::from_millis(20);

    fn display() -> DotMatrixDisplay<RecordingSurface> {
        DotMatrixDisplay::with_seed(DisplayConfig::default(), Some(RecordingSurface::default()), 11).unwrap()
    }

    #[test]
    fn test_token_cancel_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_first_tick_is_due() {
        let mut driver = FrameDriver::new(INTERVAL);
        let mut d = display();
        assert!(driver.tick_if_due(Instant::now(), &mut d).is_some());
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn test_ticks_respect_interval() {
        let mut driver = FrameDriver::new(INTERVAL);
        let mut d = display();
        let t0 = Instant::now();

        assert!(driver.tick_if_due(t0, &mut d).is_some());
        assert!(driver.tick_if_due(t0 + Duration::from_millis(5), &mut d).is_none(), "Too early");
        assert!(driver.tick_if_due(t0 + Duration::from_millis(19), &mut d).is_none(), "Still too early");
        assert!(driver.tick_if_due(t0 + INTERVAL, &mut d).is_some(), "Exactly one interval later");
        assert!(driver.tick_if_due(t0 + Duration::from_millis(30), &mut d).is_none());

        assert_eq!(driver.frames(), 2);
        assert_eq!(d.metrics().total_frames, 2);
        assert_eq!(d.metrics().frame_time_us, 20_000, "Frame time measured between ticks");
    }

    #[test]
    fn test_status_once_per_interval() {
        let mut driver = FrameDriver::new(INTERVAL);
        let d = display();
        let start = Instant::now();

        assert!(!driver.report_status_if_due(start, &d));
        assert!(driver.report_status_if_due(start + STATUS_INTERVAL, &d));
        assert!(!driver.report_status_if_due(start + STATUS_INTERVAL + Duration::from_millis(500), &d));
        assert!(driver.report_status_if_due(start + STATUS_INTERVAL * 2, &d));
    }

    #[test]
    fn test_run_stops_on_cancel() {
        let shared = share(display());
        let token = CancellationToken::new();
        let mut driver = FrameDriver::new(Duration::ZERO);

        let mut iterations = 0;
        driver.run(&shared, &token, |_, _| {
            iterations += 1;
            if iterations == 5 {
                token.cancel();
            }
        });

        assert_eq!(iterations, 5);
        assert!(driver.frames() >= 1, "Zero interval ticks on every pass");
        assert_eq!(shared.lock().unwrap().metrics().total_frames, driver.frames());
    }

    #[test]
    fn test_run_with_shape_changes_from_another_thread() {
        let shared = share(display());
        let token = CancellationToken::new();

        let input = {
            let shared = Arc::clone(&shared);
            let token = token.clone();
            thread::spawn(move || {
                for name in ["cross", "circle", "none", "cross"] {
                    shared.lock().unwrap().set_target_shape(name).unwrap();
                    thread::sleep(Duration::from_millis(5));
                }
                token.cancel();
            })
        };

        let mut driver = FrameDriver::new(Duration::from_millis(1));
        driver.run(&shared, &token, |_, _| {});
        input.join().unwrap();

        let d = shared.lock().unwrap();
        assert_eq!(d.selected_shape(), "cross");
        assert_eq!(d.dot_counts(), (28, 112));
    }

    #[test]
    fn test_cancelled_token_never_ticks() {
        let shared = share(display());
        let token = CancellationToken::new();
        token.cancel();

        let mut driver = FrameDriver::new(INTERVAL);
        driver.run(&shared, &token, |_, _| panic!("Loop body must not run"));

        assert_eq!(driver.frames(), 0);
    }
}
