//! Frame statistics for the status log.
//!
//! Counters are fed by [`DotMatrixDisplay`](crate::display::DotMatrixDisplay)
//! on every frame and shape change; timings are fed by the frame driver,
//! which is the only part that knows how long a frame took and slept.
//!
//! # Usage
//!
//! ```ignore
//! let frame_start = Instant::now();
//! let report = display.update_frame();
//! let render_time = frame_start.elapsed();
//! // ... sleep ...
//! display.metrics_mut().record_timing(frame_start.elapsed(), render_time, sleep_time);
//! ```

use core::fmt::Write;
use std::time::{Duration, Instant};

use heapless::String;

use crate::animations::FrameReport;

/// Counters and timing statistics of a running display.
#[derive(Debug, Clone)]
pub struct FrameMetrics {
    // Last frame (microseconds)
    pub frame_time_us: u32,
    pub render_time_us: u32,
    pub sleep_time_us: u32,

    pub frame_time_min_us: u32,
    pub frame_time_max_us: u32,
    frame_time_avg_us: f32,
    timed_frames: u64,

    /// Animation frames run since startup.
    pub total_frames: u64,
    /// High-class dots redrawn.
    pub high_dots_drawn: u64,
    /// Low-class dots redrawn.
    pub low_dots_drawn: u64,
    /// Blocks redrawn dim because they left the active shape.
    pub forced_block_redraws: u64,
    /// Failed draw calls of any kind.
    pub draw_failures: u64,

    start_time: Instant,
}

impl FrameMetrics {
    /// Exponential moving average weight of the newest sample.
    const EMA_ALPHA: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            frame_time_us: 0,
            render_time_us: 0,
            sleep_time_us: 0,
            frame_time_min_us: u32::MAX,
            frame_time_max_us: 0,
            frame_time_avg_us: 0.0,
            timed_frames: 0,
            total_frames: 0,
            high_dots_drawn: 0,
            low_dots_drawn: 0,
            forced_block_redraws: 0,
            draw_failures: 0,
            start_time: Instant::now(),
        }
    }

    /// Count one animation frame.
    pub fn record_report(&mut self, report: &FrameReport) {
        self.total_frames = self.total_frames.saturating_add(1);
        self.high_dots_drawn = self.high_dots_drawn.saturating_add(report.high_sampled as u64);
        self.low_dots_drawn = self.low_dots_drawn.saturating_add(report.low_sampled as u64);
        self.add_draw_failures(report.failures);
    }

    /// Count one block forced dim after a shape change.
    #[inline]
    pub fn record_forced_redraw(&mut self, failures: usize) {
        self.forced_block_redraws = self.forced_block_redraws.saturating_add(1);
        self.add_draw_failures(failures);
    }

    /// Count failed draw calls.
    #[inline]
    pub fn add_draw_failures(&mut self, failures: usize) {
        self.draw_failures = self.draw_failures.saturating_add(failures as u64);
    }

    /// Record how long the last frame took in total, drawing, and sleeping.
    pub fn record_timing(&mut self, total_time: Duration, render_time: Duration, sleep_time: Duration) {
        let total_us = total_time.as_micros() as u32;

        self.frame_time_us = total_us;
        self.render_time_us = render_time.as_micros() as u32;
        self.sleep_time_us = sleep_time.as_micros() as u32;

        self.frame_time_min_us = self.frame_time_min_us.min(total_us);
        self.frame_time_max_us = self.frame_time_max_us.max(total_us);

        if self.timed_frames == 0 {
            self.frame_time_avg_us = total_us as f32;
        } else {
            self.frame_time_avg_us =
                Self::EMA_ALPHA.mul_add(total_us as f32, (1.0 - Self::EMA_ALPHA) * self.frame_time_avg_us);
        }
        self.timed_frames += 1;
    }

    /// Smoothed frame time in microseconds.
    #[inline]
    pub const fn frame_time_avg_us(&self) -> u32 {
        self.frame_time_avg_us as u32
    }

    #[inline]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Uptime as `HH:MM:SS`.
    pub fn uptime_string(&self) -> String<12> {
        format_hms(self.uptime())
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn format_hms(elapsed: Duration) -> String<12> {
    let secs = elapsed.as_secs();
    let mut s = String::new();
    write!(s, "{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60).ok();
    s
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(metrics: &mut FrameMetrics, total_us: u64) {
        metrics.record_timing(
            Duration::from_micros(total_us),
            Duration::from_micros(total_us / 2),
            Duration::from_micros(total_us / 2),
        );
    }

    #[test]
    fn test_new_metrics() {
        let metrics = FrameMetrics::new();
        assert_eq!(metrics.total_frames, 0);
        assert_eq!(metrics.frame_time_min_us, u32::MAX);
        assert_eq!(metrics.frame_time_max_us, 0);
        assert_eq!(metrics.frame_time_avg_us(), 0);
    }

    #[test]
    fn test_record_report_accumulates() {
        let mut metrics = FrameMetrics::new();
        let report = FrameReport {
            high_sampled: 7,
            low_sampled: 5,
            failures: 2,
        };
        metrics.record_report(&report);
        metrics.record_report(&report);

        assert_eq!(metrics.total_frames, 2);
        assert_eq!(metrics.high_dots_drawn, 14);
        assert_eq!(metrics.low_dots_drawn, 10);
        assert_eq!(metrics.draw_failures, 4);
    }

    #[test]
    fn test_record_forced_redraw() {
        let mut metrics = FrameMetrics::new();
        metrics.record_forced_redraw(0);
        metrics.record_forced_redraw(3);
        assert_eq!(metrics.forced_block_redraws, 2);
        assert_eq!(metrics.draw_failures, 3);
    }

    #[test]
    fn test_failure_counters_saturate() {
        let mut metrics = FrameMetrics::new();
        metrics.draw_failures = u64::MAX - 1;
        metrics.forced_block_redraws = u64::MAX;

        metrics.record_forced_redraw(5);
        metrics.record_report(&FrameReport {
            high_sampled: 0,
            low_sampled: 3,
            failures: 3,
        });

        assert_eq!(metrics.draw_failures, u64::MAX);
        assert_eq!(metrics.forced_block_redraws, u64::MAX);
        assert_eq!(metrics.low_dots_drawn, 3);
    }

    #[test]
    fn test_timing_min_max() {
        let mut metrics = FrameMetrics::new();
        frame(&mut metrics, 20_000);
        frame(&mut metrics, 15_000);
        frame(&mut metrics, 25_000);

        assert_eq!(metrics.frame_time_us, 25_000);
        assert_eq!(metrics.render_time_us, 12_500);
        assert_eq!(metrics.frame_time_min_us, 15_000);
        assert_eq!(metrics.frame_time_max_us, 25_000);
        assert_eq!(metrics.total_frames, 0, "Timing does not count animation frames");
    }

    #[test]
    fn test_timing_average_moves_toward_samples() {
        let mut metrics = FrameMetrics::new();
        frame(&mut metrics, 20_000);
        assert_eq!(metrics.frame_time_avg_us(), 20_000, "First sample seeds the average");

        frame(&mut metrics, 30_000);
        let avg = metrics.frame_time_avg_us();
        assert!((20_900..=21_100).contains(&avg), "Average {avg} should be about 21000");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::ZERO).as_str(), "00:00:00");
        assert_eq!(format_hms(Duration::from_secs(3_723)).as_str(), "01:02:03");
        assert_eq!(FrameMetrics::new().uptime_string().len(), 8);
    }
}
