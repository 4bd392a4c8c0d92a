//! Frame pacing.

use std::time::{Duration, Instant};

/// Paces the main loop against a fixed frame budget of
/// `1 / max_frame_rate` seconds.
///
/// [`LoopTimer::tick`] ends a frame: when at least [`SLEEP_FLOOR`] of
/// the budget is left it sleeps the rest off and reports the budget as
/// the next dt, so updates integrate a steady step. A frame that ran
/// long, or left less than the floor, passes its measured time through
/// instead.
///
/// [`SLEEP_FLOOR`]: LoopTimer::SLEEP_FLOOR
pub struct LoopTimer {
    min_duration: Duration,
    last: Instant,
}

impl LoopTimer {
    /// Remainders under this are reported, not slept.
    pub const SLEEP_FLOOR: Duration = Duration::from_millis(5);

    pub fn new(max_frame_rate: f32) -> Self {
        let rate = if max_frame_rate.is_finite() && max_frame_rate >= 1.0 {
            max_frame_rate
        } else {
            log::warn!("max-frame-rate {max_frame_rate} is unusable, running at 60");
            60.0
        };
        Self {
            min_duration: Duration::from_secs_f32(1.0 / rate),
            last: Instant::now(),
        }
    }

    /// The fixed frame budget in seconds. The loop's first frame uses
    /// this before any measurement exists.
    pub fn min_duration(&self) -> f32 {
        self.min_duration.as_secs_f32()
    }

    /// Restarts measurement. Call right before the loop's first frame.
    pub fn start(&mut self) {
        self.last = Instant::now();
    }

    /// Ends the current frame and returns the dt the next update should
    /// integrate.
    pub fn tick(&mut self) -> f32 {
        let elapsed = self.last.elapsed();
        let dt = match self.min_duration.checked_sub(elapsed) {
            Some(rest) if rest >= Self::SLEEP_FLOOR => {
                std::thread::sleep(rest);
                self.min_duration
            }
            _ => elapsed,
        };
        self.last = Instant::now();
        dt.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fast_frame_sleeps_off_the_budget() {
        let mut timer = LoopTimer::new(50.0);
        timer.start();
        let before = Instant::now();
        let dt = timer.tick();
        assert_eq!(dt, timer.min_duration());
        assert!(before.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn a_slow_frame_reports_its_measured_time() {
        let mut timer = LoopTimer::new(1000.0);
        timer.start();
        std::thread::sleep(Duration::from_millis(10));
        let dt = timer.tick();
        assert!(dt >= 0.010);
        assert!(dt > timer.min_duration());
    }

    #[test]
    fn a_small_remainder_is_not_worth_sleeping() {
        // 1 ms budget: the remainder can never reach the floor.
        let mut timer = LoopTimer::new(1000.0);
        timer.start();
        let dt = timer.tick();
        assert!(dt < LoopTimer::SLEEP_FLOOR.as_secs_f32());
    }

    #[test]
    fn an_unusable_rate_falls_back_to_sixty() {
        assert_eq!(LoopTimer::new(0.0).min_duration(), 1.0 / 60.0);
        assert_eq!(LoopTimer::new(f32::NAN).min_duration(), 1.0 / 60.0);
    }
}
