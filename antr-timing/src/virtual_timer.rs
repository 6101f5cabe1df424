use crate::timer::{CalibrationStats, Timer};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Frame samples kept for calibration, oldest dropped first.
const MAX_FRAME_SAMPLES: usize = 1000;

/// A clock that only moves when someone sleeps on it.
///
/// Clones share the same clock and frame samples, so a simulated input device
/// can advance the time the sequencer observes. Every sleep is logged for
/// inspection.
#[derive(Debug, Clone, Default)]
pub struct VirtualTimer {
    now_ns: Arc<AtomicU64>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
    frame_times: Arc<Mutex<VecDeque<Duration>>>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward without logging a sleep.
    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn clear_sleeps(&self) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.clear();
        }
    }
}

impl Timer for VirtualTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&self, d: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(d);
        }
        self.advance(d);
    }

    fn record_frame(&mut self, d: Duration) {
        if let Ok(mut frames) = self.frame_times.lock() {
            if frames.len() >= MAX_FRAME_SAMPLES {
                frames.pop_front();
            }
            frames.push_back(d);
        }
    }

    fn frame_count(&self) -> usize {
        self.frame_times.lock().map(|f| f.len()).unwrap_or(0)
    }

    fn calibration_stats(&self) -> CalibrationStats {
        self.frame_times
            .lock()
            .map(|f| CalibrationStats::from_frames(f.iter()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeping_advances_every_clone() {
        let timer = VirtualTimer::new();
        let observer = timer.clone();
        let start = observer.now();
        timer.sleep(Duration::from_millis(250));
        timer.advance(Duration::from_millis(50));
        assert_eq!(observer.elapsed(start), Duration::from_millis(300));
        assert_eq!(observer.sleeps(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn clear_sleeps_keeps_the_clock() {
        let timer = VirtualTimer::new();
        timer.sleep(Duration::from_secs(1));
        timer.clear_sleeps();
        assert!(timer.sleeps().is_empty());
        assert_eq!(timer.now(), 1_000_000_000);
    }

    #[test]
    fn frame_samples_are_capped_and_shared() {
        let mut timer = VirtualTimer::new();
        let observer = timer.clone();
        for i in 0..MAX_FRAME_SAMPLES + 5 {
            timer.record_frame(Duration::from_micros(i as u64));
        }
        assert_eq!(observer.frame_count(), MAX_FRAME_SAMPLES);
        let stats = observer.calibration_stats();
        assert_eq!(stats.min_frame_time_ns, 5_000.0);
    }
}
