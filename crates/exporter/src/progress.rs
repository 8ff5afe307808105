use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};


#[derive(Clone, Copy, Debug)]
struct Sample {
    height: u64,
    time: Instant,
}


/// Export speed over a sliding window of recent heights.
///
/// Samples closer than `granularity` to the previous one overwrite it, so the
/// window always spans roughly `window_size * granularity`.
pub struct Progress {
    window: VecDeque<Sample>,
    capacity: usize,
    granularity: Duration,
    has_news: bool,
}


impl Progress {
    pub fn new(window_size: NonZeroUsize, granularity: Duration) -> Self {
        assert!(!granularity.is_zero());
        Self {
            window: VecDeque::with_capacity(window_size.get() + 1),
            capacity: window_size.get() + 1,
            granularity,
            has_news: false,
        }
    }

    pub fn set_current_height(&mut self, height: u64) {
        self.record_at(height, Instant::now())
    }

    fn record_at(&mut self, height: u64, time: Instant) {
        self.has_news = true;

        let len = self.window.len();
        let Some(last) = self.window.back_mut() else {
            self.window.push_back(Sample { height, time });
            return
        };

        let height = height.max(last.height);

        if len > 1 && time <= last.time + self.granularity {
            last.height = height;
            return
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(Sample { height, time });
    }

    pub fn current_height(&self) -> Option<u64> {
        self.window.back().map(|s| s.height)
    }

    pub fn has_news(&self) -> bool {
        self.has_news
    }

    /// Blocks per second between the oldest and the newest sample.
    pub fn speed(&mut self) -> f64 {
        self.has_news = false;

        let (Some(beg), Some(end)) = (self.window.front(), self.window.back()) else {
            return 0.0
        };

        let duration = end.time.duration_since(beg.time).as_secs_f64();
        if duration == 0.0 {
            return 0.0
        }

        (end.height - beg.height) as f64 / duration
    }
}


#[cfg(test)]
mod test {
    use super::Progress;
    use std::num::NonZeroUsize;
    use std::time::{Duration, Instant};


    #[test]
    fn speed_over_window() {
        let mut progress = Progress::new(NonZeroUsize::new(3).unwrap(), Duration::from_secs(1));
        let t0 = Instant::now();

        assert_eq!(progress.speed(), 0.0);

        progress.record_at(0, t0);
        progress.record_at(10, t0 + Duration::from_secs(2));
        assert!(progress.has_news());
        assert_eq!(progress.speed(), 5.0);
        assert!(!progress.has_news());

        progress.record_at(20, t0 + Duration::from_secs(4));
        progress.record_at(30, t0 + Duration::from_secs(6));
        progress.record_at(40, t0 + Duration::from_secs(8));
        // the first sample has left the window
        assert_eq!(progress.speed(), 30.0 / 6.0);
        assert_eq!(progress.current_height(), Some(40));
    }

    #[test]
    fn close_samples_are_merged() {
        let mut progress = Progress::new(NonZeroUsize::new(3).unwrap(), Duration::from_secs(1));
        let t0 = Instant::now();

        progress.record_at(0, t0);
        progress.record_at(1, t0 + Duration::from_secs(2));
        progress.record_at(5, t0 + Duration::from_millis(2500));
        assert_eq!(progress.current_height(), Some(5));
        assert_eq!(progress.speed(), 5.0 / 2.0);
    }
}
