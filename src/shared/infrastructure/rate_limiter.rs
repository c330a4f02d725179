// Fixed window rate limiter: at most `max_per_window` permits per window.

use std::time::Duration;
use tokio::time::Instant;

pub struct WindowRateLimiter {
    max_per_window: u32,
    window: Duration,
    count: u32,
    window_start: Instant,
}

impl WindowRateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            window,
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Takes a permit at `now`, or returns how long until the window resets.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), Duration> {
        if now.duration_since(self.window_start) >= self.window {
            self.count = 0;
            self.window_start = now;
        }
        if self.count >= self.max_per_window {
            return Err(self.window - now.duration_since(self.window_start));
        }
        self.count += 1;
        Ok(())
    }

    pub async fn acquire(&mut self) {
        while let Err(wait) = self.try_acquire_at(Instant::now()) {
            tokio::time::sleep(wait).await;
        }
    }
}
