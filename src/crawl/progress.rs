// src/crawl/progress.rs
// =============================================================================
// Progress reporting for long runs.
//
// Every link stands for two pages (article + comments), so the total is twice
// the frontier size. After each link we log something like:
//
//   42% 84/200 scraped in 0 days 1 hours 3 minutes and 12 seconds
// =============================================================================

use std::time::{Duration, Instant};
use tracing::info;

pub struct Progress {
    started: Instant,
    done: usize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Progress {
            started: Instant::now(),
            done: 0,
            total,
        }
    }

    pub fn advance(&mut self, pages: usize) {
        self.done += pages;
        let percent = if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        };
        info!(
            done = self.done,
            total = self.total,
            "{}% {}/{} scraped in {}",
            percent,
            self.done,
            self.total,
            format_elapsed(self.started.elapsed())
        );
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{} days {} hours {} minutes and {} seconds",
        secs / 86_400,
        secs / 3_600 % 24,
        secs / 60 % 60,
        secs % 60
    )
}
