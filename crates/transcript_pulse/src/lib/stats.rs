use std::time::{Duration, Instant};

/// Collects per-run statistics for the batch loop. Purely additive;
/// recorded entries are never mutated.
#[derive(Debug)]
pub struct StatCollector {
    started_at: Instant,
    successes: usize,
    private_videos: Vec<String>,
    failed_requests: Vec<String>,
}

impl Default for StatCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatCollector {
    pub fn new() -> Self {
        StatCollector {
            started_at: Instant::now(),
            successes: 0,
            private_videos: Vec::new(),
            failed_requests: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    pub fn record_private(&mut self, url: impl Into<String>) {
        self.private_videos.push(url.into());
    }

    pub fn record_failure(&mut self, url: impl Into<String>) {
        self.failed_requests.push(url.into());
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn private_videos(&self) -> &[String] {
        &self.private_videos
    }

    pub fn failed_requests(&self) -> &[String] {
        &self.failed_requests
    }

    /// Renders the end-of-run summary: the private and failed URL
    /// lists, the three counts, and the elapsed wall-clock time.
    pub fn render(&self) -> String {
        self.render_with_elapsed(self.started_at.elapsed())
    }

    fn render_with_elapsed(&self, elapsed: Duration) -> String {
        let total_secs = elapsed.as_secs_f64();
        let hours = (total_secs / 3600.0).floor();
        let minutes = ((total_secs % 3600.0) / 60.0).floor();
        let seconds = total_secs - 3600.0 * hours - 60.0 * minutes;

        format!(
            "Private:\n\t{}\nFailed:\n\t{}\nSuccesses: {}\nPrivate: {}\nFailed: {}\nTotal elapsed time: {}h {}m {:.2}s",
            self.private_videos.join("\n\t"),
            self.failed_requests.join("\n\t"),
            self.successes,
            self.private_videos.len(),
            self.failed_requests.len(),
            hours,
            minutes,
            seconds,
        )
    }
}
