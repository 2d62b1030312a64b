/// Configuration for the status poller
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Polling interval in milliseconds
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            // Observed cadence of the platform: 2-3 seconds
            interval_ms: 2500,
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, ms: u64) -> Self {
        self.interval_ms = ms;
        self
    }
}
