use std::time::Duration;

/// Configuration for the monitoring loop and its collaborators
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub cycle_interval_secs: u64,
    pub error_backoff_secs: u64,
    pub max_concurrent_fetches: usize,
    pub fetch_timeout_secs: u64,
    pub price_drop_threshold: f64, // Fractional drop vs last price that raises an alert (e.g., 0.10 = 10%)
    pub dispatch_interval_secs: u64,
    pub database_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            cycle_interval_secs: 3600,  // Check all items every hour
            error_backoff_secs: 300,    // Retry a failed cycle after 5 minutes
            max_concurrent_fetches: 8,  // Bound on outbound connections per cycle
            fetch_timeout_secs: 12,     // Per-request timeout
            price_drop_threshold: 0.10, // 10% drop vs last observed price
            dispatch_interval_secs: 60, // Unsent-alert polling interval
            database_url: "sqlite://data/pricewatch.db".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> MonitorConfig {
        let mut config = MonitorConfig::default();

        if let Ok(interval) = std::env::var("MONITOR_INTERVAL_SECS") {
            match interval.parse::<u64>() {
                Ok(value) if (10..=86_400).contains(&value) => {
                    config.cycle_interval_secs = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid MONITOR_INTERVAL_SECS value: {} (must be between 10 and 86400), using default: {}",
                        value, config.cycle_interval_secs
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse MONITOR_INTERVAL_SECS '{}': {}, using default: {}",
                        interval,
                        e,
                        config.cycle_interval_secs
                    );
                }
            }
        }

        if let Ok(backoff) = std::env::var("MONITOR_ERROR_BACKOFF_SECS") {
            if let Ok(value) = backoff.parse::<u64>() {
                if (5..=3600).contains(&value) {
                    config.error_backoff_secs = value;
                }
            }
        }

        if let Ok(max_fetches) = std::env::var("MONITOR_MAX_CONCURRENT_FETCHES") {
            if let Ok(value) = max_fetches.parse::<usize>() {
                if (1..=64).contains(&value) {
                    config.max_concurrent_fetches = value;
                }
            }
        }

        if let Ok(timeout) = std::env::var("FETCH_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                if (1..=60).contains(&value) {
                    config.fetch_timeout_secs = value;
                }
            }
        }

        if let Ok(threshold) = std::env::var("PRICE_DROP_THRESHOLD") {
            if let Ok(value) = threshold.parse::<f64>() {
                if value > 0.0 && value < 1.0 {
                    config.price_drop_threshold = value;
                }
            }
        }

        if let Ok(dispatch) = std::env::var("ALERT_DISPATCH_INTERVAL_SECS") {
            if let Ok(value) = dispatch.parse::<u64>() {
                if (5..=3600).contains(&value) {
                    config.dispatch_interval_secs = value;
                }
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        config
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_secs(self.dispatch_interval_secs)
    }
}
