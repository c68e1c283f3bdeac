//! Metrics collection using Prometheus
//!
//! Counters and histograms for the prediction endpoint, registered on a
//! private registry that the `/metrics` route renders.

use anyhow::Result;
use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for the inference service
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    /// Individual predictions returned to callers
    pub predictions_total: IntCounter,

    /// Failed invocations by reason
    pub invocation_errors_total: IntCounterVec,

    /// End-to-end invocation latency
    pub invocation_duration: Histogram,

    /// Mean home-win probability of the most recent request
    pub average_home_win_probability: Gauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let predictions_total = IntCounter::new(
            "wsl_forecast_predictions_generated_total",
            "Total predictions generated",
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let invocation_errors_total = IntCounterVec::new(
            Opts::new(
                "wsl_forecast_invocation_errors_total",
                "Failed invocations by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(invocation_errors_total.clone()))?;

        let invocation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "wsl_forecast_invocation_duration_seconds",
                "Invocation processing time",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(invocation_duration.clone()))?;

        let average_home_win_probability = Gauge::new(
            "wsl_forecast_average_home_win_probability",
            "Average home-win probability of the last request",
        )?;
        registry.register(Box::new(average_home_win_probability.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            invocation_errors_total,
            invocation_duration,
            average_home_win_probability,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a successful invocation
    pub fn record_predictions(&self, home_win_probabilities: &[f64], duration: Duration) {
        self.predictions_total
            .inc_by(home_win_probabilities.len() as u64);
        if !home_win_probabilities.is_empty() {
            let mean = home_win_probabilities.iter().sum::<f64>()
                / home_win_probabilities.len() as f64;
            self.average_home_win_probability.set(mean);
        }
        self.invocation_duration.observe(duration.as_secs_f64());
    }

    pub fn record_error(&self, reason: &str) {
        self.invocation_errors_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}
