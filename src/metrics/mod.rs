//! Prometheus metrics for the inference service

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer};
