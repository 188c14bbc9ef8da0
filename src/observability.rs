//! Logging setup and request counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::TelemetryConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this twice is a no-op.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Scoped subscriber for startup, before the configured filter is known.
///
/// Filters on `RUST_LOG`, falling back to `info`. Logging reverts to the
/// previous dispatcher when the guard is dropped.
pub fn bootstrap_logging() -> DefaultGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).set_default()
}

/// Counters for recording extractor activity
#[derive(Debug, Default)]
pub struct Metrics {
    info_requests: AtomicU64,
    info_failed: AtomicU64,
    downloads_started: AtomicU64,
    downloads_served: AtomicU64,
    downloads_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info_requested(&self) {
        self.info_requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "info_requests", "Metric incremented");
    }

    pub fn info_failed(&self) {
        self.info_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "info_failed", "Metric incremented");
    }

    pub fn download_started(&self) {
        self.downloads_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_started", "Metric incremented");
    }

    /// A staged file was handed to the response body. The client may still
    /// abandon the transfer after this point.
    pub fn download_served(&self) {
        self.downloads_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_served", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            info_requests: self.info_requests.load(Ordering::Relaxed),
            info_failed: self.info_failed.load(Ordering::Relaxed),
            downloads_started: self.downloads_started.load(Ordering::Relaxed),
            downloads_served: self.downloads_served.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub info_requests: u64,
    pub info_failed: u64,
    pub downloads_started: u64,
    pub downloads_served: u64,
    pub downloads_failed: u64,
}
