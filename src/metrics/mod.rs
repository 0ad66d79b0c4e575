//! Prometheus metrics for the price pipeline and HTTP API
//!
//! This module tracks:
//! - Cache: film price lookups by result, cache writes
//! - Pipeline: upstream price fetches, per-film failures, resolve duration
//! - API: requests by endpoint and status, request duration
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_histogram, register_histogram_vec,
    Counter, CounterVec, Encoder, Histogram, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for pipeline metrics
struct PipelineMetrics {
    cache_lookups: CounterVec,
    cache_writes: CounterVec,
    price_fetches: CounterVec,
    film_failures: CounterVec,
    director_requests: Counter,
    resolve_duration: Histogram,
}

/// Container for HTTP API metrics
struct ApiMetrics {
    requests: CounterVec,
    duration: HistogramVec,
}

static PIPELINE_METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

static API_METRICS: OnceLock<ApiMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = reelcost::metrics::init_metrics() {
///     tracing::warn!(error = %e, "Metrics initialization failed");
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let pipeline = PipelineMetrics {
        cache_lookups: register_counter_vec!(
            "reelcost_cache_lookups_total",
            "Film price cache lookups by result (hit, miss, corrupt, error)",
            &["result"]
        )?,
        cache_writes: register_counter_vec!(
            "reelcost_cache_writes_total",
            "Film price cache writes by result",
            &["result"]
        )?,
        price_fetches: register_counter_vec!(
            "reelcost_price_fetches_total",
            "Upstream availability fetches by outcome",
            &["outcome"]
        )?,
        film_failures: register_counter_vec!(
            "reelcost_film_failures_total",
            "Films that could not be priced, by error category",
            &["category"]
        )?,
        director_requests: register_counter!(
            "reelcost_director_requests_total",
            "Total director price requests"
        )?,
        resolve_duration: register_histogram!(
            "reelcost_resolve_duration_seconds",
            "Time spent resolving prices for one director's films",
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        )?,
    };

    let api = ApiMetrics {
        requests: register_counter_vec!(
            "reelcost_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        duration: register_histogram_vec!(
            "reelcost_api_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
        )?,
    };

    PIPELINE_METRICS
        .set(pipeline)
        .map_err(|_| "Pipeline metrics already initialized")?;
    API_METRICS
        .set(api)
        .map_err(|_| "API metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a film price cache lookup
pub fn record_cache_lookup(result: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.cache_lookups.with_label_values(&[result]).inc();
    }
}

/// Record a film price cache write
pub fn record_cache_write(ok: bool) {
    if let Some(m) = PIPELINE_METRICS.get() {
        let result = if ok { "ok" } else { "error" };
        m.cache_writes.with_label_values(&[result]).inc();
    }
}

/// Record an upstream availability fetch
pub fn record_price_fetch(outcome: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.price_fetches.with_label_values(&[outcome]).inc();
    }
}

/// Record a film that ended up unpriced
pub fn record_film_failure(category: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.film_failures.with_label_values(&[category]).inc();
    }
}

/// Record a director price request
pub fn record_director_request() {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.director_requests.inc();
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = API_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.requests
        .with_label_values(&[endpoint, &status_str])
        .inc();
    m.duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a resolve timer for one director's fan-out
pub fn start_resolve_timer() -> MetricsTimer {
    match PIPELINE_METRICS.get() {
        Some(m) => MetricsTimer::new(m.resolve_duration.start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
