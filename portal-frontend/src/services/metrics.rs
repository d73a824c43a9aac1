use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static BILLS_SUBMITTED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static BILL_PREVIEWS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static BACKEND_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Registers the collectors. Calling it again is harmless; the first
/// registry wins.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;
    let request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;
    let bills_submitted = IntCounterVec::new(
        Opts::new("bills_submitted_total", "Bills accepted by the backend"),
        &["payment_mode"],
    )?;
    let previews = IntCounter::new("bill_previews_total", "Bill previews rendered")?;
    let backend_failures = IntCounterVec::new(
        Opts::new("backend_failures_total", "Failed calls to the REST backend"),
        &["kind"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration.clone()))?;
    registry.register(Box::new(bills_submitted.clone()))?;
    registry.register(Box::new(previews.clone()))?;
    registry.register(Box::new(backend_failures.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = BILLS_SUBMITTED_TOTAL.set(bills_submitted);
    let _ = BILL_PREVIEWS_TOTAL.set(previews);
    let _ = BACKEND_FAILURES_TOTAL.set(backend_failures);
    Ok(())
}

pub fn record_request(method: &str, path: &str, status: &str, seconds: f64) {
    let labels = [method, path, status];
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&labels).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram.with_label_values(&labels).observe(seconds);
    }
}

pub fn record_bill_submitted(payment_mode: &str) {
    if let Some(counter) = BILLS_SUBMITTED_TOTAL.get() {
        counter.with_label_values(&[payment_mode]).inc();
    }
}

pub fn record_preview() {
    if let Some(counter) = BILL_PREVIEWS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_backend_failure(kind: &str) {
    if let Some(counter) = BACKEND_FAILURES_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

/// Text exposition of every registered metric; empty before [`init_metrics`].
pub fn get_metrics() -> Result<String, anyhow::Error> {
    let Some(registry) = REGISTRY.get() else {
        return Ok(String::new());
    };
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
