use once_cell::sync::Lazy;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

// Registry and metrics are initialized lazily.
static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("wpsf_tap".to_string()), None).expect("valid metrics prefix")
});

static RECORDS_EMITTED: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new("records_emitted_total", "Records written to the sink");
    let c = CounterVec::new(opts, &["stream"]).expect("valid counter");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static RESOURCES_FETCHED: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new("resources_fetched_total", "Feeds retrieved from upstream");
    let c = CounterVec::new(opts, &["plugin"]).expect("valid counter");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static SYNC_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new("stream_sync_duration_ms", "Stream sync duration in milliseconds");
    let hist = HistogramVec::new(opts, &["stream"]).expect("valid histogram");
    REGISTRY.register(Box::new(hist.clone())).ok();
    hist
});

/// Count one record written for a stream.
pub fn inc_record(stream: &str) {
    RECORDS_EMITTED.with_label_values(&[stream]).inc();
}

/// Count one feed retrieved for a plugin.
pub fn inc_resource(plugin: &str) {
    RESOURCES_FETCHED.with_label_values(&[plugin]).inc();
}

/// Observe how long a stream took to sync, in milliseconds.
pub fn observe_duration(stream: &str, duration_ms: f64) {
    SYNC_DURATION_MS.with_label_values(&[stream]).observe(duration_ms);
}

/// Current value of the record counter for a stream.
pub fn records_emitted(stream: &str) -> f64 {
    RECORDS_EMITTED.with_label_values(&[stream]).get()
}

/// Gather metrics as text in Prometheus exposition format.
pub fn gather_text() -> String {
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
