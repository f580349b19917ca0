//! # Prometheus Metrics
//!
//! Registry-backed metrics shared across the service. HTTP-level metrics
//! (request counts, latency) are recorded in middleware; pipeline metrics
//! (AI call latency, workflow trigger outcomes) are recorded by the
//! orchestrator; document/analysis gauges are updated on each `/metrics`
//! scrape (pull model).

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,

    // -- Pipeline metrics (push model) --
    ai_request_duration_seconds: Histogram,
    workflow_triggers_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    documents_total: prometheus::Gauge,
    analyses_total: prometheus::Gauge,
    analyses_awaiting_feedback: prometheus::Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics").finish_non_exhaustive()
    }
}

impl ApiMetrics {
    /// Create a metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("docflow_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "docflow_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let ai_request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "docflow_ai_request_duration_seconds",
                "GenAI inference call duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )
        .expect("metric can be created");

        let workflow_triggers_total = IntCounterVec::new(
            Opts::new(
                "docflow_workflow_triggers_total",
                "Workflow trigger attempts by outcome",
            ),
            &["outcome"],
        )
        .expect("metric can be created");

        let documents_total =
            prometheus::Gauge::new("docflow_documents_total", "Total stored documents")
                .expect("metric can be created");
        let analyses_total =
            prometheus::Gauge::new("docflow_analyses_total", "Total stored analyses")
                .expect("metric can be created");
        let analyses_awaiting_feedback = prometheus::Gauge::new(
            "docflow_analyses_awaiting_feedback",
            "Analyses currently flagged for human correction",
        )
        .expect("metric can be created");

        for metric in [
            Box::new(http_requests_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(http_request_duration_seconds.clone()),
            Box::new(ai_request_duration_seconds.clone()),
            Box::new(workflow_triggers_total.clone()),
            Box::new(documents_total.clone()),
            Box::new(analyses_total.clone()),
            Box::new(analyses_awaiting_feedback.clone()),
        ] {
            registry.register(metric).expect("metric registers once");
        }

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                ai_request_duration_seconds,
                workflow_triggers_total,
                documents_total,
                analyses_total,
                analyses_awaiting_feedback,
            }),
        }
    }

    /// Record one GenAI round trip.
    pub fn observe_ai_latency(&self, elapsed: Duration) {
        self.inner
            .ai_request_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    /// Count a workflow trigger outcome.
    pub fn record_workflow_outcome(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.inner
            .workflow_triggers_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Update the domain gauges; called on each scrape.
    pub fn set_domain_gauges(&self, documents: usize, analyses: usize, awaiting_feedback: usize) {
        self.inner.documents_total.set(documents as f64);
        self.inner.analyses_total.set(analyses as f64);
        self.inner
            .analyses_awaiting_feedback
            .set(awaiting_feedback as f64);
    }

    /// Encode the registry in Prometheus text exposition format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let families = self.inner.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buf).map_err(|e| e.to_string())
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Record request count and latency for every routed request.
pub async fn metrics_middleware(
    Extension(metrics): Extension<ApiMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    // Raw paths would explode label cardinality with per-document ids, so
    // record the matched route pattern when axum provides one.
    let path = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    metrics
        .inner
        .http_requests_total
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();
    metrics
        .inner
        .http_request_duration_seconds
        .with_label_values(&[&method, &path])
        .observe(elapsed.as_secs_f64());

    response
}
