//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// Opens an `INFO` span per request (method, URI, version) and logs the status
/// and latency in milliseconds when the response is produced. A cold `/users`
/// request spans the whole aggregation, so its latency is the population time.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/users version=HTTP/1.1}: finished processing request latency=2310 ms status=200
/// INFO request{method=GET uri=/users version=HTTP/1.1}: finished processing request latency=4 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
