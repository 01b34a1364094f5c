use crate::config::TelemetryConfig;
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, debug_span, field};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "carshop-rest";

/// OpenTelemetry primitives which export data to a collector. Each is only present when its
/// export endpoint is configured.
pub struct OtelExporters {
    pub tracer: Option<Tracer>,
    pub meter: Option<SdkMeterProvider>,
}

/// Attaches a tracing middleware layer to the given router.
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let req_span = debug_span!(
                        "request",
                        method = &request.method().as_str(),
                        path = request.uri().path(),
                        response_status = field::Empty,
                    );

                    req_span.set_parent(global::get_text_map_propagator(|propagator| {
                        propagator.extract(&HeaderExtractor(request.headers()))
                    }));

                    req_span
                })
                .on_response(
                    |response: &Response<Body>, _latency: Duration, span: &Span| {
                        span.record("response_status", field::display(response.status()));
                        debug!("request processing complete");
                    },
                ),
        ),
    )
}

fn service_resource() -> Resource {
    Resource::new([KeyValue::new("service.name", SERVICE_NAME)])
}

/// Instantiates the OpenTelemetry exporters configured in [telemetry]. They run in the background
/// and send data to an OTLP gRPC endpoint (typically http://localhost:4317 with a standard
/// sidecar setup).
pub fn init_exporters(telemetry: &TelemetryConfig) -> Result<OtelExporters, anyhow::Error> {
    let tracer = match telemetry.span_export_url.as_deref() {
        Some(endpoint) => {
            let span_export = SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
                .context("building the span exporter")?;
            let trace_provider = opentelemetry_sdk::trace::TracerProvider::builder()
                .with_batch_exporter(span_export, runtime::Tokio)
                .with_resource(service_resource())
                .build();

            Some(trace_provider.tracer(SERVICE_NAME))
        }
        None => None,
    };

    let meter = match telemetry.metric_export_url.as_deref() {
        Some(endpoint) => {
            let meter_export = MetricExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
                .context("building the metric exporter")?;
            let metrics_reader = PeriodicReader::builder(meter_export, runtime::Tokio).build();

            Some(
                SdkMeterProvider::builder()
                    .with_reader(metrics_reader)
                    .with_resource(service_resource())
                    .build(),
            )
        }
        None => None,
    };

    Ok(OtelExporters { tracer, meter })
}

/// Constructs a filter from the configured log directives. Filters to the "info" level by default.
pub fn init_env_filter(log_level: Option<&str>) -> Result<EnvFilter, anyhow::Error> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(log_level.unwrap_or_default())
        .context("building the logging filter")
}

/// Sets up the global logging and tracing sinks. All logs and metrics at the "debug" level and above
/// are sent to whichever OpenTelemetry sinks [otel_exporters] provides. [env_filter] is applied
/// specifically to the JSON logger printing to stdout.
pub fn setup_logging_and_tracing(
    env_filter: EnvFilter,
    otel_exporters: OtelExporters,
) -> Result<(), anyhow::Error> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    registry()
        .with(LevelFilter::DEBUG)
        .with(otel_exporters.tracer.map(OpenTelemetryLayer::new))
        .with(otel_exporters.meter.map(MetricsLayer::new))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_filter(env_filter),
        )
        .try_init()
        .context("installing the global tracing subscriber")?;

    Ok(())
}
