use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime,
    trace::{Tracer, TracerProvider},
    Resource,
};
use std::{env::var, sync::OnceLock, time::Duration};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};
use ulid::Ulid;

static TRACER_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

fn normalize_endpoint(ep: String) -> String {
    if ep.starts_with("http://") || ep.starts_with("https://") {
        ep
    } else {
        // Default to https for gRPC if no scheme supplied
        format!("https://{}", ep.trim_end_matches('/'))
    }
}

fn init_tracer(endpoint: String) -> Result<Tracer> {
    let endpoint = normalize_endpoint(endpoint);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3))
        .build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let trace_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance_id),
        ]))
        .build();

    let _ = TRACER_PROVIDER.set(trace_provider.clone());

    global::set_tracer_provider(trace_provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    Ok(trace_provider.tracer(env!("CARGO_PKG_NAME")))
}

fn env_filter(verbosity_level: Level) -> Result<EnvFilter> {
    // RUST_LOG= overrides the verbosity flag
    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?))
}

/// Initialize logging and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, the OTLP
/// trace exporter (gRPC).
///
/// # Errors
///
/// Returns an error if tracer or subscriber initialization fails
pub fn init(verbosity_level: Option<Level>, json: bool) -> Result<()> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    let fmt_layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(false)
            .boxed()
    } else {
        fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_target(false)
            .pretty()
            .boxed()
    };

    let filter = env_filter(verbosity_level)?;

    if let Ok(endpoint) = var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let tracer = init_tracer(endpoint)?;
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let subscriber = Registry::default()
            .with(fmt_layer)
            .with(otel_layer)
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Flush and stop the trace exporter; noop if it was never started.
pub fn shutdown_tracer() {
    if let Some(tp) = TRACER_PROVIDER.get() {
        debug!("shutting down tracer provider");
        let _ = tp.shutdown();
    }
}
