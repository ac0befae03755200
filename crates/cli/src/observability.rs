//! Tracing subscriber setup.
//!
//! Installs an `EnvFilter`, a pretty or JSON formatter on stderr, and, when
//! an OTLP endpoint is configured, an OpenTelemetry layer that exports spans
//! in batches on the tokio runtime. Keep the returned [`TelemetryGuard`]
//! alive for the life of the process; dropping it flushes pending spans.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, ObservabilitySettings};

const DEFAULT_FILTER: &str = "info";

/// Flushes and shuts down the OTLP exporter on drop.
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to flush OpenTelemetry spans: {err}");
            }
        }
    }
}

/// Installs the global subscriber.
///
/// Filter precedence: `RUST_LOG`, then `observability.log_filter`, then `info`.
pub fn init(settings: &ObservabilitySettings) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(settings.log_filter.as_deref().unwrap_or(DEFAULT_FILTER))
    })?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match settings.log_format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    });

    let provider = match settings.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()?;
            let provider = TracerProvider::builder()
                .with_batch_exporter(exporter, runtime::Tokio)
                .with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    settings.service_name.clone(),
                )]))
                .build();
            let tracer = provider.tracer(settings.service_name.clone());
            layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
            Some(provider)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    if let Some(endpoint) = settings.otlp_endpoint.as_deref() {
        tracing::info!(endpoint, service = %settings.service_name, "OTLP span export enabled");
    }

    Ok(TelemetryGuard { provider })
}
