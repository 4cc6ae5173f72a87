use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::handlers::ranking_handler;
use crate::api::AppState;
use crate::auth::JwtVerifier;
use crate::config::ServerConfig;
use crate::db::{create_pool, run_migrations, PgLedger};
use crate::domain::{Clock, RankingEngine, SystemClock};

const DEFAULT_LOG_FILTER: &str = "info,sqlx=info,hyper=warn,tower=warn,h2=error";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // JSON logs; span close events carry durations
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(fmt::format::FmtSpan::CLOSE),
    );

    #[cfg(feature = "otel")]
    {
        if std::env::var("OTEL_ENABLED").map(|v| v == "true").unwrap_or(false) {
            match otel::init_provider() {
                Ok(provider) => {
                    use opentelemetry::trace::TracerProvider as _;

                    opentelemetry::global::set_tracer_provider(provider.clone());
                    let tracer = provider.tracer("leaderboard-engine");
                    subscriber
                        .with(tracing_opentelemetry::OpenTelemetryLayer::new(tracer))
                        .init();
                    info!("OpenTelemetry enabled");
                    return;
                }
                Err(e) => {
                    eprintln!("Failed to initialize OpenTelemetry: {}. Continuing with logs only.", e);
                }
            }
        }
    }

    subscriber.init();
}

#[cfg(feature = "otel")]
mod otel {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::{
        trace::{Sampler, SdkTracerProvider},
        Resource,
    };
    use std::env;

    pub fn init_provider() -> Result<SdkTracerProvider, Box<dyn std::error::Error>> {
        let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4318/v1/traces".to_string());
        let service_name =
            env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "leaderboard-engine".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Default 1% sampling
        let sampling_rate = env::var("OTEL_TRACE_SAMPLING_RATE")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.01)
            .clamp(0.0, 1.0);

        let resource = Resource::builder()
            .with_attribute(KeyValue::new("service.name", service_name))
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .with_attribute(KeyValue::new("deployment.environment", environment))
            .build();

        let exporter = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            SpanExporter::builder()
                .with_http()
                .with_endpoint(endpoint)
                .build()?
        } else {
            SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()?
        };

        Ok(SdkTracerProvider::builder()
            .with_resource(resource)
            .with_sampler(Sampler::TraceIdRatioBased(sampling_rate))
            .with_batch_exporter(exporter)
            .build())
    }
}

/// Router with all routes; state is injected so tests can use an in-memory ledger
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ranking", get(ranking_handler))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire the production engine: Postgres ledger and wall clock
pub async fn create_app(config: &ServerConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let ranking = config.ranking;
    info!(zone = ?ranking.zone, "Leaderboard windows zone");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(ranking.zone));
    let ledger = Arc::new(PgLedger::new(pool, ranking.ledger_max_retries));
    let engine = RankingEngine::new(ledger, clock, ranking.limits);

    Ok(build_router(AppState::new(engine, JwtVerifier::new(&config.jwt_secret))))
}

async fn health_check() -> &'static str {
    "OK"
}

pub async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting leaderboard ranking server");

    let config = ServerConfig::from_env()?;

    // Set up ctrl-c handler for graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down gracefully...");
    };

    let app = create_app(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
