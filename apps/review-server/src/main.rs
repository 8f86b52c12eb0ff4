//! Review Server
//!
//! HTTP surface for legal document review. Provides REST API endpoints for:
//!
//! - Clause extraction, risk scoring and summaries
//! - Unified diffs between document versions
//! - Precedent search
//! - Template filling and a keyword document assistant
//!
//! Every upload, risk scan, comparison and generated template is recorded in
//! a hash-linked audit log file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use precedent_search::PrecedentIndex;
use review_engine::ReviewEngine;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod audit_log;
mod error;
#[cfg(test)]
mod tests;

use api::{
    handle_analyze, handle_assistant, handle_compare, handle_fill_template, handle_health,
    handle_list_templates, handle_score_risks, handle_search_precedents,
};
use audit_log::AuditLog;

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "review-server")]
#[command(about = "Legal document review server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "REVIEW_PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "REVIEW_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Audit log file (JSON lines)
    #[arg(long, env = "REVIEW_AUDIT_LOG", default_value = "logs/audit_log.txt")]
    audit_log: PathBuf,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "REVIEW_RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Maximum request body size in bytes
    #[arg(long, env = "REVIEW_MAX_UPLOAD_BYTES", default_value = "10485760")]
    max_upload_bytes: usize,

    /// Enable verbose logging
    #[arg(short, long, env = "REVIEW_VERBOSE")]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReviewEngine>,
    pub precedents: Arc<PrecedentIndex>,
    pub audit: AuditLog,
}

impl AppState {
    pub fn new(audit: AuditLog) -> Self {
        Self {
            engine: Arc::new(ReviewEngine::new()),
            precedents: Arc::new(precedent_search::sample_index()),
            audit,
        }
    }
}

/// Routes and per-request middleware, without rate limiting
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/analyze", post(handle_analyze))
        .route("/api/risks", post(handle_score_risks))
        .route("/api/compare", post(handle_compare))
        .route("/api/precedents/search", post(handle_search_precedents))
        .route("/api/templates", get(handle_list_templates))
        .route("/api/templates/fill", post(handle_fill_template))
        .route("/api/assistant", post(handle_assistant))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting review server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit.saturating_mul(2))
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    let audit = AuditLog::open(&args.audit_log).await?;
    info!("Audit log: {}", audit.path().display());
    let state = AppState::new(audit);

    let app = build_router(state, args.max_upload_bytes).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
