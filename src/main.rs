use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use contract_intel::{
    analysis::ContractAnalyzer,
    api::{build_router, AppState, RouterOptions},
    auth::{AuthProvider, InMemoryAuthProvider},
    config::{AppConfig, ReportFormat},
    extractor::{RoutingExtractor, TextExtractor},
    labeler::build_labeler,
    report::{DocumentRenderer, JsonReportRenderer, TextReportRenderer},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    telemetry::init(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let labeler = build_labeler(&config.labeler).context("Failed to create clause labeler")?;
    info!("Using {} clause labeler", labeler.name());

    let analyzer = Arc::new(ContractAnalyzer::new(labeler, config.analysis.clone()));

    let extractor: Arc<dyn TextExtractor> = Arc::new(
        RoutingExtractor::from_config(&config.extractor)
            .context("Failed to create text extractor")?,
    );
    let renderer: Arc<dyn DocumentRenderer> = match config.reporting.format {
        ReportFormat::Text => Arc::new(TextReportRenderer::new(config.reporting.lines_per_page)),
        ReportFormat::Json => Arc::new(JsonReportRenderer),
    };
    let auth: Arc<dyn AuthProvider> = Arc::new(InMemoryAuthProvider::from_config(&config.auth));

    let state = AppState {
        analyzer,
        extractor,
        renderer,
        auth,
        report_dir: config.reporting.output_dir.clone(),
    };

    let router = build_router(
        state,
        RouterOptions {
            max_body_bytes: config.server.max_body_bytes,
            cors_permissive: config.server.cors_permissive,
        },
    );

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Contract intelligence API listening on {}", bind_address);

    axum::serve(listener, router)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
