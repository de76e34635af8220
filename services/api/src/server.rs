use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationRepository, LocalFileStore, TesseractCliRecognizer,
    TextCardRenderer,
};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use card_intake::config::AppConfig;
use card_intake::error::AppError;
use card_intake::intake::{DocumentVerifier, IntakeService};
use card_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    std::fs::create_dir_all(&config.intake.upload_dir)?;
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let files = Arc::new(LocalFileStore::new(config.intake.upload_dir.clone()));
    let recognizer = Arc::new(TesseractCliRecognizer::new(
        config.intake.ocr_language.clone(),
    ));
    let verifier = DocumentVerifier::new(recognizer, config.intake.verification_mode);
    let intake_service = Arc::new(IntakeService::new(
        repository,
        files,
        verifier,
        Arc::new(TextCardRenderer),
    ));

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upload_dir = %config.intake.upload_dir.display(),
        verification_mode = ?config.intake.verification_mode,
        "card intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
