use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use yolo_detect_api::adapters::{
    http::{router, state::HttpState},
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
};
use yolo_detect_api::application::{ports::ModelCatalogPort, services::DetectionService};
use yolo_detect_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServerConfig::parse();
    let model_id = cfg.model_id();
    let class_overrides = cfg.load_class_overrides()?;

    // 2. Validar y cargar el modelo una sola vez; cualquier fallo aquí es fatal.
    tracing::info!("🔧 Cargando modelo {}...", model_id.onnx_path);
    OnnxModelCatalog::new().validate_model(&model_id).await?;

    let onnx_path = model_id.onnx_path.clone();
    let intra_threads = cfg.intra_threads;
    let engine = tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&onnx_path, intra_threads))
        .await
        .context("la tarea de carga del modelo falló")?
        .with_context(|| format!("cargando modelo {}", model_id.onnx_path))?;

    // 3. Caso de uso sobre el motor ya cargado
    let detector = Arc::new(OnnxDetector::new(engine));
    let detection = Arc::new(DetectionService::new(detector, model_id, cfg.yolo_params(), class_overrides));

    // Warmup opcional: si falla, la primera petición real paga el coste.
    match detection.warmup().await {
        Ok(()) => tracing::info!("🔥 Warmup completado"),
        Err(e) => tracing::warn!("⚠️ Warmup fallido, continuamos: {e}"),
    }

    // 4. Estado de la API y router de Axum
    let state = HttpState {
        detection: detection.clone(),
        max_upload_bytes: cfg.max_upload_bytes(),
    };
    let app = router(state);

    let addr = cfg.bind_addr();
    tracing::info!(
        "🚀 Servidor YOLO iniciado en http://{} (device={}, model={})",
        addr,
        detection.config().device,
        detection.config().model.name
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Servidor detenido");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("No se pudo escuchar Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("No se pudo escuchar SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Señal de apagado recibida");
}
