use std::sync::Arc;
use crate::application::services::DetectionService;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Casos de uso de predicción y estado sobre el modelo cargado.
    pub detection: Arc<DetectionService>,
    /// Tamaño máximo del cuerpo de una petición, imágenes incluidas.
    pub max_upload_bytes: usize,
}
