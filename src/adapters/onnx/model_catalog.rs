use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

impl Default for OnnxModelCatalog {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        let path = Path::new(&model.onnx_path);
        if !path.exists() {
            return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
        }
        if !path.is_file() {
            return Err(DomainError::InvalidInput(format!("model path is not a file: {}", model.onnx_path)));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            tracing::warn!("El fichero {} no tiene extensión .onnx, se carga igualmente", model.onnx_path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_path() {
        let err = OnnxModelCatalog::new().validate_model(&ModelId::from_path("  ")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_missing_file() {
        let id = ModelId::from_path("/nonexistent/models/yolo.onnx");
        let err = OnnxModelCatalog::new().validate_model(&id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let id = ModelId::from_path(dir.path().to_str().unwrap());
        let err = OnnxModelCatalog::new().validate_model(&id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn accepts_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.onnx");
        std::fs::write(&path, b"onnx").unwrap();
        let id = ModelId::from_path(path.to_str().unwrap());
        assert!(OnnxModelCatalog::new().validate_model(&id).await.is_ok());
    }
}
