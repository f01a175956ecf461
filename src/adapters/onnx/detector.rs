use async_trait::async_trait;
use image::RgbImage;
use std::sync::{Arc, Mutex};

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::RawDetection,
    errors::{DomainError, DomainResult},
    model::{ClassNames, Device, YoloParams},
};

/// `DetectorPort` over a single ONNX session.
///
/// The session needs exclusive access to run, so concurrent requests queue on the
/// mutex and execute one at a time on tokio's blocking pool.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    device: Device,
    names: ClassNames,
}

impl OnnxDetector {
    pub fn new(engine: OnnxYoloEngine) -> Self {
        let device = engine.device();
        let names = engine.class_names().clone();
        Self { engine: Arc::new(Mutex::new(engine)), device, names }
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    fn device(&self) -> Device {
        self.device
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }

    async fn detect(&self, image: RgbImage, params: YoloParams) -> DomainResult<Vec<RawDetection>> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| DomainError::Inference("engine lock poisoned".into()))?;
            engine
                .infer(&image, &params)
                .map_err(|e| DomainError::Inference(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::Inference(format!("inference task failed: {e}")))?
    }
}
