use image::RgbImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::{
    application::{
        dto::{HealthResponse, PredictResponse},
        imaging::decode_rgb,
        ports::DetectorPort,
    },
    domain::{
        detection::Detection,
        errors::{DomainError, DomainResult},
        labels::LabelResolver,
        model::{ClassNames, ModelConfig, ModelId, YoloParams, DEFAULT_CONF_THRESHOLD, WARMUP_CONF_THRESHOLD},
    },
};

/// Predict use case: decode the upload, run the detector and label its output.
///
/// Built once at startup and shared read-only by every request handler.
pub struct DetectionService {
    detector: Arc<dyn DetectorPort>,
    labels: LabelResolver,
    config: ModelConfig,
}

impl DetectionService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        model: ModelId,
        params: YoloParams,
        class_overrides: Option<ClassNames>,
    ) -> Self {
        let labels = LabelResolver::new(class_overrides.clone(), detector.class_names().clone());
        let config = ModelConfig {
            model,
            device: detector.device(),
            params,
            class_overrides,
        };
        Self { detector, labels, config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".into(),
            device: self.config.device.to_string(),
            model: self.config.model.name.clone(),
        }
    }

    /// Runs detection on an encoded image. `conf` defaults to 0.5 when absent.
    pub async fn predict(&self, image_bytes: Vec<u8>, conf: Option<f32>) -> DomainResult<PredictResponse> {
        let conf = conf.unwrap_or(DEFAULT_CONF_THRESHOLD);
        let n_bytes = image_bytes.len();

        let image = tokio::task::spawn_blocking(move || decode_rgb(&image_bytes))
            .await
            .map_err(|e| DomainError::Inference(format!("decode task failed: {e}")))??;

        let t0 = Instant::now();
        let raw = self.detector.detect(image, self.config.params.with_conf(conf)).await?;
        let infer_ms = t0.elapsed().as_secs_f32() * 1000.0;

        let detections: Vec<Detection> = raw
            .into_iter()
            .map(|r| Detection {
                bbox: r.bbox,
                label: self.labels.resolve(r.class_id),
                score: r.score,
            })
            .collect();

        debug!(n_bytes, conf, count = detections.len(), infer_ms, "predict done");
        Ok(PredictResponse { detections })
    }

    /// Throwaway inference on a black square to pre-allocate engine resources.
    pub async fn warmup(&self) -> DomainResult<()> {
        let size = self.config.params.input_size;
        let blank = RgbImage::new(size, size);
        self.detector
            .detect(blank, self.config.params.with_conf(WARMUP_CONF_THRESHOLD))
            .await
            .map(|_| ())
    }
}
