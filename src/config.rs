use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::fs;

use crate::domain::model::{ClassNames, ModelId, YoloParams};

pub const DEFAULT_MODEL_PATH: &str = "models/mi_detector_v1.onnx";

/// Server configuration, from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "yolo-detect-api", version, about = "YOLO object detection over HTTP")]
pub struct ServerConfig {
    /// ONNX model artifact.
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: String,

    /// Optional JSON file overriding class labels, e.g. `{"0": "Persona X"}`.
    #[arg(long, env = "CLASS_NAMES")]
    pub class_names: Option<String>,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Square model input size; must match the size used at training time.
    #[arg(long, env = "IMGSZ", default_value_t = 640, value_parser = clap::value_parser!(u32).range(32..))]
    pub imgsz: u32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou: f32,

    #[arg(
        long,
        env = "MAX_DET",
        default_value_t = 300,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_det: usize,

    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_id(&self) -> ModelId {
        ModelId::from_path(&self.model_path)
    }

    pub fn yolo_params(&self) -> YoloParams {
        YoloParams {
            input_size: self.imgsz,
            iou_threshold: self.iou,
            max_detections: self.max_det,
            ..YoloParams::default()
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn load_class_overrides(&self) -> Result<Option<ClassNames>> {
        self.class_names.as_deref().map(load_class_names).transpose()
    }
}

/// Reads a JSON object mapping class indices (as strings) to labels.
pub fn load_class_names(path: &str) -> Result<ClassNames> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading class names from {path}"))?;
    let map: HashMap<String, String> =
        serde_json::from_str(&raw).with_context(|| format!("parsing class names in {path}"))?;

    map.into_iter()
        .map(|(k, v)| {
            let id = k
                .trim()
                .parse::<usize>()
                .with_context(|| format!("class index {k:?} in {path} is not an integer"))?;
            Ok((id, v))
        })
        .collect()
}
