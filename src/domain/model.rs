use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Class index to human-readable name.
pub type ClassNames = BTreeMap<usize, String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelId {
    pub name: String,       // file name reported by the health endpoint
    pub onnx_path: String,  // filesystem path
}

impl ModelId {
    /// Builds the id from an artifact path, using its base file name as the logical name.
    pub fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        Self { name, onnx_path: path.to_string() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;
pub const WARMUP_CONF_THRESHOLD: f32 = 0.25;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

impl YoloParams {
    pub fn with_conf(&self, conf_threshold: f32) -> Self {
        Self { conf_threshold, ..self.clone() }
    }
}

/// Process-wide model configuration, fixed once the engine is loaded.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model: ModelId,
    pub device: Device,
    pub params: YoloParams,
    pub class_overrides: Option<ClassNames>,
}
