use anyhow::{bail, Result};
use image::RgbImage;
use ndarray::{Array4, ArrayView3, Axis};
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use ort::session::Session;
use ort::value::Tensor;
use std::fs;
use tracing::{info, warn};

use crate::adapters::onnx::metadata::parse_class_names;
use crate::adapters::onnx::postprocess::{decode_output, letterbox, nms};
use crate::domain::detection::RawDetection;
use crate::domain::model::{ClassNames, Device, YoloParams};

pub struct OnnxYoloEngine {
    session: Session,
    device: Device,
    names: ClassNames,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, intra_threads: usize) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(intra_threads)?;
        let mut device = Device::Cpu;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default();
        if cuda.is_available().unwrap_or(false) {
            match builder.clone().with_execution_providers([cuda.build().error_on_failure()]) {
                Ok(builder_with_cuda) => {
                    builder = builder_with_cuda;
                    device = Device::Cuda;
                }
                Err(e) => warn!("CUDA disponible pero no se pudo registrar, usando CPU: {e}"),
            }
        }

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        let names = match session.metadata().and_then(|m| m.custom("names")) {
            Ok(Some(raw)) => parse_class_names(&raw),
            Ok(None) => ClassNames::new(),
            Err(e) => {
                warn!("No se pudieron leer los metadatos del modelo: {e}");
                ClassNames::new()
            }
        };
        if names.is_empty() {
            warn!("El modelo no trae nombres de clase; se usará class_<índice>");
        }

        info!(path, %device, classes = names.len(), "Modelo YOLO cargado");
        Ok(Self { session, device, names })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.names
    }

    /// Runs the model on `rgb`. Boxes come back in `rgb` pixel coordinates after NMS.
    pub fn infer(&mut self, rgb: &RgbImage, params: &YoloParams) -> Result<Vec<RawDetection>> {
        let (padded, lb) = letterbox(rgb, params.input_size);
        let imgsz = params.input_size as usize;

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in padded.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (data, _) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, data))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        if dims.len() != 3 {
            bail!("expected a rank-3 output tensor, got shape {:?}", dims);
        }
        let array_view = ArrayView3::from_shape((dims[0], dims[1], dims[2]), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        let candidates = decode_output(view, &lb, params)?;
        Ok(nms(candidates, params.iou_threshold, params.max_detections))
    }
}
