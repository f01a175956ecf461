//! Pre/post-processing around the YOLO forward pass.
//!
//! Kept free of `ort` so the geometry and filtering can be tested without a model.

use anyhow::{bail, Result};
use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::{s, ArrayView2};

use crate::domain::detection::{BBox, RawDetection};
use crate::domain::model::YoloParams;

const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox resize: source scaled uniformly, then centred on a square canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub src_w: u32,
    pub src_h: u32,
}

impl Letterbox {
    pub fn new(src_w: u32, src_h: u32, size: u32) -> Self {
        let (w, h) = (src_w.max(1), src_h.max(1));
        let scale = (size as f32 / w as f32).min(size as f32 / h as f32);
        let (new_w, new_h) = Self::scaled(w, h, scale, size);
        Self {
            scale,
            pad_x: (size - new_w) / 2,
            pad_y: (size - new_h) / 2,
            src_w: w,
            src_h: h,
        }
    }

    fn scaled(w: u32, h: u32, scale: f32, size: u32) -> (u32, u32) {
        let new_w = ((w as f32 * scale).round() as u32).clamp(1, size);
        let new_h = ((h as f32 * scale).round() as u32).clamp(1, size);
        (new_w, new_h)
    }

    /// Maps a box from model-input space back to the source image, clipped to its bounds.
    pub fn unmap(&self, bbox: BBox) -> BBox {
        let max_x = self.src_w as f32;
        let max_y = self.src_h as f32;
        let x1 = ((bbox[0] - self.pad_x as f32) / self.scale).clamp(0.0, max_x);
        let y1 = ((bbox[1] - self.pad_y as f32) / self.scale).clamp(0.0, max_y);
        let x2 = ((bbox[2] - self.pad_x as f32) / self.scale).clamp(0.0, max_x);
        let y2 = ((bbox[3] - self.pad_y as f32) / self.scale).clamp(0.0, max_y);
        [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]
    }
}

/// Resizes `rgb` into a `size`x`size` canvas keeping the aspect ratio, padding with gray.
pub fn letterbox(rgb: &RgbImage, size: u32) -> (RgbImage, Letterbox) {
    let lb = Letterbox::new(rgb.width(), rgb.height(), size);
    let (new_w, new_h) = Letterbox::scaled(lb.src_w, lb.src_h, lb.scale, size);

    let resized = image::imageops::resize(rgb, new_w, new_h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(&mut canvas, &resized, lb.pad_x as i64, lb.pad_y as i64);
    (canvas, lb)
}

/// Turns a `[4 + nc, N]` prediction matrix (cx, cy, w, h, class scores) into candidates.
///
/// Rows are attributes and columns are candidates, whatever the relative sizes of
/// `nc` and `N`. Each candidate keeps its best class, and only if that score is
/// strictly above `params.conf_threshold`.
pub fn decode_output(view: ArrayView2<f32>, lb: &Letterbox, params: &YoloParams) -> Result<Vec<RawDetection>> {
    if view.shape()[0] < 5 {
        bail!("unexpected YOLO output shape {:?}", view.shape());
    }

    let num_candidates = view.shape()[1];
    let mut detections = Vec::new();

    for i in 0..num_candidates {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > params.conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];

            detections.push(RawDetection {
                bbox: lb.unmap([cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]),
                class_id,
                score: max_score.clamp(0.0, 1.0),
            });
        }
    }

    Ok(detections)
}

/// Class-aware greedy NMS. Output is sorted by descending score and capped at `max_detections`.
pub fn nms(mut detections: Vec<RawDetection>, iou_threshold: f32, max_detections: usize) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut suppressed = vec![false; detections.len()];
    let mut keep = Vec::with_capacity(detections.len().min(max_detections));

    for i in 0..detections.len() {
        if keep.len() >= max_detections {
            break;
        }
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for j in (i + 1)..detections.len() {
            if !suppressed[j]
                && detections[j].class_id == detections[i].class_id
                && detections[i].iou(&detections[j]) > iou_threshold
            {
                suppressed[j] = true;
            }
        }
    }

    keep.into_iter().map(|i| detections[i].clone()).collect()
}
