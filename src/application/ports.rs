use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{
    detection::RawDetection,
    errors::DomainResult,
    model::{ClassNames, Device, ModelId, YoloParams},
};

/// Object detector backing the predict use case.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    /// Compute device picked when the model was loaded.
    fn device(&self) -> Device;

    /// Class names embedded in the model artifact (may be empty).
    fn class_names(&self) -> &ClassNames;

    /// Runs one inference. Boxes are in `image` pixel coordinates, sorted by descending score.
    async fn detect(&self, image: RgbImage, params: YoloParams) -> DomainResult<Vec<RawDetection>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
