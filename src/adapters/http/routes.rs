use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::{HealthResponse, PredictResponse};

pub async fn root(State(st): State<HttpState>) -> Json<HealthResponse> {
    Json(st.detection.health())
}

/// `POST /predict`: multipart `file` (required) and `conf` (optional float).
pub async fn predict(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut file: Option<Vec<u8>> = None;
    let mut conf: Option<f32> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => file = Some(field.bytes().await?.to_vec()),
            Some("conf") => conf = parse_conf(&field.text().await?)?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::Validation("field required: file".into()))?;
    let resp = st.detection.predict(file, conf).await?;
    Ok(Json(resp))
}

/// Blank means "use the default"; anything else must be a finite float.
fn parse_conf(raw: &str) -> Result<Option<f32>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ApiError::Validation(format!("conf must be a float, got {raw:?}"))),
    }
}
