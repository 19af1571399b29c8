//! Chart generation endpoints.
//!
//! `/generate-image` takes a full descriptor in its `code` field;
//! `/generate-plot` takes a curve family plus parameters. Both come back as
//! a base64 PNG data URL. Field names (and their casing) match the clients
//! this service has always had.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::chart::{self, encode, function, ChartSpec, RenderError};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

pub async fn generate_image(
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::MissingCode)?;
    let code = req.code.ok_or_else(|| {
        error!("no code provided in request data");
        AppError::MissingCode
    })?;

    info!("received plot descriptor ({} bytes)", code.len());
    let png = ChartSpec::parse(&code)
        .and_then(|spec| chart::render(&spec))
        .map_err(log_render_error)?;

    Ok(Json(GenerateImageResponse {
        image_url: encode::data_url(&png),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlotRequest {
    #[serde(default)]
    pub function_type: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePlotResponse {
    pub image_url: String,
}

pub async fn generate_plot(
    payload: Result<Json<GeneratePlotRequest>, JsonRejection>,
) -> Result<Json<GeneratePlotResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::InvalidRequest)?;
    let (Some(function_type), Some(parameters)) = (req.function_type, req.parameters) else {
        error!("invalid request data");
        return Err(AppError::InvalidRequest);
    };

    info!("received request for function type: {function_type}");
    let png = render_function(&function_type, parameters).map_err(log_render_error)?;

    Ok(Json(GeneratePlotResponse {
        image_url: encode::data_url(&png),
    }))
}

fn render_function(function_type: &str, parameters: Value) -> Result<Vec<u8>, RenderError> {
    let kind: function::FunctionKind = function_type.parse()?;
    let params: function::FunctionParams =
        serde_json::from_value(parameters).map_err(|e| RenderError::Parse(e.to_string()))?;
    let spec = function::chart_for(kind, &params)?;
    chart::render(&spec)
}

fn log_render_error(e: RenderError) -> AppError {
    error!("plot generation error: {e}");
    AppError::from(e)
}
