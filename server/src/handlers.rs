//! HTTP handlers

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use quotation::{output_file_name, QuotationRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MIME type of .docx files
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub download_url: String,
}

/// POST /generate-quotation
pub async fn generate_quotation(
    State(state): State<AppState>,
    Json(request): Json<QuotationRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    tracing::info!("Quotation requested for '{}'", request.company_name);

    let template_path = &state.settings.template;
    let template = tokio::fs::read(template_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::TemplateNotFound(template_path.display().to_string())
        } else {
            AppError::Io(e)
        }
    })?;

    // One timestamp for the file name and the date controls
    let now = Local::now().naive_local();
    let filename = output_file_name(&request, now);

    let generator = state.generator.clone();
    let generated =
        tokio::task::spawn_blocking(move || generator.generate_at(&template, &request, now))
        .await
        .map_err(|e| AppError::Internal(format!("generation task failed: {}", e)))??;

    let output_dir = &state.settings.output_dir;
    tokio::fs::create_dir_all(output_dir).await?;
    tokio::fs::write(output_dir.join(&filename), &generated.bytes).await?;

    tracing::info!(
        "Wrote {} ({} controls, {} rows)",
        filename,
        generated.report.total_filled(),
        generated.report.total_rows()
    );

    Ok(Json(GenerateResponse {
        success: true,
        message: "Quotation generated successfully".to_string(),
        download_url: format!("/download/{}", filename),
        filename,
    }))
}

/// GET /download/:filename
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_file_name(&filename) {
        tracing::warn!("Rejected download of '{}'", filename);
        return Err(AppError::NotFound(filename));
    }

    let path = state.settings.output_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(filename));
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A bare `.docx` file name without path components
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '"'])
        && !name.contains("..")
        && name.ends_with(".docx")
}
