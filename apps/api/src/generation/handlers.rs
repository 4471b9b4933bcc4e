//! Axum route handlers for the Generation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::ats::{AtsRequest, AtsScore};
use crate::generation::diagram::{Diagram, DiagramRequest};
use crate::generation::letter::{Letter, LetterRequest};
use crate::generation::presentation::{
    OutlineRequest, Presentation, PresentationOutline, PresentationRequest,
};
use crate::generation::resume::{Resume, ResumeRequest};
use crate::generation::structured::{generate_structured, StructuredDocument};
use crate::models::document::NewDocument;
use crate::state::AppState;

/// Upload size limit for the ATS resume file.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Generator input plus the optional owner of the stored document.
#[derive(Debug, Deserialize)]
pub struct GenerateBody<R> {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub request: R,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub document_id: Uuid,
    pub kind: String,
    pub model: String,
    pub document: Value,
    pub defaulted_fields: Vec<String>,
}

/// Rejects requests whose required text inputs are blank before any model call.
trait RequiredInputs {
    fn check(&self) -> Result<(), AppError>;
}

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl RequiredInputs for ResumeRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require(&self.email, "email")?;
        require(&self.prompt, "prompt")
    }
}

impl RequiredInputs for LetterRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.from_name, "from_name")?;
        require(&self.prompt, "prompt")
    }
}

impl RequiredInputs for OutlineRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.prompt, "prompt")
    }
}

impl RequiredInputs for PresentationRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.prompt, "prompt")?;
        if self.outline.is_empty() {
            return Err(AppError::Validation("outline cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl RequiredInputs for AtsRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.resume_text, "resume_text")?;
        require(&self.job_description, "job_description")
    }
}

impl RequiredInputs for DiagramRequest {
    fn check(&self) -> Result<(), AppError> {
        require(&self.prompt, "prompt")
    }
}

/// Validates, generates, stores, and shapes the response for any document type.
async fn run_generation<D>(
    state: &AppState,
    body: GenerateBody<D::Request>,
) -> Result<Json<GenerateResponse>, AppError>
where
    D: StructuredDocument,
    D::Request: RequiredInputs,
{
    body.request.check()?;

    let normalized = generate_structured::<D>(state.llm.as_ref(), &body.request).await?;
    if !normalized.is_fully_generated() {
        debug!("{} defaults: {:?}", D::KIND.as_str(), normalized.defaulted_fields);
    }
    let title = normalized.document.title();
    let content = serde_json::to_value(&normalized.document)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize document: {e}")))?;

    let row = state
        .store
        .save(NewDocument {
            user_id: body.user_id,
            kind: D::KIND.as_str().to_string(),
            title,
            content,
            defaulted_fields: normalized.defaulted_fields,
            model: state.llm.model().to_string(),
        })
        .await?;

    info!(
        "Stored {} {} ({} defaulted field(s))",
        row.kind,
        row.id,
        row.defaulted_fields.len()
    );

    Ok(Json(GenerateResponse {
        document_id: row.id,
        kind: row.kind,
        model: row.model,
        document: row.content,
        defaulted_fields: row.defaulted_fields,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate/resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<ResumeRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<Resume>(&state, body).await
}

/// POST /api/v1/generate/letter
pub async fn handle_generate_letter(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<LetterRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<Letter>(&state, body).await
}

/// POST /api/v1/generate/presentation/outline
///
/// First phase of presentation generation: a cheap structural draft the client can edit.
pub async fn handle_generate_outline(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<OutlineRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<PresentationOutline>(&state, body).await
}

/// POST /api/v1/generate/presentation
///
/// Second phase: expands an (optionally edited) outline into full slides.
pub async fn handle_generate_presentation(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<PresentationRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<Presentation>(&state, body).await
}

/// POST /api/v1/generate/ats-score
pub async fn handle_generate_ats_score(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<AtsRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<AtsScore>(&state, body).await
}

/// POST /api/v1/generate/ats-score/upload
///
/// Multipart form: `resume` (PDF or plain text file), `job_description`, optional `user_id`.
pub async fn handle_upload_ats_score(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let mut resume_text: Option<String> = None;
    let mut job_description: Option<String> = None;
    let mut user_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let is_pdf = field.content_type() == Some("application/pdf")
                    || field
                        .file_name()
                        .is_some_and(|f| f.to_ascii_lowercase().ends_with(".pdf"));
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read resume: {e}")))?;
                resume_text = Some(resume_file_text(bytes.to_vec(), is_pdf).await?);
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("could not read job_description: {e}"))
                })?);
            }
            "user_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read user_id: {e}")))?;
                user_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?,
                );
            }
            _ => {}
        }
    }

    let request = AtsRequest {
        resume_text: resume_text
            .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?,
        job_description: job_description
            .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?,
    };

    run_generation::<AtsScore>(&state, GenerateBody { user_id, request }).await
}

/// PDF files go through `pdf-extract` off the async executor; anything else is read as UTF-8.
async fn resume_file_text(bytes: Vec<u8>, is_pdf: bool) -> Result<String, AppError> {
    if !is_pdf && !bytes.starts_with(b"%PDF") {
        return String::from_utf8(bytes)
            .map_err(|_| AppError::Validation("resume must be a PDF or UTF-8 text".to_string()));
    }

    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pdf extraction: {e}")))?
        .map_err(|e| AppError::Validation(format!("could not read PDF: {e}")))
}

/// POST /api/v1/generate/diagram
pub async fn handle_generate_diagram(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody<DiagramRequest>>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation::<Diagram>(&state, body).await
}
