//! Axum route handlers for document generation and history.
//!
//! Generation flow: validate input → build prompt → call the Generation
//! Client with the request's correlation id → persist the document → audit
//! → 201. Validation failures never reach the network; generation failures
//! are audited with their classification before surfacing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit;
use crate::auth::AuthUser;
use crate::correlation::RequestId;
use crate::documents::{DOC_TYPE_EMAIL, DOC_TYPE_REPORT};
use crate::errors::AppError;
use crate::genai::GenerationResult;
use crate::models::document::{DocumentRow, DocumentSummary};
use crate::prompt::{build_email_prompt, build_report_prompt, ReportStructure, Tone};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    pub context: String,
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    pub topic: String,
    pub key_points: Option<String>,
    pub tone: Option<String>,
    pub structure: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateDocumentResponse {
    pub message: String,
    pub document: DocumentRow,
    pub request_id: String,
    pub latency_ms: u64,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub doc_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    pub document: DocumentRow,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/documents/email/generate
pub async fn handle_generate_email(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestId(request_id): RequestId,
    Json(request): Json<GenerateEmailRequest>,
) -> Result<(StatusCode, Json<GenerateDocumentResponse>), AppError> {
    let tone = Tone::parse(request.tone.as_deref())?;
    let prompt = build_email_prompt(
        &request.context,
        request.recipient.as_deref(),
        request.subject.as_deref(),
        Some(tone.as_str()),
    )?;

    let result = generate_or_audit(&state, auth.user_id, &request_id, &prompt, "generate_email")
        .await?;

    let document: DocumentRow = sqlx::query_as(
        "INSERT INTO documents (user_id, doc_type, title, prompt_input, content, tone, structure) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, doc_type, title, prompt_input, content, tone, structure, created_at",
    )
    .bind(auth.user_id)
    .bind(DOC_TYPE_EMAIL)
    .bind(request.subject.as_deref().map(str::trim))
    .bind(request.context.trim())
    .bind(&result.content)
    .bind(tone.as_str())
    .bind(Option::<&str>::None)
    .fetch_one(&state.db)
    .await?;

    audit::record(
        &state.db,
        audit::Entry::new(Some(auth.user_id), "generate_email")
            .entity("document", Some(document.id))
            .request_id(&request_id)
            .details(format!("Generated email with tone: {}", tone.as_str())),
    )
    .await;

    info!(
        correlation_id = %request_id,
        document_id = document.id,
        "email generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateDocumentResponse {
            message: "Email generated successfully".to_string(),
            document,
            request_id,
            latency_ms: result.latency_ms,
            model: result.model,
        }),
    ))
}

/// POST /api/documents/report/generate
pub async fn handle_generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestId(request_id): RequestId,
    Json(request): Json<GenerateReportRequest>,
) -> Result<(StatusCode, Json<GenerateDocumentResponse>), AppError> {
    let tone = Tone::parse(request.tone.as_deref())?;
    let structure = ReportStructure::parse(request.structure.as_deref())?;
    let prompt = build_report_prompt(
        &request.topic,
        request.key_points.as_deref(),
        Some(tone.as_str()),
        Some(structure.as_str()),
    )?;

    let result = generate_or_audit(&state, auth.user_id, &request_id, &prompt, "generate_report")
        .await?;

    let document: DocumentRow = sqlx::query_as(
        "INSERT INTO documents (user_id, doc_type, title, prompt_input, content, tone, structure) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, doc_type, title, prompt_input, content, tone, structure, created_at",
    )
    .bind(auth.user_id)
    .bind(DOC_TYPE_REPORT)
    .bind(request.topic.trim())
    .bind(request.key_points.as_deref().map(str::trim))
    .bind(&result.content)
    .bind(tone.as_str())
    .bind(structure.as_str())
    .fetch_one(&state.db)
    .await?;

    audit::record(
        &state.db,
        audit::Entry::new(Some(auth.user_id), "generate_report")
            .entity("document", Some(document.id))
            .request_id(&request_id)
            .details(format!(
                "Generated report with tone: {}, structure: {}",
                tone.as_str(),
                structure.as_str()
            )),
    )
    .await;

    info!(
        correlation_id = %request_id,
        document_id = document.id,
        "report generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(GenerateDocumentResponse {
            message: "Report generated successfully".to_string(),
            document,
            request_id,
            latency_ms: result.latency_ms,
            model: result.model,
        }),
    ))
}

/// Runs the generation call and audits the failure classification before
/// propagating it.
async fn generate_or_audit(
    state: &AppState,
    user_id: i64,
    request_id: &str,
    prompt: &str,
    action: &str,
) -> Result<GenerationResult, AppError> {
    match state
        .genai
        .generate(prompt, None, Some(request_id.to_string()))
        .await
    {
        Ok(result) => Ok(result),
        Err(err) => {
            audit::record(
                &state.db,
                audit::Entry::new(Some(user_id), format!("{action}_failed"))
                    .entity("document", None)
                    .request_id(request_id)
                    .details(format!("Generation failed: {}", err.kind().as_str())),
            )
            .await;
            Err(err.into())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// History handlers
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 100;

/// GET /api/history
///
/// Documents are always scoped to the authenticated user; there is no way
/// to read another user's history through this endpoint.
pub async fn handle_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0);

    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        )));
    }
    if offset < 0 {
        return Err(AppError::Validation(
            "offset must be non-negative".to_string(),
        ));
    }

    let doc_type = match query.doc_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(t) => {
            let t = t.to_lowercase();
            if t != DOC_TYPE_EMAIL && t != DOC_TYPE_REPORT {
                return Err(AppError::Validation(
                    "doc_type must be either \"email\" or \"report\"".to_string(),
                ));
            }
            Some(t)
        }
    };

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM documents \
         WHERE user_id = $1 AND ($2::text IS NULL OR doc_type = $2)",
    )
    .bind(auth.user_id)
    .bind(doc_type.as_deref())
    .fetch_one(&state.db)
    .await?;

    let rows: Vec<DocumentRow> = sqlx::query_as(
        "SELECT id, user_id, doc_type, title, prompt_input, content, tone, structure, created_at \
         FROM documents \
         WHERE user_id = $1 AND ($2::text IS NULL OR doc_type = $2) \
         ORDER BY created_at DESC \
         LIMIT $3 OFFSET $4",
    )
    .bind(auth.user_id)
    .bind(doc_type.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let documents = rows.iter().map(DocumentSummary::from).collect();

    Ok(Json(HistoryResponse {
        documents,
        total: total.0,
        limit,
        offset,
        has_more: offset + limit < total.0,
    }))
}

/// GET /api/history/:id
pub async fn handle_document_detail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<i64>,
) -> Result<Json<DocumentDetailResponse>, AppError> {
    let document: DocumentRow = sqlx::query_as(
        "SELECT id, user_id, doc_type, title, prompt_input, content, tone, structure, created_at \
         FROM documents WHERE id = $1 AND user_id = $2",
    )
    .bind(document_id)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentDetailResponse { document }))
}
