//! API handlers for the review server
//!
//! Provides REST endpoints for:
//! - Document analysis and risk scoring
//! - Document comparison
//! - Precedent search
//! - Template listing and filling
//! - The document assistant

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use precedent_search::{PrecedentMatch, DEFAULT_TOP_K};
use review_engine::templates::{fill_template, list_templates, TemplateInfo};
use serde::{Deserialize, Serialize};
use shared_pdf::extract_document;
use shared_types::{hash_document, AnalysisReport, AuditAction, DiffLine, Document, RiskFinding};
use tokio::task;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "review-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn default_user() -> String {
    "anonymous".to_string()
}

fn default_filename() -> String {
    "document.txt".to_string()
}

/// A document given either as inline text or as a base64 upload
#[derive(Deserialize, Debug)]
pub struct DocumentInput {
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Plain text content
    pub text: Option<String>,

    /// Raw file bytes (PDF or text), base64-encoded
    pub content_base64: Option<String>,
}

impl DocumentInput {
    /// Resolve to a document and the SHA-256 of its raw bytes
    ///
    /// Uploads are decoded and extracted on the blocking pool.
    async fn into_document(self) -> Result<(Document, String), ServerError> {
        match (self.text, self.content_base64) {
            (Some(text), None) => {
                let hash = hash_document(text.as_bytes());
                Ok((Document::new(self.filename, text), hash))
            }
            (None, Some(encoded)) => {
                let filename = self.filename;
                task::spawn_blocking(move || decode_upload(&filename, &encoded)).await?
            }
            (Some(_), Some(_)) => Err(ServerError::InvalidRequest(
                "Provide either text or content_base64, not both".to_string(),
            )),
            (None, None) => Err(ServerError::InvalidRequest(
                "Document requires text or content_base64".to_string(),
            )),
        }
    }
}

fn decode_upload(filename: &str, encoded: &str) -> Result<(Document, String), ServerError> {
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
        ServerError::InvalidRequest(format!("content_base64 is not valid base64: {}", e))
    })?;
    let document = extract_document(filename, &bytes)?;
    Ok((document, hash_document(&bytes)))
}

/// Analyze request body
#[derive(Deserialize, Debug)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub document: DocumentInput,

    #[serde(default = "default_user")]
    pub user: String,
}

/// Analyze response
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    info!(
        "Analyze request: filename={}, user={}",
        req.document.filename, req.user
    );

    let (document, hash) = req.document.into_document().await?;
    state
        .audit
        .record(
            AuditAction::Upload {
                filename: document.filename.clone(),
            },
            &req.user,
            Some(hash.clone()),
            None,
        )
        .await;

    let engine = Arc::clone(&state.engine);
    let (document, report) = task::spawn_blocking(move || {
        let report = engine.analyze(&document);
        (document, report)
    })
    .await?;

    let action = if report.triggered_terms.is_empty() {
        AuditAction::NoRisks
    } else {
        AuditAction::RiskScan {
            terms: report.triggered_terms.clone(),
        }
    };
    state
        .audit
        .record(action, &req.user, Some(hash), Some(document.filename))
        .await;

    Ok(Json(AnalyzeResponse {
        success: true,
        report,
    }))
}

/// Risk scoring request for pre-segmented clauses
#[derive(Deserialize, Debug)]
pub struct RiskRequest {
    pub clauses: Vec<String>,
}

/// Risk scoring response
#[derive(Serialize)]
pub struct RiskResponse {
    pub success: bool,
    pub findings: Vec<RiskFinding>,
    pub finding_count: usize,
}

/// Handler: POST /api/risks
pub async fn handle_score_risks(
    State(state): State<AppState>,
    Json(req): Json<RiskRequest>,
) -> Result<Json<RiskResponse>, ServerError> {
    debug!("Scoring {} clauses", req.clauses.len());

    let findings = state.engine.scorer().score_texts(&req.clauses)?;
    let finding_count = findings.len();

    Ok(Json(RiskResponse {
        success: true,
        findings,
        finding_count,
    }))
}

/// Compare request body
#[derive(Deserialize, Debug)]
pub struct CompareRequest {
    pub original: DocumentInput,
    pub modified: DocumentInput,

    #[serde(default = "default_user")]
    pub user: String,
}

/// Compare response
#[derive(Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub identical: bool,
    pub unified: String,
    pub lines: Vec<DiffLine>,
}

/// Handler: POST /api/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, ServerError> {
    let (original, _) = req.original.into_document().await?;
    let (modified, modified_hash) = req.modified.into_document().await?;

    let engine = Arc::clone(&state.engine);
    let (original, modified, comparison) = task::spawn_blocking(move || {
        let comparison = engine.compare(&original, &modified);
        (original, modified, comparison)
    })
    .await?;

    state
        .audit
        .record(
            AuditAction::Compare {
                changed: !comparison.identical,
            },
            &req.user,
            Some(modified_hash),
            Some(format!("{} -> {}", original.filename, modified.filename)),
        )
        .await;

    Ok(Json(CompareResponse {
        success: true,
        identical: comparison.identical,
        unified: comparison.unified,
        lines: comparison.lines,
    }))
}

/// Precedent search request
#[derive(Deserialize, Debug)]
pub struct PrecedentSearchRequest {
    pub query: String,

    #[serde(default = "default_top_k")]
    pub k: usize,

    #[serde(default = "default_user")]
    pub user: String,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Precedent search response
#[derive(Serialize)]
pub struct PrecedentSearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<PrecedentMatch>,
    pub count: usize,
}

/// Handler: POST /api/precedents/search
pub async fn handle_search_precedents(
    State(state): State<AppState>,
    Json(req): Json<PrecedentSearchRequest>,
) -> Result<Json<PrecedentSearchResponse>, ServerError> {
    let results = state.precedents.search(&req.query, req.k)?;
    let count = results.len();

    state
        .audit
        .record(
            AuditAction::PrecedentSearch { results: count },
            &req.user,
            None,
            Some(req.query.clone()),
        )
        .await;

    Ok(Json(PrecedentSearchResponse {
        success: true,
        query: req.query,
        results,
        count,
    }))
}

/// Template list response
#[derive(Serialize)]
pub struct TemplateListResponse {
    pub success: bool,
    pub templates: Vec<TemplateInfo>,
    pub count: usize,
}

/// Handler: GET /api/templates
pub async fn handle_list_templates() -> Json<TemplateListResponse> {
    let templates = list_templates();
    let count = templates.len();

    Json(TemplateListResponse {
        success: true,
        templates,
        count,
    })
}

/// Template fill request
#[derive(Deserialize, Debug)]
pub struct FillTemplateRequest {
    pub template: String,

    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    #[serde(default = "default_user")]
    pub user: String,
}

/// Template fill response
#[derive(Serialize)]
pub struct FillTemplateResponse {
    pub success: bool,
    pub template: String,
    pub content: String,
}

/// Handler: POST /api/templates/fill
pub async fn handle_fill_template(
    State(state): State<AppState>,
    Json(req): Json<FillTemplateRequest>,
) -> Result<Json<FillTemplateResponse>, ServerError> {
    info!("Fill template: template={}, user={}", req.template, req.user);

    let content = fill_template(&req.template, &req.fields)?;

    state
        .audit
        .record(
            AuditAction::TemplateGenerated {
                template: req.template.clone(),
            },
            &req.user,
            Some(hash_document(content.as_bytes())),
            None,
        )
        .await;

    Ok(Json(FillTemplateResponse {
        success: true,
        template: req.template,
        content,
    }))
}

/// Assistant request
#[derive(Deserialize, Debug)]
pub struct AssistantRequest {
    pub question: String,
    pub text: String,

    #[serde(default = "default_user")]
    pub user: String,
}

/// Assistant response
#[derive(Serialize)]
pub struct AssistantResponse {
    pub success: bool,
    pub answer: String,
}

/// Handler: POST /api/assistant
pub async fn handle_assistant(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ServerError> {
    if req.question.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "Question must not be empty".to_string(),
        ));
    }

    let answer = state.engine.ask(&req.question, &Document::from_text(req.text));

    state
        .audit
        .record(
            AuditAction::AssistantQuery,
            &req.user,
            None,
            Some(req.question),
        )
        .await;

    Ok(Json(AssistantResponse {
        success: true,
        answer,
    }))
}
