use crate::error::AppError;
use crate::state::SharedState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Instant;
use trellis_core::{link, resolver, CompletionItem, DocMetadata, IndexStatus};

// POST /resolve
#[derive(Deserialize)]
pub struct ResolveRequest {
    /// Link token as written inside [[...]]; alternatively send `line` +
    /// `offset` and the token is extracted from the span under the cursor
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    /// Absolute path of the requesting document
    pub document: String,
}

impl ResolveRequest {
    fn token(&self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(token.clone());
        }
        match (&self.line, self.offset) {
            (Some(line), Some(offset)) => link::token_at(line, offset).map(str::to_string),
            _ => None,
        }
    }
}

pub async fn resolve(
    State(state): State<SharedState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<DocMetadata>, AppError> {
    let start = Instant::now();
    state.metrics.resolve_count.fetch_add(1, Ordering::Relaxed);

    let token = req
        .token()
        .ok_or_else(|| AppError::bad_request("no token and no [[...]] span at the cursor"))?;

    if let Ok(mut analytics) = state.metrics.analytics.lock() {
        *analytics.top_tokens.entry(token.clone()).or_insert(0) += 1;
    }

    let document = PathBuf::from(req.document);
    let blocking_state = state.clone();

    let metadata = tokio::task::spawn_blocking(move || {
        let mut index = blocking_state
            .index
            .lock()
            .map_err(|err| format!("index mutex poisoned: {err}"))?;
        let current_dir = document.parent().map(|d| d.to_path_buf());
        Ok::<_, String>(resolver::resolve_link(
            &mut index,
            &token,
            current_dir.as_deref(),
        ))
    })
    .await
    .map_err(AppError::internal)?
    .map_err(AppError::internal)?;

    let metadata = metadata.ok_or_else(|| {
        AppError::bad_request("token is empty or document has no parent directory")
    })?;

    let duration_ms = start.elapsed().as_millis() as u64;
    state
        .metrics
        .total_resolve_ms
        .fetch_add(duration_ms, Ordering::Relaxed);
    tracing::info!(duration_ms, exists = metadata.exists, "POST /resolve");

    Ok(Json(metadata))
}

// POST /complete
#[derive(Deserialize)]
pub struct CompleteRequest {
    /// Partial token typed after [[ (may be empty: suggest everything);
    /// alternatively send `line_prefix` (text before the cursor) and the
    /// in-progress token is detected from it
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub line_prefix: Option<String>,
    /// Absolute path of the requesting document
    pub document: String,
}

impl CompleteRequest {
    fn query(&self) -> Option<String> {
        if let Some(query) = &self.query {
            return Some(query.clone());
        }
        self.line_prefix
            .as_deref()
            .and_then(|prefix| link::partial_token(prefix).map(str::to_string))
    }
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub items: Vec<CompletionItem>,
}

pub async fn complete(
    State(state): State<SharedState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let start = Instant::now();
    state.metrics.completion_count.fetch_add(1, Ordering::Relaxed);

    // No in-progress [[ token before the cursor: completion does not fire.
    let Some(query) = req.query() else {
        return Ok(Json(CompleteResponse { items: Vec::new() }));
    };

    if let Ok(mut analytics) = state.metrics.analytics.lock() {
        *analytics.top_queries.entry(query.clone()).or_insert(0) += 1;
    }

    let document = PathBuf::from(req.document);
    let blocking_state = state.clone();

    let items = tokio::task::spawn_blocking(move || {
        let mut index = blocking_state
            .index
            .lock()
            .map_err(|err| format!("index mutex poisoned: {err}"))?;
        Ok::<_, String>(resolver::completions(&mut index, &query, &document))
    })
    .await
    .map_err(AppError::internal)?
    .map_err(AppError::internal)?;

    let duration_ms = start.elapsed().as_millis() as u64;
    state
        .metrics
        .total_completion_ms
        .fetch_add(duration_ms, Ordering::Relaxed);
    tracing::info!(duration_ms, items = items.len(), "POST /complete");

    Ok(Json(CompleteResponse { items }))
}

// GET /status
#[derive(Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub root: String,
    pub index: IndexStatus,
}

pub async fn status(State(state): State<SharedState>) -> Result<Json<ServiceStatus>, AppError> {
    let index = state
        .index
        .lock()
        .map_err(|err| AppError::internal(format!("index mutex poisoned: {err}")))?;

    Ok(Json(ServiceStatus {
        service: "trellis-service".to_string(),
        root: index.root().display().to_string(),
        index: index.status(),
    }))
}
