//! Axum route handlers for the Brief API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::brief::catalog::RuleCatalog;
use crate::brief::domain::DesignDomain;
use crate::brief::interpreter::{interpret_brief, BriefInterpretation};
use crate::brief::resolver::Resolution;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// `brief` is taken as raw JSON so a non-string value is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub brief: Value,
}

#[derive(Debug, Deserialize)]
pub struct InterpretRequest {
    #[serde(default)]
    pub brief: Value,
    pub domain: Option<String>,
}

fn brief_text(brief: &Value) -> Result<&str, AppError> {
    brief.as_str().ok_or_else(|| {
        let found = match brief {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        AppError::Validation(format!("brief must be a string, found {found}"))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/briefs/resolve
///
/// Runs keyword extraction and parameter derivation only.
pub async fn handle_resolve(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<Resolution>, AppError> {
    let Json(request) = payload?;
    let brief = brief_text(&request.brief)?;
    Ok(Json(state.resolver.resolve(brief)))
}

/// POST /api/v1/briefs/interpret
///
/// Full pipeline: resolve → plan operations → render scripts.
/// `domain` defaults to `facade`.
pub async fn handle_interpret(
    State(state): State<AppState>,
    payload: Result<Json<InterpretRequest>, JsonRejection>,
) -> Result<Json<BriefInterpretation>, AppError> {
    let Json(request) = payload?;
    let brief = brief_text(&request.brief)?;

    let domain = match request.domain.as_deref() {
        Some(raw) => raw
            .parse::<DesignDomain>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
        None => DesignDomain::default(),
    };

    let interpretation = interpret_brief(
        brief,
        domain,
        &state.resolver,
        state.script_generator.as_ref(),
    )?;

    Ok(Json(interpretation))
}

/// GET /api/v1/briefs/catalog
///
/// Returns the active rule catalog so rule precedence can be audited.
pub async fn handle_catalog(State(state): State<AppState>) -> Json<RuleCatalog> {
    Json(state.resolver.catalog().clone())
}
