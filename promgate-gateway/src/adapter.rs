//! Push adapters: routing token check, body translation and handoff.
//!
//! Both adapters share one flow. The routing token is checked before the
//! body is read, the body is parsed and rendered with the token appended as
//! the last label, and only a fully translated push reaches the downstream.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use promgate_common::{TranslateError, parse_flat, parse_structured, render, render_all};
use thiserror::Error;
use tracing::{debug, error};

use crate::downstream::{ForwardError, ForwardRequest, RoutingParams};
use crate::state::GatewayState;

/// Routing token of structured pushes, also the injected label key.
pub const JOB_PARAM: &str = "job";

/// Routing token of flat pushes, also the injected label key.
pub const IDENTIFY_PARAM: &str = "identify";

/// Errors terminating a push before or during handoff.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0} is required")]
    MissingRoutingToken(&'static str),

    #[error("{0}")]
    BodyRead(String),

    #[error("bad request: {0}")]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl AdapterError {
    /// HTTP status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::MissingRoutingToken(_) | AdapterError::Translate(_) => {
                StatusCode::BAD_REQUEST
            }
            AdapterError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdapterError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AdapterError::MissingRoutingToken(_) => {
                debug!(error = %self, "Rejecting push");
                format!("{}\n", self)
            }
            AdapterError::BodyRead(e) => {
                error!(error = %e, "Failed to read push body");
                format!("{}\n", e)
            }
            AdapterError::Translate(e) => {
                error!(error = %e, "bad request");
                "bad request\n".to_string()
            }
            AdapterError::Forward(e) => {
                error!(error = %e, "Failed to forward push");
                "bad gateway\n".to_string()
            }
        };

        (status, body).into_response()
    }
}

/// The two inbound push shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// `{metrics, labels}` bodies, routed by job name.
    Structured,
    /// Flat key/value bodies, routed by device identifier.
    Flat,
}

impl PushKind {
    /// Name of the routing token and of the label built from it.
    pub fn token_name(self) -> &'static str {
        match self {
            PushKind::Structured => JOB_PARAM,
            PushKind::Flat => IDENTIFY_PARAM,
        }
    }

    /// Translate a body of this shape to exposition text.
    pub fn translate(self, token: &str, body: &[u8]) -> Result<String, AdapterError> {
        match self {
            PushKind::Structured => translate_structured(token, body),
            PushKind::Flat => translate_flat(token, body),
        }
    }
}

/// Return the token, or fail when it is missing or empty.
pub fn require_token<'a>(
    name: &'static str,
    token: Option<&'a str>,
) -> Result<&'a str, AdapterError> {
    match token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AdapterError::MissingRoutingToken(name)),
    }
}

/// Translate a structured push body, labelling every metric with `job`.
pub fn translate_structured(job: &str, body: &[u8]) -> Result<String, AdapterError> {
    let job = require_token(JOB_PARAM, Some(job))?;
    let mut request = parse_structured(body)?;
    request.push_label(JOB_PARAM, job);
    Ok(render(&request))
}

/// Translate a flat push body, labelling every metric with `identify`.
pub fn translate_flat(identify: &str, body: &[u8]) -> Result<String, AdapterError> {
    let identify = require_token(IDENTIFY_PARAM, Some(identify))?;
    let mut requests = parse_flat(body)?;
    for request in &mut requests {
        request.push_label(IDENTIFY_PARAM, identify);
    }
    Ok(render_all(&requests))
}

/// Handler for structured pushes.
pub async fn structured_push(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    token: Option<Path<String>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let token = token.map(|Path(token)| token);
    handle_push(state, PushKind::Structured, token, method, uri, headers, body).await
}

/// Handler for flat pushes.
pub async fn flat_push(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    token: Option<Path<String>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let token = token.map(|Path(token)| token);
    handle_push(state, PushKind::Flat, token, method, uri, headers, body).await
}

async fn handle_push(
    state: GatewayState,
    kind: PushKind,
    token: Option<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    state.record_received();
    let outcome = push(&state, kind, token, method, uri, headers, body).await;
    state.record_outcome(&outcome);
    outcome.unwrap_or_else(IntoResponse::into_response)
}

async fn push(
    state: &GatewayState,
    kind: PushKind,
    token: Option<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, AdapterError> {
    let token = require_token(kind.token_name(), token.as_deref())?.to_string();

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| AdapterError::BodyRead(e.to_string()))?;

    let text = kind.translate(&token, &body)?;

    let path = match kind {
        PushKind::Structured => uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        PushKind::Flat => state.flat_target.clone(),
    };

    debug!(
        kind = ?kind,
        token = %token,
        path = %path,
        bytes = text.len(),
        "Translated push"
    );

    let request = ForwardRequest {
        method,
        path,
        headers,
        params: RoutingParams::new().with(kind.token_name(), token),
        body: text,
    };

    Ok(state.downstream.forward(request).await?)
}
