// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker ingestion routes (OsmAnd/Traccar client protocol).
//!
//! Unauthenticated: trackers only know their own ID. Reports for unknown
//! trackers are acknowledged and dropped.

use crate::error::IngestError;
use crate::models::PositionReport;
use crate::services::UpsertOutcome;
use crate::AppState;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Form, FromRequest, Query, Request, State},
    http::{header, request::Parts, HeaderValue, Method, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Position reports are a handful of short fields.
const MAX_REPORT_BYTES: usize = 64 * 1024;

/// Ingestion routes.
///
/// OsmAnd clients post to the server root; `/api/osmand` is the same
/// endpoint behind the dashboard's API prefix.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(receive_report).post(receive_report))
        .route("/api/osmand", get(receive_report).post(receive_report))
}

/// A position report assembled from the query string and, for POST, the body.
///
/// Body fields override query fields. A body with no content type is read
/// as a form, which is what most tracker firmware sends. An empty or
/// unparseable body counts as absent; whether the result is a usable
/// report is decided by the normalizer, not here.
pub struct ReportPayload(pub PositionReport);

impl<S> FromRequest<S> for ReportPayload
where
    S: Send + Sync,
{
    type Rejection = IngestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = query_report(req.uri());

        if req.method() == Method::GET {
            return Ok(Self(query));
        }

        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("application/json"));

        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_REPORT_BYTES)
            .await
            .map_err(|_| IngestError::UnreadableBody)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(query));
        }

        let body = if is_json {
            Json::<Option<PositionReport>>::from_bytes(&bytes)
                .map(|Json(report)| report.unwrap_or_default())
                .map_err(|e| e.body_text())
        } else {
            form_report(parts, bytes, state).await
        };

        match body {
            Ok(body) => Ok(Self(query.merged_with(body))),
            Err(reason) => {
                tracing::debug!(reason = %reason, "Ignoring unreadable report body");
                Ok(Self(query))
            }
        }
    }
}

fn query_report(uri: &Uri) -> PositionReport {
    if uri.query().is_none() {
        return PositionReport::default();
    }
    match Query::<PositionReport>::try_from_uri(uri) {
        Ok(Query(report)) => report,
        Err(e) => {
            tracing::debug!(error = %e.body_text(), "Ignoring unreadable query string");
            PositionReport::default()
        }
    }
}

/// Decode a non-JSON body as a form, whatever content type it was sent with.
async fn form_report<S>(
    mut parts: Parts,
    bytes: Bytes,
    state: &S,
) -> Result<PositionReport, String>
where
    S: Send + Sync,
{
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    Form::<PositionReport>::from_request(Request::from_parts(parts, Body::from(bytes)), state)
        .await
        .map(|Form(report)| report)
        .map_err(|e| e.body_text())
}

/// Accept one position report and acknowledge it in plaintext.
async fn receive_report(
    State(state): State<Arc<AppState>>,
    ReportPayload(report): ReportPayload,
) -> Result<impl IntoResponse, IngestError> {
    match state.ingest_service.ingest(&report).await? {
        UpsertOutcome::Updated(_) => Ok("OK"),
        UpsertOutcome::UnmatchedDevice => Ok("ignored"),
    }
}
