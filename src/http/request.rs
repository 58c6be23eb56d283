//! Request handling.
//!
//! # Responsibilities
//! - Generate a UUID request ID when the client sent none
//! - Extract `item` from query string, urlencoded form, or JSON body
//!
//! # Design Decisions
//! - `item` is optional at the type level so a missing field maps to our
//!   own 400 body instead of the extractor's plain-text rejection
//! - Bodies dispatch on Content-Type; the query string fills in a missing `item`
//! - Extractor rejections keep their status (413 for oversized bodies)

use axum::{
    extract::{FromRequest, Query, Request},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ApiError;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Read the request ID set by the middleware stack.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Input of `/categorize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemParams {
    pub item: Option<String>,
}

impl ItemParams {
    /// The item, or a 400 if the client did not send one.
    pub fn into_item(self) -> Result<String, ApiError> {
        self.item
            .ok_or_else(|| ApiError::bad_request("missing required parameter `item`"))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

impl<S> FromRequest<S> for ItemParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // The query string backs up the body, as with a classic form handler.
        let query = Query::<ItemParams>::try_from_uri(req.uri())
            .map(|Query(params)| params)
            .unwrap_or_default();

        if !req.headers().contains_key(CONTENT_TYPE) {
            return Ok(query);
        }

        let mut params = if is_json(req.headers()) {
            let Json(params) = Json::<ItemParams>::from_request(req, state)
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            params
        } else {
            let Form(params) = Form::<ItemParams>::from_request(req, state)
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            params
        };

        if params.item.is_none() {
            params.item = query.item;
        }
        Ok(params)
    }
}
