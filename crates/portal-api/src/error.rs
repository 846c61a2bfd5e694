//! API error type, the success envelope, and their
//! [`axum::response::IntoResponse`] implementations.
//!
//! Every action answers with `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use portal_core::store::DomainError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] portal_core::Error),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Recover a domain refusal from a backend error, or keep it opaque.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    match e.domain() {
      Some(domain) => ApiError::Domain(domain.clone()),
      None => ApiError::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    use portal_core::Error as E;
    match self {
      ApiError::Domain(E::Validation { .. }) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Domain(E::Unauthorized) => StatusCode::UNAUTHORIZED,
      ApiError::Domain(E::TenantNotFound(_) | E::RecordNotFound) => StatusCode::NOT_FOUND,
      ApiError::Domain(E::AlreadyVerified(_) | E::InvalidTransition { .. } | E::Conflict(_)) => {
        StatusCode::CONFLICT
      }
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn public_message(&self) -> String {
    use portal_core::Error as E;
    match self {
      ApiError::Domain(E::TenantNotFound(_)) => "Tenant not found".to_owned(),
      ApiError::Domain(E::RecordNotFound) => "Record not found".to_owned(),
      ApiError::Domain(E::Unauthorized) => "Unauthorized".to_owned(),
      ApiError::Domain(E::AlreadyVerified(_)) => "Payment already verified".to_owned(),
      ApiError::Domain(e) => e.to_string(),
      ApiError::BadRequest(m) => m.clone(),
      ApiError::Store(_) => "Something went wrong".to_owned(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    if let ApiError::Store(e) = &self {
      tracing::error!(error = %e, "store failure");
    }
    let body = json!({ "success": false, "error": self.public_message() });
    (self.status(), Json(body)).into_response()
  }
}

// ─── Success envelope ────────────────────────────────────────────────────────

/// `{"success": true, "data": T}` with a chosen status.
pub struct Success<T> {
  status: StatusCode,
  data:   T,
}

impl<T> Success<T> {
  pub fn ok(data: T) -> Self { Self { status: StatusCode::OK, data } }

  pub fn created(data: T) -> Self { Self { status: StatusCode::CREATED, data } }
}

impl<T: Serialize> IntoResponse for Success<T> {
  fn into_response(self) -> Response {
    let body = json!({ "success": true, "data": self.data });
    (self.status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use axum::body::to_bytes;
  use portal_core::Error as CoreError;
  use uuid::Uuid;

  use super::*;

  async fn render(e: ApiError) -> (StatusCode, serde_json::Value) {
    let resp = e.into_response();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn domain_errors_map_to_statuses() {
    let cases = [
      (CoreError::validation("email", "bad"), StatusCode::BAD_REQUEST),
      (CoreError::Unauthorized, StatusCode::UNAUTHORIZED),
      (CoreError::RecordNotFound, StatusCode::NOT_FOUND),
      (CoreError::TenantNotFound("x".into()), StatusCode::NOT_FOUND),
      (CoreError::AlreadyVerified(Uuid::nil()), StatusCode::CONFLICT),
      (CoreError::transition("verified", "rejected"), StatusCode::CONFLICT),
    ];
    for (err, status) in cases {
      let (got, body) = render(ApiError::from(err)).await;
      assert_eq!(got, status);
      assert_eq!(body["success"], false);
    }
  }

  #[tokio::test]
  async fn tenant_not_found_message() {
    let (_, body) = render(CoreError::TenantNotFound("nowhere".into()).into()).await;
    assert_eq!(body["error"], "Tenant not found");
  }

  #[tokio::test]
  async fn store_failures_hide_details() {
    let raw = std::io::Error::other("disk on fire");
    let (status, body) = render(ApiError::Store(Box::new(raw))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Something went wrong");
  }
}
