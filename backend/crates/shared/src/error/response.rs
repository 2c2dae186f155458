//! HTTP rendering of [`AppError`] (feature-gated on `axum`)
//!
//! The body follows RFC 7807 Problem Details and additionally carries a
//! top-level `message`, which is what the web client reads.

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "message": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use crate::error::app_error::AppError;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_body_carries_message() {
        let response = AppError::unauthorized("You have to first sign_in").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "You have to first sign_in");
        assert_eq!(body["status"], 401);
        assert_eq!(body["title"], "Unauthorized");
    }
}
