//! Error conversions - From implementations for common error types
//!
//! Lifts errors from the standard library, serde_json, and (behind
//! features) sqlx into [`AppError`], and renders `AppError` as an HTTP
//! response when the `axum` feature is on.

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::Forbidden,
            std::io::ErrorKind::TimedOut => ErrorKind::RequestTimeout,
            _ => ErrorKind::InternalServerError,
        };
        AppError::new(kind, "I/O operation failed").with_source(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        // Syntax/data problems are the caller's input; everything else is ours
        if err.is_syntax() || err.is_data() {
            AppError::bad_request(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let app_err = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted")
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(code) => pg_code_to_error(code),
                None => AppError::internal("Database error"),
            },
            sqlx::Error::Io(_) => AppError::service_unavailable("Database connection error"),
            sqlx::Error::Protocol(_) => AppError::internal("Database protocol error"),
            sqlx::Error::Tls(_) => AppError::internal("Database TLS error"),
            _ => AppError::internal("Database error"),
        };
        app_err.with_source(err)
    }
}

/// PostgreSQL SQLSTATE → AppError
///
/// Codes per <https://www.postgresql.org/docs/current/errcodes-appendix.html>.
#[cfg(feature = "sqlx")]
fn pg_code_to_error(code: &str) -> AppError {
    match code {
        // Class 23 — Integrity Constraint Violation
        "23000" => AppError::conflict("Integrity constraint violation"),
        "23502" => AppError::bad_request("Required field is null"),
        "23503" => AppError::conflict("Foreign key violation"),
        "23505" => AppError::conflict("Duplicate key value"),
        "23514" => AppError::bad_request("Check constraint violation"),
        // Class 42 — Syntax Error or Access Rule Violation
        "42501" => AppError::forbidden("Insufficient privilege"),
        // Class 53 — Insufficient Resources
        "53000" | "53100" | "53200" | "53300" => {
            AppError::service_unavailable("Database resource exhausted")
        }
        // Class 57 — Operator Intervention
        "57000" | "57014" | "57P01" | "57P02" | "57P03" => {
            AppError::service_unavailable("Database unavailable")
        }
        _ => AppError::internal("Database error"),
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 problem details; `source` stays server-side
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
        });

        (status, Json(body)).into_response()
    }
}
