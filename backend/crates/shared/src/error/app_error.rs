//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// 各ドメインのエラーは最終的にこの型へ集約されます。`message` は
/// そのままクライアントへ返せる文字列であること（内部情報を含めない）。
///
/// ## Fields
/// * `kind` - エラー分類（[`ErrorKind`]、HTTP ステータスへ対応）
/// * `message` - クライアント向けメッセージ
/// * `source` - 発生元エラー（ログ・デバッグ用、レスポンスには出さない）
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Forbidden, "Security validation failed");
/// assert_eq!(err.status_code(), 403);
///
/// let io_err = std::io::Error::other("boom");
/// let err = AppError::internal("Failed to read key material").with_source(io_err);
/// ```
pub struct AppError {
    /// エラー分類
    kind: ErrorKind,
    /// クライアント向けメッセージ
    message: Cow<'static, str>,
    /// 発生元エラー
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// `Result<T, AppError>` の別名
///
/// ## Examples
/// ```rust
/// use kernel::error::app_error::{AppError, AppResult};
///
/// fn parse_port(raw: &str) -> AppResult<u16> {
///     raw.parse()
///         .map_err(|_| AppError::bad_request("Invalid port number"))
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 分類とメッセージからエラーを作成
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    // ========================================================================
    // Convenience constructors (1 つにつき ErrorKind 1 分類)
    // ========================================================================

    /// 400 Bad Request
    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 403 Forbidden
    #[inline]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// 404 Not Found
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// 409 Conflict
    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// 429 Too Many Requests
    #[inline]
    pub fn too_many_requests(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    /// 500 Internal Server Error
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// 503 Service Unavailable
    #[inline]
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    // ========================================================================
    // Builder / accessors
    // ========================================================================

    /// 発生元エラーを添付
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// エラー分類
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP ステータスコード
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// クライアント向けメッセージ
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 5xx 系かどうか
    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    /// 4xx 系かどうか
    #[inline]
    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// 任意の `Result` を `AppResult` へ持ち上げる拡張トレイト
pub trait ResultExt<T, E> {
    /// エラーを指定の分類・メッセージで `AppError` に包む（元エラーは source へ）
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::new(kind, message).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_carries_kind_and_message() {
        let err = AppError::new(ErrorKind::Forbidden, "Security validation failed");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Security validation failed");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_convenience_constructors_map_to_status() {
        assert_eq!(AppError::bad_request("x").status_code(), 400);
        assert_eq!(AppError::forbidden("x").status_code(), 403);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::conflict("x").status_code(), 409);
        assert_eq!(AppError::too_many_requests("x").status_code(), 429);
        assert_eq!(AppError::internal("x").status_code(), 500);
        assert_eq!(AppError::service_unavailable("x").status_code(), 503);
    }

    #[test]
    fn test_with_source_is_reachable_via_error_trait() {
        let io_err = std::io::Error::other("disk gone");
        let err = AppError::internal("Failed to persist subscriber").with_source(io_err);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk gone"));
    }

    #[test]
    fn test_display_format() {
        let err = AppError::not_found("Subscriber not found");
        assert_eq!(err.to_string(), "[Not Found] Subscriber not found");
    }

    #[test]
    fn test_result_ext_wraps_and_keeps_source() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::other("nope"));
        let err = result
            .map_app_err(ErrorKind::ServiceUnavailable, "Store unavailable")
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert!(err.source().is_some());
    }
}
