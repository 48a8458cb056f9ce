//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

use super::tag::ErrorTag;

/// エラー種別の列挙体
///
/// HTTP ステータスコードに対応するエラー分類を定義します。
/// クライアントに返す機械可読なタグは [`ErrorTag`] が担当し、
/// 種別はステータスコードの決定のみに使います。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.status_code(), 404);
/// assert_eq!(kind.as_str(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - 入力不正、または回復可能なストレージ障害
    BadRequest,
    /// 401 - 資格情報・トークンが無い、不正、または期限切れ
    Unauthorized,
    /// 403 - アクセス権限なし（予約）
    Forbidden,
    /// 404 - リソースが見つからない
    NotFound,
    /// 409 - 一意制約違反
    Conflict,
    /// 422 - エンティティ構築時の検証失敗
    UnprocessableEntity,
    /// 429 - レート制限超過
    TooManyRequests,
    /// 500 - サーバー内部エラー
    InternalServerError,
    /// 503 - 依存サービス（DB・キャッシュ）が利用不可
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::BadRequest.status_code(), 400);
    /// assert_eq!(ErrorKind::UnprocessableEntity.status_code(), 422);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// HTTP ステータスの標準的な理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 種別から導かれる既定のタグ
    ///
    /// `LOCKED_USER` や `EXPIRED` のような業務上のタグは
    /// [`AppError::with_tag`](super::app_error::AppError::with_tag) で上書きします。
    #[inline]
    pub const fn default_tag(&self) -> ErrorTag {
        match self {
            ErrorKind::BadRequest => ErrorTag::BadRequest,
            ErrorKind::Unauthorized => ErrorTag::Unauthorized,
            ErrorKind::Forbidden => ErrorTag::Forbidden,
            ErrorKind::NotFound => ErrorTag::NotFound,
            ErrorKind::Conflict => ErrorTag::Conflict,
            ErrorKind::UnprocessableEntity => ErrorTag::UnprocessableEntity,
            ErrorKind::TooManyRequests => ErrorTag::TooManyRequests,
            ErrorKind::InternalServerError => ErrorTag::InternalServerError,
            ErrorKind::ServiceUnavailable => ErrorTag::ServiceUnavailable,
        }
    }

    /// 5xx 系かどうか（ログに記録すべきエラー）
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::UnprocessableEntity.status_code(), 422);
        assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn test_default_tag_follows_kind() {
        assert_eq!(ErrorKind::NotFound.default_tag(), ErrorTag::NotFound);
        assert_eq!(
            ErrorKind::UnprocessableEntity.default_tag(),
            ErrorTag::UnprocessableEntity
        );
        assert_eq!(
            ErrorKind::InternalServerError.default_tag(),
            ErrorTag::InternalServerError
        );
    }

    #[test]
    fn test_server_errors() {
        assert!(!ErrorKind::BadRequest.is_server_error());
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
        assert!(ErrorKind::InternalServerError.is_server_error());
    }
}
