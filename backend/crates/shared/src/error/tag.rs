//! Error Tag - Machine-readable error identifiers
//!
//! Every user-facing error carries one of these tags next to its message.

use serde::{Deserialize, Serialize};

/// クライアント向けの機械可読エラータグ
///
/// JSON では `SCREAMING_SNAKE_CASE` で出力されます（例: `"LOCKED_USER"`）。
/// `CacheMiss` は内部の制御フロー用シグナルで、レスポンスには出ません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorTag {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    /// 管理者によりロックされたアカウント
    LockedUser,
    /// 未アクティベートのアカウント
    DisabledUser,
    /// エンティティ構築時の検証失敗
    InvalidEntity,
    /// 業務上の期限切れ（アクティベーションリンク、セッション）
    Expired,
    /// アクセストークン自体の期限切れ
    TokenExpired,
    /// キャッシュにキーが存在しない
    #[serde(rename = "CACHE_MISS_KEY")]
    CacheMiss,
}

impl ErrorTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::BadRequest => "BAD_REQUEST",
            ErrorTag::Unauthorized => "UNAUTHORIZED",
            ErrorTag::Forbidden => "FORBIDDEN",
            ErrorTag::NotFound => "NOT_FOUND",
            ErrorTag::Conflict => "CONFLICT",
            ErrorTag::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            ErrorTag::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorTag::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorTag::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorTag::LockedUser => "LOCKED_USER",
            ErrorTag::DisabledUser => "DISABLED_USER",
            ErrorTag::InvalidEntity => "INVALID_ENTITY",
            ErrorTag::Expired => "EXPIRED",
            ErrorTag::TokenExpired => "TOKEN_EXPIRED",
            ErrorTag::CacheMiss => "CACHE_MISS_KEY",
        }
    }
}

impl std::fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
