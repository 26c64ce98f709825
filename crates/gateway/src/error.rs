//! # Gateway エラー型
//!
//! 全エンドポイントで共通。レスポンスボディは常に `{"error": "..."}`。

use axum::http::StatusCode;
use axum::Json;
use intrades_crypto::CryptoError;
use intrades_types::ErrorResponse;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（キー欠落、未対応メソッド、contentType欠落）
    #[error("{0}")]
    Validation(String),
    /// 許可されていないキー
    #[error("{0}")]
    Forbidden(String),
    /// デプロイ設定の不足・不正（CDN設定、バケット、秘密鍵）
    #[error("configuration error: {0}")]
    Configuration(String),
    /// 署名プリミティブの失敗
    #[error("signing failed: {0}")]
    Signing(String),
    /// オブジェクトストレージSDKの失敗
    #[error("object store signing failed: {0}")]
    TransientSigning(String),
    /// 内部エラー
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::Configuration(_)
            | GatewayError::Signing(_)
            | GatewayError::TransientSigning(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CryptoError> for GatewayError {
    fn from(e: CryptoError) -> Self {
        if e.is_invalid_input() {
            GatewayError::Validation(e.to_string())
        } else if e.is_configuration() {
            GatewayError::Configuration(e.to_string())
        } else {
            GatewayError::Signing(e.to_string())
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
