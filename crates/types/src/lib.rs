//! # InTrades 署名ゲートウェイ 共有型定義
//!
//! `/sign` および `/signing-info` エンドポイントのリクエスト・レスポンス型を提供する。
//! Gateway と CLI の双方が同じ型でシリアライズ／デシリアライズする。
//!
//! ## フィールド命名
//! ブラウザ側のアップロードUIに合わせて、JSONのフィールド名は camelCase とする。

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /sign
// ---------------------------------------------------------------------------

/// POST /sign リクエスト。
///
/// 各フィールドは検証前の生の値を保持する。
/// 欠落・空文字・未対応メソッドの判定はGateway側のハンドラが行う。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUrlRequest {
    /// HTTPメソッド（"PUT" または "GET"）
    #[serde(default)]
    pub method: String,
    /// オブジェクトキー（例: "users/42/report.pdf"）
    #[serde(default)]
    pub key: String,
    /// コンテンツのMIMEタイプ（PUTの場合は必須）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// POST /sign 成功レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUrlResponse {
    /// 署名付きURL（CDN署名URLまたはオブジェクトストレージの署名付きURL）
    pub url: String,
}

/// エラーレスポンス。全エンドポイントで共通。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// エラー内容
    pub error: String,
}

// ---------------------------------------------------------------------------
// /signing-info
// ---------------------------------------------------------------------------

/// GET /signing-info レスポンス。
///
/// どの署名方式が利用可能かをクライアントに公開する。
/// ドメイン・キーペアID・鍵素材は含めない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningInfo {
    /// CDN署名（GET専用）が有効か
    pub cdn_enabled: bool,
    /// オブジェクトストレージの署名付きURLが有効か
    pub object_store_enabled: bool,
    /// 署名付きURLのデフォルト有効期間（秒）
    pub default_expiry_secs: u32,
}
