use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use intrades_crypto::has_dot_segments;
use intrades_types::{SignUrlRequest, SignUrlResponse};

use crate::config::{CdnSigning, GatewayState};
use crate::error::GatewayError;
use crate::storage::ObjectStore;

/// 署名対象のHTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    Put,
    Get,
}

impl FromStr for AccessMethod {
    type Err = GatewayError;

    /// `PUT` / `GET` の完全一致のみ受け付ける。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUT" => Ok(AccessMethod::Put),
            "GET" => Ok(AccessMethod::Get),
            other => Err(GatewayError::Validation(format!("unsupported method: {other}"))),
        }
    }
}

/// 検証済みのアクセス要求。PUTは必ずcontentTypeを持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequest {
    Put { key: String, content_type: String },
    Get { key: String },
}

impl AccessRequest {
    pub fn key(&self) -> &str {
        match self {
            AccessRequest::Put { key, .. } | AccessRequest::Get { key } => key,
        }
    }

    pub fn method(&self) -> AccessMethod {
        match self {
            AccessRequest::Put { .. } => AccessMethod::Put,
            AccessRequest::Get { .. } => AccessMethod::Get,
        }
    }
}

/// リクエストを検証する。
///
/// 署名設定が一切ない場合は入力内容に関わらず設定エラーとする。
pub(crate) fn validate(
    state: &GatewayState,
    body: SignUrlRequest,
) -> Result<AccessRequest, GatewayError> {
    if !state.cdn.is_configured() && state.object_store.is_none() {
        return Err(GatewayError::Configuration(
            "signing is not configured (set S3_BUCKET_NAME or CLOUDFRONT_*)".to_string(),
        ));
    }

    if body.key.trim().trim_start_matches('/').trim().is_empty() {
        return Err(GatewayError::Validation("missing key".to_string()));
    }

    let request = match body.method.parse::<AccessMethod>()? {
        AccessMethod::Put => {
            let content_type = body
                .content_type
                .as_deref()
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .ok_or_else(|| GatewayError::Validation("missing contentType".to_string()))?;
            AccessRequest::Put {
                key: body.key,
                content_type: content_type.to_string(),
            }
        }
        AccessMethod::Get => AccessRequest::Get { key: body.key },
    };

    check_key_scope(&state.allowed_key_prefixes, request.key())?;
    Ok(request)
}

/// キーの形を確認し、許可されたプレフィックス配下にあるか確認する。
///
/// `.` / `..` セグメント（`%2e` 表記を含む）とバックスラッシュは、URLの正規化で
/// 別のオブジェクトに解決されるためスコープ設定に関わらず拒否する。
/// プレフィックス未設定ならそれ以外はすべて許可。
pub(crate) fn check_key_scope(prefixes: &[String], key: &str) -> Result<(), GatewayError> {
    if has_dot_segments(key) {
        return Err(GatewayError::Validation("invalid key".to_string()));
    }

    if prefixes.is_empty() {
        return Ok(());
    }

    let key = key.trim_start_matches('/');
    if prefixes
        .iter()
        .any(|prefix| key.starts_with(prefix.trim_start_matches('/')))
    {
        Ok(())
    } else {
        Err(GatewayError::Forbidden(
            "key is outside the allowed prefixes".to_string(),
        ))
    }
}

fn unix_now() -> Result<u64, GatewayError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| GatewayError::Internal(format!("clock error: {e}")))?
        .as_secs())
}

fn object_store(state: &GatewayState) -> Result<&dyn ObjectStore, GatewayError> {
    state.object_store.as_deref().ok_or_else(|| {
        GatewayError::Configuration("object store is not configured (S3_BUCKET_NAME is unset)".to_string())
    })
}

/// 検証済みの要求に対して署名付きURLを生成する。
pub(crate) async fn sign(
    state: &GatewayState,
    request: &AccessRequest,
) -> Result<String, GatewayError> {
    match request {
        AccessRequest::Put { key, content_type } => {
            object_store(state)?
                .presign_put(key, content_type, state.expiry_secs)
                .await
        }
        AccessRequest::Get { key } => match &state.cdn {
            CdnSigning::Ready(signer) => {
                let url = signer.sign_url(key, unix_now()?, Some(u64::from(state.expiry_secs)))?;
                Ok(url)
            }
            CdnSigning::Misconfigured(reason) => Err(GatewayError::Configuration(reason.clone())),
            CdnSigning::Disabled => {
                tracing::debug!(key = %key, "CDN署名が未設定のためオブジェクトストレージで署名");
                object_store(state)?.presign_get(key, state.expiry_secs).await
            }
        },
    }
}

fn log_failure(error: GatewayError) -> GatewayError {
    if error.status().is_client_error() {
        tracing::warn!(error = %error, "署名リクエストを拒否");
    } else {
        tracing::error!(error = %error, "署名付きURLの発行に失敗");
    }
    error
}

/// POST /sign: 署名付きURL発行。
pub async fn handle_sign(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<SignUrlRequest>, JsonRejection>,
) -> Result<Json<SignUrlResponse>, GatewayError> {
    // 抽出失敗（不正なJSON、Content-Type欠落）も他のクライアントエラーと同じ400 JSONで返す
    let Json(body) = body
        .map_err(|e| GatewayError::Validation(format!("invalid request body: {}", e.body_text())))
        .map_err(log_failure)?;
    let request = validate(&state, body).map_err(log_failure)?;
    let url = sign(&state, &request).await.map_err(log_failure)?;

    tracing::info!(
        method = ?request.method(),
        key = %request.key(),
        "署名付きURLを発行"
    );

    Ok(Json(SignUrlResponse { url }))
}
