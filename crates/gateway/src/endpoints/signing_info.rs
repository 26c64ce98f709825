//! # GET /signing-info
//!
//! 利用可能な署名方式の公開エンドポイント。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use intrades_types::SigningInfo;

use crate::config::{CdnSigning, GatewayState};

/// GET /signing-info: 署名方式の公開。
///
/// アップロードUIがダウンロードをCDN経由にするかを判断するために使用する。
/// 鍵が壊れているCDN設定は有効として扱わない。
pub async fn handle_signing_info(State(state): State<Arc<GatewayState>>) -> Json<SigningInfo> {
    Json(SigningInfo {
        cdn_enabled: matches!(state.cdn, CdnSigning::Ready(_)),
        object_store_enabled: state.object_store.is_some(),
        default_expiry_secs: state.expiry_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::MockObjectStore;

    #[tokio::test]
    async fn test_signing_info_object_store_only() {
        let state = Arc::new(GatewayState {
            cdn: CdnSigning::Disabled,
            object_store: Some(Box::new(MockObjectStore::default())),
            expiry_secs: 300,
            allowed_key_prefixes: vec![],
        });

        let info = handle_signing_info(State(state)).await.0;
        assert_eq!(
            info,
            SigningInfo {
                cdn_enabled: false,
                object_store_enabled: true,
                default_expiry_secs: 300,
            }
        );
    }

    #[tokio::test]
    async fn test_signing_info_misconfigured_cdn_is_disabled() {
        let state = Arc::new(GatewayState {
            cdn: CdnSigning::Misconfigured("bad key".to_string()),
            object_store: None,
            expiry_secs: 120,
            allowed_key_prefixes: vec![],
        });

        let info = handle_signing_info(State(state)).await.0;
        assert!(!info.cdn_enabled);
        assert!(!info.object_store_enabled);
        assert_eq!(info.default_expiry_secs, 120);
    }
}
