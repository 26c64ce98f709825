//! # InTrades Signing Gateway
//!
//! オブジェクトキーに対する短期の署名付きURLを発行するGateway。
//!
//! ## 役割
//! - ダウンロード（GET）: CDN署名（canned policy, RSA-SHA1）が設定されていればCDN URL、
//!   なければオブジェクトストレージ（S3互換）のSigV4署名付きURL
//! - アップロード（PUT）: 常にオブジェクトストレージの署名付きURL
//!
//! ## API エンドポイント
//! - `POST /sign`: 署名付きURL発行
//! - `GET /signing-info`: 有効な署名経路の公開

mod config;
mod endpoints;
mod error;
mod storage;

use std::sync::Arc;

use crate::config::{CdnSigning, GatewayState, SigningConfig};
use crate::endpoints::{handle_sign, handle_signing_info};

/// ルーティングを構築する。
fn router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route("/sign", axum::routing::post(handle_sign))
        .route("/signing-info", axum::routing::get(handle_signing_info))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = SigningConfig::from_env()?;
    tracing::debug!(
        cdn_configured = config.is_cdn_configured(),
        object_store_configured = config.is_object_store_configured(),
        allowed_key_prefixes = ?config.allowed_key_prefixes,
        "署名設定を読み込み"
    );
    let state = GatewayState::from_config(&config)?;

    match &state.cdn {
        CdnSigning::Ready(signer) => tracing::info!(
            cdn_domain = %signer.domain(),
            key_pair_id = %signer.key_pair_id(),
            "CDN署名を有効化"
        ),
        CdnSigning::Misconfigured(reason) => {
            tracing::error!(reason = %reason, "CDN署名の設定が不正です。GETリクエストは失敗します")
        }
        CdnSigning::Disabled => {
            tracing::info!("CDN署名は未設定です。GETはオブジェクトストレージで署名します")
        }
    }
    if !state.cdn.is_configured() && state.object_store.is_none() {
        tracing::warn!("署名設定がありません。すべての署名リクエストは失敗します");
    }

    let app = router(Arc::new(state));

    tracing::info!(
        expiry_secs = config.expiry_secs,
        "Gatewayを {} で起動します",
        config.bind_addr
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
