//! # S3互換 オブジェクトストレージ実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIに対してSigV4署名付きURLを発行する。
//! 署名はrust-s3のローカル計算で、ネットワーク通信は発生しない。

use std::collections::HashMap;

// rust-s3はhttp 0.2系のHeaderMapを受け取るため、axum(http 1.x)の型は使わない
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};

use super::ObjectStore;
use crate::config::ObjectStoreConfig;
use crate::error::GatewayError;

/// S3互換ストレージによるObjectStore実装。
pub struct S3ObjectStore {
    bucket: s3::Bucket,
}

impl S3ObjectStore {
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// リージョンとエンドポイントからバケットを初期化する。
    ///
    /// カスタムエンドポイント（MinIO等）はパススタイル、
    /// AWSのリージョナルエンドポイントは仮想ホストスタイルでURLを組み立てる。
    fn init_bucket(config: &ObjectStoreConfig, bucket_name: &str) -> anyhow::Result<s3::Bucket> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = s3::Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        // アクセスキー未設定時はrust-s3の認証情報チェーン（環境変数・プロファイル等）に委ねる
        let credentials = s3::creds::Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            config.session_token.as_deref(),
            None,
            None,
        )?;

        let bucket = s3::Bucket::new(bucket_name, region, credentials)?;
        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(*bucket)
    }

    /// 設定から構築する。バケット名が必須。
    pub fn from_config(config: &ObjectStoreConfig) -> anyhow::Result<Self> {
        let bucket_name = config
            .bucket
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("S3_BUCKET_NAMEが設定されていません"))?;

        if let Some(endpoint) = &config.endpoint {
            tracing::info!(s3_endpoint = %endpoint, "カスタムS3エンドポイントを使用");
        }

        let bucket = Self::init_bucket(config, bucket_name)?;
        tracing::info!(bucket = %bucket_name, region = %config.region, "オブジェクトストレージ署名を有効化");
        Ok(Self::new(bucket))
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expiry_secs: u32,
    ) -> Result<String, GatewayError> {
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| GatewayError::Validation(format!("invalid contentType: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);

        self.bucket
            .presign_put(key, expiry_secs, Some(headers), None)
            .await
            .map_err(|e| GatewayError::TransientSigning(format!("presigning PUT failed: {e}")))
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError> {
        self.bucket
            .presign_get(key, expiry_secs, None::<HashMap<String, String>>)
            .await
            .map_err(|e| GatewayError::TransientSigning(format!("presigning GET failed: {e}")))
    }
}
