//! # Gateway設定・共有状態
//!
//! 環境変数は起動時に一度だけ [`SigningConfig`] に読み込み、以後は参照しない。
//! ハンドラは [`GatewayState`] 経由で設定を受け取るため、テストでは環境変数を
//! 書き換えずに「CDN設定あり／なし」の状態を構築できる。

use std::fmt;

use anyhow::Context;
use intrades_crypto::{CdnSigner, CdnSigningConfig};

use crate::storage::{ObjectStore, S3ObjectStore};

/// デフォルトの待ち受けアドレス
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// デフォルトのリージョン
pub const DEFAULT_REGION: &str = "us-east-1";
/// 署名付きURLのデフォルト有効期間（秒）
pub const DEFAULT_EXPIRY_SECS: u32 = 300;

/// オブジェクトストレージ（S3互換）の設定。
#[derive(Clone, Default)]
pub struct ObjectStoreConfig {
    /// バケット名。未設定ならオブジェクトストレージ署名は無効
    pub bucket: Option<String>,
    /// リージョン
    pub region: String,
    /// S3互換エンドポイント（MinIO等）。未設定ならAWSのリージョナルエンドポイント
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// 環境変数から読み込んだプロセス全体の署名設定。
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// CDN署名設定（CLOUDFRONT_*）
    pub cdn: CdnSigningConfig,
    /// オブジェクトストレージ設定（S3_* / AWS_*）
    pub object_store: ObjectStoreConfig,
    /// 署名付きURLの有効期間（秒）
    pub expiry_secs: u32,
    /// 許可するキープレフィックス。空ならスコープ制限なし
    pub allowed_key_prefixes: Vec<String>,
    /// 待ち受けアドレス
    pub bind_addr: String,
}

impl SigningConfig {
    /// プロセスの環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から構築する。空白のみの値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let cdn = CdnSigningConfig {
            domain: var("CLOUDFRONT_DOMAIN"),
            key_pair_id: var("CLOUDFRONT_KEY_PAIR_ID"),
            private_key: var("CLOUDFRONT_PRIVATE_KEY"),
        };

        let object_store = ObjectStoreConfig {
            bucket: var("S3_BUCKET_NAME"),
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: var("S3_ENDPOINT"),
            access_key: var("AWS_ACCESS_KEY_ID"),
            secret_key: var("AWS_SECRET_ACCESS_KEY"),
            session_token: var("AWS_SESSION_TOKEN"),
        };

        let expiry_secs = match var("SIGNED_URL_EXPIRY_SECS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("SIGNED_URL_EXPIRY_SECSが不正です: {raw}"))?,
            None => DEFAULT_EXPIRY_SECS,
        };
        if expiry_secs == 0 {
            anyhow::bail!("SIGNED_URL_EXPIRY_SECSは1以上である必要があります");
        }

        let allowed_key_prefixes = var("SIGNING_ALLOWED_PREFIXES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            cdn,
            object_store,
            expiry_secs,
            allowed_key_prefixes,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// CDN署名の3項目がすべて揃っているか。
    pub fn is_cdn_configured(&self) -> bool {
        self.cdn.is_configured()
    }

    /// バケットが設定されているか。
    pub fn is_object_store_configured(&self) -> bool {
        self.object_store.bucket.is_some()
    }
}

/// CDN署名の状態。
///
/// 鍵のパースは起動時に一度だけ行う。設定はあるが鍵が壊れている場合は
/// `Misconfigured` として保持し、GETリクエストのたびに設定エラーとして返す
/// （オブジェクトストレージへはフォールバックしない）。
#[derive(Debug)]
pub enum CdnSigning {
    /// 未設定。GETはオブジェクトストレージで署名する
    Disabled,
    /// 署名可能
    Ready(CdnSigner),
    /// 設定はあるが不正
    Misconfigured(String),
}

impl CdnSigning {
    /// 設定から状態を決定する。
    pub fn from_config(config: &CdnSigningConfig) -> Self {
        if !config.is_configured() {
            return CdnSigning::Disabled;
        }
        match CdnSigner::from_config(config) {
            Ok(signer) => CdnSigning::Ready(signer),
            Err(e) => {
                tracing::warn!(error = %e, "CDN署名の設定が不正です");
                CdnSigning::Misconfigured(e.to_string())
            }
        }
    }

    /// GETリクエストをCDN経路で処理するか。
    pub fn is_configured(&self) -> bool {
        !matches!(self, CdnSigning::Disabled)
    }
}

/// Gatewayの共有状態。起動後は変更されない。
pub struct GatewayState {
    /// CDN署名
    pub cdn: CdnSigning,
    /// オブジェクトストレージ（S3互換等、トレイトで抽象化）。
    /// バケット未設定ならNone
    pub object_store: Option<Box<dyn ObjectStore>>,
    /// 署名付きURLの有効期間（秒）
    pub expiry_secs: u32,
    /// 許可するキープレフィックス
    pub allowed_key_prefixes: Vec<String>,
}

impl GatewayState {
    /// 設定から共有状態を構築する。
    pub fn from_config(config: &SigningConfig) -> anyhow::Result<Self> {
        let object_store: Option<Box<dyn ObjectStore>> = if config.is_object_store_configured() {
            Some(Box::new(S3ObjectStore::from_config(&config.object_store)?))
        } else {
            None
        };

        Ok(Self {
            cdn: CdnSigning::from_config(&config.cdn),
            object_store,
            expiry_secs: config.expiry_secs,
            allowed_key_prefixes: config.allowed_key_prefixes.clone(),
        })
    }
}
