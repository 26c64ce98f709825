//! # cdn-url コマンド
//!
//! CloudFrontのキーペアでCDN署名付きURLをローカル生成する。
//! 鍵はGatewayと同じ環境変数（CLOUDFRONT_*）から読むか、フラグで渡す。

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Args;
use intrades_crypto::{CdnSigner, CdnSigningConfig, DEFAULT_EXPIRY_SECS};

#[derive(Args, Debug)]
pub struct CdnUrlArgs {
    /// Object key (leading slashes are ignored)
    #[arg(long)]
    pub key: String,

    /// Validity window in seconds
    #[arg(long, default_value_t = DEFAULT_EXPIRY_SECS)]
    pub expires_in: u64,

    /// CDN domain
    #[arg(long, env = "CLOUDFRONT_DOMAIN")]
    pub domain: Option<String>,

    /// CloudFront key pair id
    #[arg(long, env = "CLOUDFRONT_KEY_PAIR_ID")]
    pub key_pair_id: Option<String>,

    /// Private key (PEM, escaped PEM or base64 PEM)
    #[arg(long, env = "CLOUDFRONT_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl CdnUrlArgs {
    fn signing_config(&self) -> CdnSigningConfig {
        CdnSigningConfig {
            domain: self.domain.clone(),
            key_pair_id: self.key_pair_id.clone(),
            private_key: self.private_key.clone(),
        }
    }
}

/// `issued_at` 時点から `expires_in` 秒有効なURLを生成する。
fn sign_at(args: &CdnUrlArgs, issued_at: u64) -> anyhow::Result<String> {
    let signer = CdnSigner::from_config(&args.signing_config())?;
    tracing::debug!(
        cdn_domain = %signer.domain(),
        key = %args.key,
        expires_in = args.expires_in,
        "CDN署名付きURLを生成"
    );
    Ok(signer.sign_url(&args.key, issued_at, Some(args.expires_in))?)
}

pub fn run(args: CdnUrlArgs) -> anyhow::Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the UNIX epoch")?
        .as_secs();
    sign_at(&args, now)
}
