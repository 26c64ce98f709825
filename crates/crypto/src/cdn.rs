//! # CDN署名付きURLの組み立て
//!
//! 出力形式:
//! `https://{domain}/{path}?Expires={expiry}&Signature={signature}&Key-Pair-Id={key_pair_id}`
//!
//! 署名対象の `Resource` はクエリを除いたURLそのもの。CloudFrontはリクエストURLと
//! 照合するため、パスはブラウザが送るのと同じ形でパーセントエンコードしておく。

use std::fmt;

use url::{form_urlencoded, Url};

use crate::encoding::cdn_safe_base64;
use crate::key::parse_private_key;
use crate::policy::canned_policy;
use crate::{rsa_sha1_sign, CdnSigningKey, CryptoError};

/// 署名付きURLのデフォルト有効期間（秒）
pub const DEFAULT_EXPIRY_SECS: u64 = 300;

/// CDN署名の設定。3項目すべてが揃って初めて有効になる。
#[derive(Clone, Default)]
pub struct CdnSigningConfig {
    /// 配信ドメイン（例: "cdn.example.com"）
    pub domain: Option<String>,
    /// キーペアID
    pub key_pair_id: Option<String>,
    /// 秘密鍵素材（生PEM、エスケープ済みPEM、Base64 PEMのいずれか）
    pub private_key: Option<String>,
}

impl fmt::Debug for CdnSigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnSigningConfig")
            .field("domain", &self.domain)
            .field("key_pair_id", &self.key_pair_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CdnSigningConfig {
    /// ドメイン・キーペアID・秘密鍵がすべて空でないか。
    pub fn is_configured(&self) -> bool {
        present(&self.domain).is_some()
            && present(&self.key_pair_id).is_some()
            && present(&self.private_key).is_some()
    }

    fn require(&self) -> Result<(&str, &str, &str), CryptoError> {
        let domain = present(&self.domain).ok_or(CryptoError::NotConfigured("domain"))?;
        let key_pair_id =
            present(&self.key_pair_id).ok_or(CryptoError::NotConfigured("key pair id"))?;
        let private_key =
            present(&self.private_key).ok_or(CryptoError::NotConfigured("private key"))?;
        Ok((domain, key_pair_id, private_key))
    }
}

/// 設定値のドメインからスキームと末尾のスラッシュを取り除く。
pub fn normalize_domain(domain: &str) -> &str {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/')
}

/// 先頭のスラッシュをいくつでも取り除く。
/// `//evil.example.com` のようなプロトコル相対URLの混入を防ぐ。
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// `.` / `..` セグメント（`%2e` 表記を含む）またはバックスラッシュを含むか。
///
/// URLのパス正規化はこれらを解決してしまうため、署名対象の `Resource` が
/// 要求されたキーとは別のオブジェクトを指すことになる。
pub fn has_dot_segments(path: &str) -> bool {
    path.contains('\\')
        || path.split('/').any(|segment| {
            let segment = segment.to_ascii_lowercase().replace("%2e", ".");
            segment == "." || segment == ".."
        })
}

/// パース済みの鍵を保持するCDN署名器。
#[derive(Clone)]
pub struct CdnSigner {
    base: Url,
    key_pair_id: String,
    signing_key: CdnSigningKey,
}

impl fmt::Debug for CdnSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnSigner")
            .field("base", &self.base.as_str())
            .field("key_pair_id", &self.key_pair_id)
            .finish_non_exhaustive()
    }
}

impl CdnSigner {
    /// 設定から署名器を構築する。
    ///
    /// 項目が欠けていれば [`CryptoError::NotConfigured`]、
    /// ドメインや鍵が不正なら [`CryptoError::InvalidDomain`] / [`CryptoError::InvalidKey`]。
    pub fn from_config(config: &CdnSigningConfig) -> Result<Self, CryptoError> {
        let (domain, key_pair_id, private_key) = config.require()?;

        let domain = normalize_domain(domain);
        let base = Url::parse(&format!("https://{domain}/"))
            .map_err(|e| CryptoError::InvalidDomain(format!("{domain}: {e}")))?;
        if base.host_str().is_none() {
            return Err(CryptoError::InvalidDomain(domain.to_string()));
        }

        let private_key = parse_private_key(private_key)?;

        Ok(Self {
            base,
            key_pair_id: key_pair_id.to_string(),
            signing_key: CdnSigningKey::new(private_key),
        })
    }

    /// 配信ドメイン（ポート付きの場合はポートを含む）
    pub fn domain(&self) -> &str {
        &self.base[url::Position::BeforeHost..url::Position::AfterPort]
    }

    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// 署名対象となるクエリなしの絶対URLを組み立てる。
    pub fn resource_url(&self, resource_path: &str) -> Result<String, CryptoError> {
        let path = normalize_path(resource_path);
        if path.is_empty() {
            return Err(CryptoError::InvalidResource("empty resource path".to_string()));
        }
        if has_dot_segments(path) {
            return Err(CryptoError::InvalidResource(format!(
                "dot segments are not allowed: {path}"
            )));
        }

        let mut url = self.base.clone();
        url.set_path(&format!("/{path}"));
        Ok(url.into())
    }

    /// 指定した有効期限（UNIX秒）で署名付きURLを生成する。
    pub fn sign_url_at(&self, resource_path: &str, expires_at: u64) -> Result<String, CryptoError> {
        let resource = self.resource_url(resource_path)?;
        let policy = canned_policy(&resource, expires_at)?;
        let signature = cdn_safe_base64(&rsa_sha1_sign(&self.signing_key, &policy)?);
        let key_pair_id: String =
            form_urlencoded::byte_serialize(self.key_pair_id.as_bytes()).collect();

        Ok(format!(
            "{resource}?Expires={expires_at}&Signature={signature}&Key-Pair-Id={key_pair_id}"
        ))
    }

    /// `issued_at + window`（デフォルト300秒）を有効期限として署名する。
    pub fn sign_url(
        &self,
        resource_path: &str,
        issued_at: u64,
        window_secs: Option<u64>,
    ) -> Result<String, CryptoError> {
        let expires_at = issued_at.saturating_add(window_secs.unwrap_or(DEFAULT_EXPIRY_SECS));
        self.sign_url_at(resource_path, expires_at)
    }
}

/// 設定から直接CDN署名付きURLを生成する。
pub fn sign_cdn_url(
    config: &CdnSigningConfig,
    resource_path: &str,
    issued_at: u64,
    window_secs: Option<u64>,
) -> Result<String, CryptoError> {
    CdnSigner::from_config(config)?.sign_url(resource_path, issued_at, window_secs)
}
