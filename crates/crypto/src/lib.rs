//! # InTrades CDN署名 暗号処理
//!
//! CloudFront の canned policy 形式による署名付きURLの生成に必要な処理を実装する。
//! 暗号プリミティブ自体は RustCrypto の `rsa` / `sha1` に委譲し、このクレートは
//! ポリシー文書の構築・鍵素材の正規化・URL組み立てのみを担う。
//!
//! ## 処理の流れ
//! | 段階 | 実装 |
//! |------|------|
//! | ポリシー文書構築 | [`policy::canned_policy`] |
//! | 鍵素材の正規化・パース | [`key::parse_private_key`] |
//! | 署名 | [`rsa_sha1_sign`]（RSASSA-PKCS1-v1_5 + SHA-1） |
//! | URLセーフ変換 | [`encoding::cdn_safe_base64`] |
//! | URL組み立て | [`CdnSigner`] / [`sign_cdn_url`] |

mod cdn;
pub mod encoding;
pub mod key;
pub mod policy;

use rsa::signature::{SignatureEncoding, Signer};

pub use cdn::{has_dot_segments, normalize_domain, normalize_path, sign_cdn_url, CdnSigner, CdnSigningConfig, DEFAULT_EXPIRY_SECS};
pub use rsa::RsaPrivateKey;

/// CloudFront署名用のRSA鍵（PKCS#1 v1.5 / SHA-1）。
pub type CdnSigningKey = rsa::pkcs1v15::SigningKey<sha1::Sha1>;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// CDN署名に必要な設定が欠けている
    #[error("CDN signing is not configured: missing {0}")]
    NotConfigured(&'static str),
    /// CDNドメインがURLとして解釈できない
    #[error("CDN domain is invalid: {0}")]
    InvalidDomain(String),
    /// 秘密鍵がPKCS#1/PKCS#8のいずれとしてもパースできない
    #[error("CDN private key is malformed: {0}")]
    InvalidKey(String),
    /// 署名対象のリソースパスが不正
    #[error("invalid CDN resource: {0}")]
    InvalidResource(String),
    /// ポリシー文書のシリアライズ失敗
    #[error("policy serialization failed: {0}")]
    Policy(String),
    /// 署名プリミティブが鍵を拒否した
    #[error("RSA-SHA1 signing failed: {0}")]
    Signing(String),
}

impl CryptoError {
    /// デプロイ設定に起因するエラーか。
    /// 呼び出し側はこれを「未設定・設定不正」として扱い、署名失敗と区別する。
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CryptoError::NotConfigured(_) | CryptoError::InvalidDomain(_) | CryptoError::InvalidKey(_)
        )
    }

    /// 呼び出し側が渡したリソースパスに起因するエラーか。
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CryptoError::InvalidResource(_))
    }
}

/// RSA-SHA1による署名。
/// CloudFrontの検証仕様に合わせ、PKCS#1 v1.5 パディングを使用する。
pub fn rsa_sha1_sign(signing_key: &CdnSigningKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signature = signing_key
        .try_sign(message)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;
    use sha1::Sha1;

    #[test]
    fn test_rsa_sha1_sign_verifies() {
        let private_key = test_support::test_private_key().clone();
        let verifying_key = VerifyingKey::<Sha1>::new(private_key.to_public_key());
        let signing_key = CdnSigningKey::new(private_key);

        let message = b"{\"Statement\":[]}";
        let sig = rsa_sha1_sign(&signing_key, message).unwrap();
        assert_eq!(sig.len(), 128, "1024bit鍵の署名長");

        let signature = Signature::try_from(sig.as_slice()).unwrap();
        assert!(verifying_key.verify(message, &signature).is_ok());
        assert!(verifying_key.verify(b"tampered", &signature).is_err());
    }

    /// PKCS#1 v1.5 は決定的。同じ入力から同じ署名が得られる
    #[test]
    fn test_rsa_sha1_sign_deterministic() {
        let signing_key = CdnSigningKey::new(test_support::test_private_key().clone());
        let a = rsa_sha1_sign(&signing_key, b"policy").unwrap();
        let b = rsa_sha1_sign(&signing_key, b"policy").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(CryptoError::NotConfigured("domain").is_configuration());
        assert!(CryptoError::InvalidKey("x".into()).is_configuration());
        assert!(!CryptoError::Signing("x".into()).is_configuration());
        assert!(!CryptoError::Policy("x".into()).is_configuration());
        assert!(!CryptoError::InvalidResource("x".into()).is_configuration());
        assert!(CryptoError::InvalidResource("x".into()).is_invalid_input());
    }
}
