//! # CDN秘密鍵の読み込み
//!
//! デプロイ環境によって秘密鍵の渡し方が異なるため、次の順に判定する。
//!
//! 1. 生のPEM: PEMヘッダ、実改行、またはエスケープされた `\n` を含む。
//!    エスケープされた `\n` は実改行に置換する。
//! 2. Base64エンコードされたPEM: 空白を除いてデコードし、UTF-8かつPEMヘッダを含む場合に採用する。
//! 3. そのまま: 上記いずれにも該当しない場合は入力を加工せずに渡す。
//!
//! 正規化後の文字列はPKCS#1、次いでPKCS#8としてパースする。
//! どちらでも読めなければ [`CryptoError::InvalidKey`] で即座に失敗する。

use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::encoding::b64;
use crate::CryptoError;

const PEM_MARKER: &str = "-----BEGIN";

/// 鍵素材がどの形式として解釈されたか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncoding {
    /// 生のPEM（エスケープ済み改行を含む）
    RawPem,
    /// Base64エンコードされたPEM
    Base64Pem,
    /// 判定できず、入力をそのまま使用
    Verbatim,
}

impl KeyEncoding {
    fn describe(self) -> &'static str {
        match self {
            KeyEncoding::RawPem => "raw PEM",
            KeyEncoding::Base64Pem => "base64-encoded PEM",
            KeyEncoding::Verbatim => "unrecognized encoding",
        }
    }
}

fn unescape_newlines(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}

/// 鍵素材の形式を判定し、PEM文字列に正規化する。
pub fn normalize_pem(raw: &str) -> (KeyEncoding, String) {
    if raw.contains(PEM_MARKER) || raw.contains('\n') || raw.contains("\\n") {
        return (KeyEncoding::RawPem, unescape_newlines(raw));
    }

    let compact: String = raw.split_whitespace().collect();
    let decoded = b64()
        .decode(compact.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .filter(|pem| pem.contains(PEM_MARKER));

    match decoded {
        Some(pem) => (KeyEncoding::Base64Pem, unescape_newlines(&pem)),
        None => (KeyEncoding::Verbatim, raw.to_string()),
    }
}

/// 鍵素材を正規化し、RSA秘密鍵としてパースする。
pub fn parse_private_key(raw: &str) -> Result<RsaPrivateKey, CryptoError> {
    let (encoding, pem) = normalize_pem(raw);

    RsaPrivateKey::from_pkcs1_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(&pem))
        .map_err(|e| {
            CryptoError::InvalidKey(format!(
                "not a PKCS#1 or PKCS#8 RSA key ({}): {e}",
                encoding.describe()
            ))
        })
}
