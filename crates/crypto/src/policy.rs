//! # Canned policy 文書
//!
//! 単一リソース・単一有効期限条件の固定形ポリシー。
//! 署名はこのバイト列そのものに対して行われるため、同じ入力からは常に同じバイト列を出力する。
//! フィールド順は構造体の宣言順で固定される。

use serde::Serialize;

use crate::CryptoError;

/// `{"Statement":[...]}`。ステートメントは常に1つ。
#[derive(Debug, Clone, Serialize)]
pub struct CannedPolicy<'a> {
    #[serde(rename = "Statement")]
    pub statement: [PolicyStatement<'a>; 1],
}

/// リソースURLと有効期限条件の組。
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatement<'a> {
    /// スキーム・ドメイン・パスを含む絶対URL
    #[serde(rename = "Resource")]
    pub resource: &'a str,
    #[serde(rename = "Condition")]
    pub condition: PolicyCondition,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyCondition {
    #[serde(rename = "DateLessThan")]
    pub date_less_than: EpochTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpochTime {
    /// UNIX秒
    #[serde(rename = "AWS:EpochTime")]
    pub epoch_time: u64,
}

impl<'a> CannedPolicy<'a> {
    pub fn new(resource: &'a str, expires_at: u64) -> Self {
        Self {
            statement: [PolicyStatement {
                resource,
                condition: PolicyCondition {
                    date_less_than: EpochTime {
                        epoch_time: expires_at,
                    },
                },
            }],
        }
    }
}

/// canned policy をコンパクトなJSONバイト列として構築する。
///
/// 空のリソースは呼び出し側（CDN URL組み立て）で事前に拒否される。
pub fn canned_policy(resource: &str, expires_at: u64) -> Result<Vec<u8>, CryptoError> {
    serde_json::to_vec(&CannedPolicy::new(resource, expires_at))
        .map_err(|e| CryptoError::Policy(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_policy_exact_bytes() {
        let bytes = canned_policy("https://cdn.example.com/users/42/report.pdf", 1700000300).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"Statement":[{"Resource":"https://cdn.example.com/users/42/report.pdf","Condition":{"DateLessThan":{"AWS:EpochTime":1700000300}}}]}"#
        );
    }

    #[test]
    fn test_canned_policy_stable() {
        let a = canned_policy("https://cdn.example.com/a", 42).unwrap();
        let b = canned_policy("https://cdn.example.com/a", 42).unwrap();
        assert_eq!(a, b);

        let c = canned_policy("https://cdn.example.com/a", 43).unwrap();
        assert_ne!(a, c);
    }

    /// リソース中の引用符はJSONとしてエスケープされる
    #[test]
    fn test_canned_policy_escapes_resource() {
        let bytes = canned_policy("https://cdn.example.com/a\"b", 1).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value["Statement"][0]["Resource"].as_str(),
            Some("https://cdn.example.com/a\"b")
        );
        assert_eq!(value["Statement"].as_array().unwrap().len(), 1);
    }
}
