//! # CloudFront用URLセーフBase64
//!
//! 標準Base64の出力に対して `+`→`-`、`=`→`_`、`/`→`~` の置換のみを行う。
//! 汎用のURL-safe Base64（RFC 4648 §5）とは異なる点に注意。パディングは除去しない。

use base64::Engine;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// 署名バイト列をCloudFrontのクエリ文字列で使える形にエンコードする。
pub fn cdn_safe_base64(bytes: &[u8]) -> String {
    b64()
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_all_unsafe_characters() {
        // 0xfb 0xff は標準Base64で "+/8="
        assert_eq!(b64().encode([0xfb, 0xff]), "+/8=");
        assert_eq!(cdn_safe_base64(&[0xfb, 0xff]), "-~8_");
    }

    /// 1バイト入力はパディング2文字がそのまま置換される
    #[test]
    fn test_keeps_padding_length() {
        assert_eq!(cdn_safe_base64(&[0x00]), "AA__");
    }

    #[test]
    fn test_output_has_no_url_unsafe_characters() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let encoded = cdn_safe_base64(&bytes);
        assert_eq!(encoded.len(), b64().encode(&bytes).len());
        assert!(!encoded.contains(['+', '/', '=']));
    }
}
