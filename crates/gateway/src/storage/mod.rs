//! # オブジェクトストレージ
//!
//! 署名付きURLを発行するストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use self::s3::S3ObjectStore;

use crate::error::GatewayError;

/// オブジェクトストレージの抽象インターフェース。
///
/// 各メソッドは1回の操作（PutObject / GetObject）にスコープされた署名付きURLを返す。
/// SDK側の失敗は [`GatewayError::TransientSigning`] として返し、リトライはしない。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// アップロード用（PUT）の署名付きURLを生成する。
    /// `content_type` は署名対象ヘッダに含まれ、アップロード時に一致が要求される。
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expiry_secs: u32,
    ) -> Result<String, GatewayError>;

    /// ダウンロード用（GET）の署名付きURLを生成する。
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::{Arc, Mutex};

    use super::ObjectStore;
    use crate::error::GatewayError;

    /// テスト用のモックObjectStore。
    /// S3への接続なしで仮想ホスト形式のダミーURLを返し、呼び出しを記録する。
    /// `calls` はBoxに移した後も参照できるよう共有する。
    #[derive(Default)]
    pub struct MockObjectStore {
        pub calls: Arc<Mutex<Vec<String>>>,
    }

    pub const MOCK_HOST: &str = "intrades-uploads.s3.us-east-1.amazonaws.com";

    #[async_trait::async_trait]
    impl ObjectStore for MockObjectStore {
        async fn presign_put(
            &self,
            key: &str,
            content_type: &str,
            expiry_secs: u32,
        ) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(format!("PUT {key} {content_type}"));
            Ok(format!(
                "https://{MOCK_HOST}/{key}?X-Amz-Expires={expiry_secs}&X-Amz-SignedHeaders=content-type%3Bhost&X-Amz-Signature=test"
            ))
        }

        async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(format!("GET {key}"));
            Ok(format!(
                "https://{MOCK_HOST}/{key}?X-Amz-Expires={expiry_secs}&X-Amz-SignedHeaders=host&X-Amz-Signature=test"
            ))
        }
    }

    /// 常にSDKエラーを返すObjectStore
    pub struct FailingObjectStore;

    #[async_trait::async_trait]
    impl ObjectStore for FailingObjectStore {
        async fn presign_put(
            &self,
            _key: &str,
            _content_type: &str,
            _expiry_secs: u32,
        ) -> Result<String, GatewayError> {
            Err(GatewayError::TransientSigning("credentials expired".to_string()))
        }

        async fn presign_get(&self, _key: &str, _expiry_secs: u32) -> Result<String, GatewayError> {
            Err(GatewayError::TransientSigning("credentials expired".to_string()))
        }
    }
}
