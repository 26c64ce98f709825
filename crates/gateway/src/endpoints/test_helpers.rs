//! # エンドポイントテスト用共通ヘルパー
//!
//! テスト用RSA鍵とGatewayStateの構築。

use std::sync::{Arc, Mutex, OnceLock};

use intrades_crypto::{CdnSigner, CdnSigningConfig};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::config::{CdnSigning, GatewayState};
use crate::storage::mock::MockObjectStore;
use crate::storage::ObjectStore;

pub const CDN_DOMAIN: &str = "cdn.example.com";
pub const KEY_PAIR_ID: &str = "K2EXAMPLE";

static TEST_KEY_PEM: OnceLock<String> = OnceLock::new();

/// テスト用秘密鍵（PKCS#8 PEM）。鍵生成は一度だけ行う。
pub fn test_private_key_pem() -> &'static str {
    TEST_KEY_PEM.get_or_init(|| {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
    })
}

pub fn test_cdn_config() -> CdnSigningConfig {
    CdnSigningConfig {
        domain: Some(CDN_DOMAIN.to_string()),
        key_pair_id: Some(KEY_PAIR_ID.to_string()),
        private_key: Some(test_private_key_pem().to_string()),
    }
}

pub fn test_cdn_signing() -> CdnSigning {
    CdnSigning::Ready(CdnSigner::from_config(&test_cdn_config()).unwrap())
}

/// 記録用ハンドル付きのモックストレージ
pub fn mock_store() -> (Box<dyn ObjectStore>, Arc<Mutex<Vec<String>>>) {
    let store = MockObjectStore::default();
    let calls = store.calls.clone();
    (Box::new(store), calls)
}

pub fn test_state(cdn: CdnSigning, object_store: Option<Box<dyn ObjectStore>>) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        cdn,
        object_store,
        expiry_secs: 300,
        allowed_key_prefixes: vec![],
    })
}
