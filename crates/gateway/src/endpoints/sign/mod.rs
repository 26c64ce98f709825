//! # POST /sign エンドポイント
//!
//! オブジェクトキーに対する署名付きURLを1つ発行する。
//!
//! ## 処理フロー
//! 1. 受信: リクエストボディから method / key / contentType を取り出す
//! 2. 検証: 署名設定の有無、キー、メソッド、contentType、キーのスコープを確認
//!    （不正なら 400 / 403、署名設定が一切なければ 500）
//! 3. 署名:
//!    - GET: CDN署名が設定されていればCDN署名URL、なければオブジェクトストレージのGET URL
//!    - PUT: 常にオブジェクトストレージのPUT URL（アップロードはCDNを経由しない）
//! 4. 応答: `{"url": ...}`
//!
//! CDN未設定はエラーではなく通常の分岐として扱い、debugレベルでのみ記録する。

mod handler;


pub use handler::handle_sign;
