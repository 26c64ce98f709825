//! # request コマンド
//!
//! Gatewayの `POST /sign` を呼び出す。エラー時はサーバーの `error` を表示して失敗する。

use anyhow::Context;
use clap::Args;
use intrades_types::{ErrorResponse, SignUrlRequest, SignUrlResponse};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Gateway base URL
    #[arg(long, env = "INTRADES_GATEWAY_URL", default_value = "http://localhost:3000")]
    pub endpoint: String,

    /// HTTP method to sign for (GET or PUT)
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Object key
    #[arg(long)]
    pub key: String,

    /// Content type the upload will be sent with (required for PUT)
    #[arg(long)]
    pub content_type: Option<String>,
}

pub async fn run(args: RequestArgs) -> anyhow::Result<String> {
    let endpoint = format!("{}/sign", args.endpoint.trim_end_matches('/'));
    let body = SignUrlRequest {
        method: args.method,
        key: args.key,
        content_type: args.content_type,
    };

    tracing::debug!(endpoint = %endpoint, method = %body.method, key = %body.key, "署名をリクエスト");

    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Gatewayへの接続に失敗: {endpoint}"))?;

    let status = response.status();
    if status.is_success() {
        let signed: SignUrlResponse = response
            .json()
            .await
            .context("Gatewayのレスポンスが不正です")?;
        return Ok(signed.url);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    anyhow::bail!("gateway returned {status}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::Json;

    /// /sign を模したモックGatewayを起動し、ベースURLを返す
    async fn spawn_mock_gateway() -> String {
        let app = axum::Router::new().route(
            "/sign",
            axum::routing::post(|Json(body): Json<SignUrlRequest>| async move {
                if body.method != "GET" {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: format!("unsupported method: {}", body.method),
                        }),
                    ));
                }
                Ok(Json(SignUrlResponse {
                    url: format!("https://cdn.example.com/{}?Expires=1", body.key),
                }))
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_request_prints_url() {
        let endpoint = spawn_mock_gateway().await;
        let url = run(RequestArgs {
            endpoint: format!("{endpoint}/"),
            method: "GET".to_string(),
            key: "users/42/report.pdf".to_string(),
            content_type: None,
        })
        .await
        .unwrap();
        assert_eq!(url, "https://cdn.example.com/users/42/report.pdf?Expires=1");
    }

    #[tokio::test]
    async fn test_request_surfaces_server_error() {
        let endpoint = spawn_mock_gateway().await;
        let err = run(RequestArgs {
            endpoint,
            method: "DELETE".to_string(),
            key: "a.txt".to_string(),
            content_type: None,
        })
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"), "{message}");
        assert!(message.contains("unsupported method: DELETE"), "{message}");
    }
}
