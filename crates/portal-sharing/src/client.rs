//! The API client seam: every facade call goes through [`ApiClient::call_api`].

use crate::error::ApiError;
use portal_core::PortalConfig;
use std::time::Duration;

pub use reqwest::Method;

/// One outbound call: endpoint path relative to the gateway, method, optional JSON body, query params.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::GET,
            body: None,
            params: Vec::new(),
        }
    }

    pub fn post(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::POST,
            body: Some(body),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Transport used by the sharing facade. Returns the decoded JSON response, or an error
/// for transport failures and non-2xx statuses.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn call_api(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError>;
}

/// [`ApiClient`] over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    /// Client with reqwest defaults (no timeout) against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client configured with the timeout and user agent from [`PortalConfig`].
    pub fn from_config(config: &PortalConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: config.base_url().to_string(),
                source,
            })?;
        Ok(Self::with_client(http, config.base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

/// Error bodies are kept even when they are not JSON.
fn decode_error_body(bytes: &[u8]) -> serde_json::Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn call_api(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        let ApiRequest { endpoint, method, body, params } = request;
        tracing::debug!(method = %method, endpoint = %endpoint, "calling portal API");

        let mut builder = self.http.request(method, self.url(&endpoint));
        if !params.is_empty() {
            builder = builder.query(&params);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "portal API returned error status");
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body: decode_error_body(&bytes),
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Json, Query},
        http::StatusCode,
        routing::{get, post},
        Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_router() -> Router {
        Router::new()
            .route(
                "/api/share",
                post(|Json(body): Json<serde_json::Value>| async move {
                    Json(json!({ "received": body }))
                }),
            )
            .route(
                "/api/subjects",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({ "search": params.get("search") }))
                }),
            )
            .route(
                "/api/conflict",
                post(|| async {
                    (StatusCode::CONFLICT, Json(json!({ "error_code": "ERR_EXISTS" })))
                }),
            )
            .route("/api/empty", post(|| async { StatusCode::OK }))
            .route("/api/text", get(|| async { "not json" }))
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let base = serve(test_router()).await;
        let client = HttpApiClient::new(format!("{}/", base));
        let res = client
            .call_api(ApiRequest::post("/api/share", json!({ "sharing": [] })))
            .await
            .unwrap();
        assert_eq!(res, json!({ "received": { "sharing": [] } }));
    }

    #[tokio::test]
    async fn test_get_sends_query_params() {
        let base = serve(test_router()).await;
        let client = HttpApiClient::new(base);
        let res = client
            .call_api(ApiRequest::get("api/subjects").with_param("search", "bob"))
            .await
            .unwrap();
        assert_eq!(res["search"], "bob");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_status_error() {
        let base = serve(test_router()).await;
        let client = HttpApiClient::new(base);
        let err = client
            .call_api(ApiRequest::post("/api/conflict", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.error_code(), Some("ERR_EXISTS"));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_null_and_text_is_decode_error() {
        let base = serve(test_router()).await;
        let client = HttpApiClient::new(base);
        let res = client
            .call_api(ApiRequest::post("/api/empty", json!({})))
            .await
            .unwrap();
        assert!(res.is_null());

        let err = client.call_api(ApiRequest::get("/api/text")).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let config = PortalConfig {
            api_base_url: format!("http://{}", addr),
            request_timeout_secs: 5,
            ..PortalConfig::default()
        };
        let client = HttpApiClient::from_config(&config).unwrap();
        let err = client.call_api(ApiRequest::get("/api/subjects")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
