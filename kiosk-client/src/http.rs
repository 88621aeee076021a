//! HTTP client for network-based API calls

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, ClientResult, Credentials};

/// FastAPI error body: `{"detail": "..."}` or `{"detail": [{...}]}`
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    detail: serde_json::Value,
}

/// HTTP client trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn post_form<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        form: &B,
    ) -> ClientResult<T>;
    fn credentials(&self) -> &Credentials;
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig, credentials: Credentials) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.bearer() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let detail = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(err) => match err.detail {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                Err(_) => text,
            };
            tracing::debug!(status = status.as_u16(), %detail, "Request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized(detail),
                StatusCode::FORBIDDEN => ClientError::Forbidden(detail),
                StatusCode::NOT_FOUND => ClientError::NotFound(detail),
                StatusCode::CONFLICT => ClientError::Conflict(detail),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Validation(detail)
                }
                s if s.is_server_error() => ClientError::Internal(detail),
                s => ClientError::Api {
                    status: s.as_u16(),
                    detail,
                },
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.authorize(self.client.get(self.url(path)));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn post_form<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        form: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.post(self.url(path)).form(form));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}
