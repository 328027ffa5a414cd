use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, Endpoint};

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://kami-backend-5rs0.onrender.com";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response of the login endpoint. A missing token means bad credentials.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Request body carrying the session token next to the payload fields.
#[derive(Serialize)]
struct WithToken<'a, B: Serialize + ?Sized> {
    #[serde(flatten)]
    body: &'a B,
    token: &'a str,
}

#[derive(Serialize)]
struct TokenOnly<'a> {
    token: &'a str,
}

/// JSON-over-HTTP client for the Kami endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Collection URL of an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// URL of a single record.
    pub fn item_url(&self, endpoint: Endpoint, id: &str) -> String {
        format!("{}/{}", self.url(endpoint), urlencoding::encode(id))
    }

    // ========== Auth ==========

    /// Exchanges a phone number and password for a token.
    pub async fn login(&self, phone: &str, password: &str) -> ApiResult<LoginResponse> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            phone: &'a str,
            password: &'a str,
        }

        let request = self
            .http
            .post(self.url(Endpoint::Auth))
            .json(&LoginRequest { phone, password });
        decode(send(request).await?).await
    }

    /// Creates an account. Registration does not log the user in.
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<()> {
        #[derive(Serialize)]
        struct RegisterRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let request = self
            .http
            .post(self.url(Endpoint::Register))
            .json(&RegisterRequest { email, password });
        send(request).await.map(drop)
    }

    // ========== Resources ==========

    pub async fn list<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<Vec<T>> {
        let request = self.http.get(self.url(endpoint));
        decode(send(request).await?).await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint, id: &str) -> ApiResult<T> {
        let request = self.http.get(self.item_url(endpoint, id));
        decode(send(request).await?).await
    }

    /// Posts a new record and returns the server's copy of it.
    pub async fn create<B, T>(&self, endpoint: Endpoint, body: &B, token: &str) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.url(endpoint))
            .json(&WithToken { body, token });
        decode(send(request).await?).await
    }

    /// Sends a partial update. The response body is ignored.
    pub async fn update<B>(
        &self,
        endpoint: Endpoint,
        id: &str,
        patch: &B,
        token: &str,
    ) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self
            .http
            .put(self.item_url(endpoint, id))
            .json(&WithToken { body: patch, token });
        send(request).await.map(drop)
    }

    pub async fn delete(&self, endpoint: Endpoint, id: &str, token: &str) -> ApiResult<()> {
        let request = self
            .http
            .delete(self.item_url(endpoint, id))
            .json(&TokenOnly { token });
        send(request).await.map(drop)
    }
}

/// Sends a request and turns non-2xx statuses into [`ApiError::Status`].
async fn send(request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("{} {}", status.as_u16(), response.url());

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }

    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
