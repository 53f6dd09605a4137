//! HTTP client for the vibes API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::types::{
    ClarifyRequest, ClarifyResponse, FortuneResponse, CLARIFY_VIBES, GET_FORTUNE,
    GET_INITIAL_VIBE, UPDATE_STATE,
};
use crate::core::config::Config;
use crate::core::session::VibeSession;
use crate::error::{Result, VibesError};

/// The four calls the client makes against the remote service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VibesApi: Send + Sync {
    /// Fetch the caller's current session
    async fn get_initial_vibe(&self) -> Result<VibeSession>;

    /// Ask for a new fortune
    async fn get_fortune(&self) -> Result<String>;

    /// Ask a question about `fortune`, returning the answer
    async fn clarify_vibes(&self, question: &str, fortune: &str) -> Result<String>;

    /// Persist the session. The server's reply is returned as-is.
    async fn update_state(&self, session: &VibeSession) -> Result<serde_json::Value>;
}

/// `reqwest`-backed implementation of [`VibesApi`]
#[derive(Debug, Clone)]
pub struct VibesClient {
    client: Client,
    base: Url,
}

impl VibesClient {
    /// Create a client rooted at `base` (any path prefix is kept)
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base()?, config.request_timeout())
    }

    /// Base URL the endpoints are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");

        let response = self.client.get(url).send().await?;
        let response = ensure_success(path, response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");

        let response = self.client.post(url).json(body).send().await?;
        let response = ensure_success(path, response).await?;
        Ok(response.json().await?)
    }
}

/// Turn non-2xx responses into [`VibesError::Api`]
async fn ensure_success(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(VibesError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl VibesApi for VibesClient {
    async fn get_initial_vibe(&self) -> Result<VibeSession> {
        self.get_json(GET_INITIAL_VIBE).await
    }

    async fn get_fortune(&self) -> Result<String> {
        let response: FortuneResponse = self.get_json(GET_FORTUNE).await?;
        Ok(response.fortune)
    }

    async fn clarify_vibes(&self, question: &str, fortune: &str) -> Result<String> {
        let request = ClarifyRequest {
            question: question.to_string(),
            fortune: fortune.to_string(),
        };
        let response: ClarifyResponse = self.post_json(CLARIFY_VIBES, &request).await?;
        Ok(response.answer)
    }

    async fn update_state(&self, session: &VibeSession) -> Result<serde_json::Value> {
        self.post_json(UPDATE_STATE, session).await
    }
}
