use crate::constants::USER_AGENT;
use crate::error::FetchError;
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// JSON-over-HTTP client for the content-retrieval service.
///
/// Non-success statuses are classified into [`FetchError`] so callers can
/// tell transient failures from permanent ones.
#[derive(Debug, Clone)]
pub struct RetrievalHttpClient {
    client: Client,
    base_url: String,
}

impl RetrievalHttpClient {
    /// Builds a client whose requests time out after `timeout` unless overridden per call.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned + Debug, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Sending POST request to {}", url);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            error!("Failed to send POST request: {:?}", e);
            FetchError::from(e)
        })?;

        Self::handle_response(response).await
    }

    /// Same as [`post`](Self::post) with a request-specific timeout, for calls
    /// that legitimately outlast the default (interactive logins).
    #[instrument(skip(self, body))]
    pub async fn post_with_timeout<T: DeserializeOwned + Debug, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Sending POST request to {} with timeout {:?}", url, timeout);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned + Debug>(
        response: Response,
    ) -> Result<T, FetchError> {
        let status = response.status();
        let body_text = response.text().await?;

        debug!("Response Status: {}", status);

        if status.is_success() {
            let body: T = serde_json::from_str(&body_text)?;
            Ok(body)
        } else {
            error!(
                "Retrieval request failed. Status: {}, Body: {}",
                status, body_text
            );
            Err(FetchError::from_status(status, &body_text))
        }
    }
}
