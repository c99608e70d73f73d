use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ErrorEnvelope;
use thiserror::Error;
use tracing::warn;

/// Shown whenever the remote's error body carries no usable message.
pub const GENERIC_FAILURE: &str = "Request failed";

/// A request that did not produce the expected success response: the remote
/// rejected it, the transport failed, or the body could not be parsed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
}

impl RequestError {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    fn generic() -> Self {
        Self {
            message: GENERIC_FAILURE.to_string(),
        }
    }
}

/// Thin wrapper over outbound calls to the ledger service. One attempt per
/// invocation; the caller decides whether to re-invoke. No timeout beyond
/// what the transport itself imposes.
pub struct Gateway {
    http: Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(RequestError::transport)?;
        Self::parse(response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(RequestError::transport)?;
        Self::parse(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
        let status = response.status();
        if !status.is_success() {
            // Non-success bodies are expected to carry the error envelope;
            // anything else degrades to the generic message.
            let message = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => GENERIC_FAILURE.to_string(),
            };
            warn!(status = %status, %message, "ledger request rejected");
            return Err(RequestError { message });
        }

        response.json::<T>().await.map_err(|err| {
            warn!("failed to parse ledger response body: {err}");
            RequestError::generic()
        })
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
