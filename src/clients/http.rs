use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{extract_error_message, ClientError};
use crate::core::config::Settings;

/// Base URL, bearer token and a configured reqwest client, shared by the
/// submission and upload clients.
#[derive(Debug, Clone)]
pub(crate) struct ServiceEndpoint {
    client: Client,
    base_url: Url,
    token: String,
}

impl ServiceEndpoint {
    pub(crate) fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Transport(format!("failed to build HTTP client: {err}")))?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| ClientError::InvalidInput(format!("invalid base URL {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidInput(format!("invalid base URL {base_url}")));
        }

        Ok(Self { client, base_url, token: token.to_string() })
    }

    pub(crate) fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(
            &settings.api().base_url,
            &settings.api().token,
            Duration::from_secs(settings.api().timeout_seconds),
            Duration::from_secs(settings.api().connect_timeout_seconds),
        )
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.post(url))
    }

    pub(crate) fn put(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.put(url))
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.delete(url))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }
}

pub(crate) async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    builder.send().await.map_err(|err| ClientError::Transport(err.to_string()))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let raw_body = response.text().await.map_err(|err| ClientError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(status_error(status, &raw_body));
    }

    serde_json::from_str(&raw_body).map_err(|err| {
        ClientError::Decode(format!("status {status}: {err}: {raw_body}"))
    })
}

pub(crate) async fn read_error(response: Response) -> ClientError {
    let status = response.status();
    match response.text().await {
        Ok(raw_body) => status_error(status, &raw_body),
        Err(err) => ClientError::Transport(err.to_string()),
    }
}

pub(crate) fn status_error(status: StatusCode, raw_body: &str) -> ClientError {
    let message = serde_json::from_str::<Value>(raw_body)
        .ok()
        .and_then(|parsed| extract_error_message(&parsed))
        .or_else(|| Some(raw_body.trim().to_string()).filter(|body| !body.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown_error").to_string());

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        _ => ClientError::Rejected { status: status.as_u16(), message },
    }
}
