use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::http::{read_json, send, ServiceEndpoint};
use super::{BinaryStore, ClientError};
use crate::core::config::Settings;
use crate::schemas::UploadedBinary;
use crate::services::drafts::LocalFile;

/// Uploads through the submission service's `POST /uploads` endpoint.
#[derive(Debug, Clone)]
pub struct HttpBinaryStore {
    endpoint: ServiceEndpoint,
}

impl HttpBinaryStore {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Ok(Self { endpoint: ServiceEndpoint::from_settings(settings)? })
    }

    pub(crate) fn with_endpoint(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl BinaryStore for HttpBinaryStore {
    async fn upload_binary(&self, file: &LocalFile) -> Result<UploadedBinary, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|err| ClientError::InvalidInput(format!("invalid content type: {err}")))?;
        let form = Form::new().part("file", part);

        let response = send(self.endpoint.post(self.endpoint.url(&["uploads"])).multipart(form)).await?;
        read_json(response).await
    }
}
