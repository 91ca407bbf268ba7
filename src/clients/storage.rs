use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{BinaryStore, ClientError};
use crate::core::config::Settings;
use crate::schemas::{FileType, UploadedBinary};
use crate::services::drafts::LocalFile;

/// Puts uploaded documents straight into an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3BinaryStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3BinaryStore {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let s3 = settings.s3();
        if s3.access_key.is_empty() || s3.secret_key.is_empty() {
            anyhow::bail!("S3 upload backend selected but S3 credentials are not configured");
        }

        let creds = Credentials::new(
            s3.access_key.clone(),
            s3.secret_key.clone(),
            None,
            None,
            "coursework-static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(s3.endpoint.clone())
            .region(aws_config::Region::new(s3.region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(true).build();
        let client = Client::from_conf(config);

        let public_base_url = s3.public_base_url.clone().unwrap_or_else(|| {
            format!("{}/{}", s3.endpoint.trim_end_matches('/'), s3.bucket)
        });

        Ok(Self { client, bucket: s3.bucket.clone(), public_base_url })
    }
}

#[async_trait]
impl BinaryStore for S3BinaryStore {
    async fn upload_binary(&self, file: &LocalFile) -> Result<UploadedBinary, ClientError> {
        let file_type = file
            .extension()
            .and_then(|extension| FileType::from_extension(&extension))
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("unsupported document type: {}", file.file_name))
            })?;

        let key = object_key(file);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&file.content_type)
            .body(ByteStream::from(file.bytes.clone()))
            .send()
            .await
            .map_err(|err| ClientError::Transport(DisplayErrorContext(&err).to_string()))?;

        tracing::debug!(key = %key, size = file.size(), "Stored document in object storage");

        Ok(UploadedBinary {
            resource_link: format!("{}/{}", self.public_base_url, key),
            title: file.file_name.clone(),
            file_type,
        })
    }
}

/// `uploads/{content hash prefix}/{uuid}_{sanitized name}`
pub(crate) fn object_key(file: &LocalFile) -> String {
    let hash = hex::encode(Sha256::digest(&file.bytes));
    format!("uploads/{}/{}_{}", &hash[..16], Uuid::new_v4(), sanitized_filename(&file.file_name))
}

pub(crate) fn sanitized_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
