use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) upload: UploadSettings,
    pub(super) s3: S3Settings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) timeout_seconds: u64,
    pub(crate) connect_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct UploadSettings {
    pub(crate) backend: UploadBackend,
    pub(crate) max_upload_size_mb: u64,
    pub(crate) allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct S3Settings {
    pub(crate) endpoint: String,
    pub(crate) access_key: String,
    pub(crate) secret_key: String,
    pub(crate) bucket: String,
    pub(crate) region: String,
    pub(crate) public_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Where `UploadBinary` requests are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UploadBackend {
    /// Multipart upload endpoint of the submission service.
    Http,
    /// Direct put into an S3-compatible bucket.
    S3,
}

impl UploadBackend {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            UploadBackend::Http => "http",
            UploadBackend::S3 => "s3",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}
