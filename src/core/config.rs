mod parsing;
mod settings;
mod types;

pub(crate) use types::{
    ApiSettings, ConfigError, Environment, RuntimeSettings, S3Settings, Settings,
    TelemetrySettings, UploadBackend, UploadSettings,
};
