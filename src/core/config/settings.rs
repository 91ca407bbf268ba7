use super::parsing::{
    env_optional, env_or_default, is_supported_document_extension, parse_base_url, parse_bool,
    parse_environment, parse_positive_u64, parse_string_list, parse_u64, parse_upload_backend,
    DEFAULT_DOCUMENT_EXTENSIONS,
};
use super::types::{
    ApiSettings, ConfigError, RuntimeSettings, S3Settings, Settings, TelemetrySettings,
    UploadBackend, UploadSettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(env_optional("COURSEWORK_ENV"));
        let strict_config = env_optional("COURSEWORK_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let base_url = parse_base_url(
            "COURSEWORK_API_BASE_URL",
            env_or_default("COURSEWORK_API_BASE_URL", "http://localhost:8000/api/v1"),
        )?;
        let token = env_or_default("COURSEWORK_API_TOKEN", "");
        let timeout_seconds = parse_positive_u64(
            "COURSEWORK_API_TIMEOUT_SECONDS",
            env_or_default("COURSEWORK_API_TIMEOUT_SECONDS", "60"),
        )?;
        let connect_timeout_seconds = parse_positive_u64(
            "COURSEWORK_API_CONNECT_TIMEOUT_SECONDS",
            env_or_default("COURSEWORK_API_CONNECT_TIMEOUT_SECONDS", "20"),
        )?;

        let backend = parse_upload_backend(env_or_default("COURSEWORK_UPLOAD_BACKEND", "http"))?;
        let max_upload_size_mb = parse_u64(
            "COURSEWORK_MAX_UPLOAD_SIZE_MB",
            env_or_default("COURSEWORK_MAX_UPLOAD_SIZE_MB", "20"),
        )?;
        let allowed_extensions = parse_string_list(
            env_optional("COURSEWORK_ALLOWED_DOCUMENT_EXTENSIONS"),
            DEFAULT_DOCUMENT_EXTENSIONS,
        );

        let s3_endpoint = env_or_default("COURSEWORK_S3_ENDPOINT", "http://localhost:9000");
        let s3_access_key = env_or_default("COURSEWORK_S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("COURSEWORK_S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("COURSEWORK_S3_BUCKET", "coursework-submissions");
        let s3_region = env_or_default("COURSEWORK_S3_REGION", "us-east-1");
        let s3_public_base_url = env_optional("COURSEWORK_S3_PUBLIC_BASE_URL")
            .map(|value| value.trim_end_matches('/').to_string());

        let log_level = env_or_default("COURSEWORK_LOG_LEVEL", "info");
        let json = env_optional("COURSEWORK_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { base_url, token, timeout_seconds, connect_timeout_seconds },
            upload: UploadSettings { backend, max_upload_size_mb, allowed_extensions },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
                public_base_url: s3_public_base_url,
            },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn upload(&self) -> &UploadSettings {
        &self.upload
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "COURSEWORK_ALLOWED_DOCUMENT_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }
        for extension in &self.upload.allowed_extensions {
            if !is_supported_document_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "COURSEWORK_ALLOWED_DOCUMENT_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.upload.max_upload_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "COURSEWORK_MAX_UPLOAD_SIZE_MB",
                value: String::from("0"),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.api.token.is_empty() {
            return Err(ConfigError::MissingSecret("COURSEWORK_API_TOKEN"));
        }

        if self.upload.backend == UploadBackend::S3
            && (self.s3.access_key.is_empty() || self.s3.secret_key.is_empty())
        {
            return Err(ConfigError::MissingSecret("COURSEWORK_S3_ACCESS_KEY/COURSEWORK_S3_SECRET_KEY"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::{ConfigError, Environment, Settings, UploadBackend};
    use crate::test_support;

    #[test]
    fn load_uses_defaults() {
        let _guard = test_support::env_lock();
        test_support::clear_config_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.runtime().environment, Environment::Development);
        assert_eq!(settings.api().base_url, "http://localhost:8000/api/v1");
        assert_eq!(settings.upload().backend, UploadBackend::Http);
        assert_eq!(settings.upload().max_upload_size_mb, 20);
        assert!(settings.upload().allowed_extensions.iter().any(|ext| ext == "pdf"));
    }

    #[test]
    fn strict_mode_requires_api_token() {
        let _guard = test_support::env_lock();
        test_support::clear_config_env();
        std::env::set_var("COURSEWORK_ENV", "production");

        let err = Settings::load().expect_err("missing token");
        assert!(matches!(err, ConfigError::MissingSecret("COURSEWORK_API_TOKEN")));

        std::env::set_var("COURSEWORK_API_TOKEN", "token");
        std::env::set_var("COURSEWORK_UPLOAD_BACKEND", "s3");
        let err = Settings::load().expect_err("missing s3 keys");
        assert!(matches!(err, ConfigError::MissingSecret(_)));

        test_support::clear_config_env();
    }

    #[test]
    fn rejects_unsupported_extension() {
        let _guard = test_support::env_lock();
        test_support::clear_config_env();
        std::env::set_var("COURSEWORK_ALLOWED_DOCUMENT_EXTENSIONS", "pdf,exe");

        let err = Settings::load().expect_err("exe is not a document");
        assert!(matches!(err, ConfigError::InvalidValue { value, .. } if value == "exe"));

        test_support::clear_config_env();
    }
}
