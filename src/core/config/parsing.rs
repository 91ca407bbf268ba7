use std::env;

use super::types::{ConfigError, Environment, UploadBackend};

pub(super) const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] =
    &["pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "odt", "txt"];

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_positive_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    let parsed = parse_u64(field, value.clone())?;
    if parsed == 0 {
        return Err(ConfigError::InvalidValue { field, value });
    }
    Ok(parsed)
}

pub(super) fn parse_string_list(value: Option<String>, defaults: &[&str]) -> Vec<String> {
    match value {
        Some(raw) => raw
            .split(',')
            .map(|item| item.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|item| !item.is_empty())
            .collect(),
        None => defaults.iter().map(|item| item.to_string()).collect(),
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

pub(super) fn parse_upload_backend(value: String) -> Result<UploadBackend, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "http" => Ok(UploadBackend::Http),
        "s3" => Ok(UploadBackend::S3),
        _ => Err(ConfigError::InvalidValue { field: "COURSEWORK_UPLOAD_BACKEND", value }),
    }
}

pub(super) fn parse_base_url(field: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

pub(super) fn is_supported_document_extension(extension: &str) -> bool {
    DEFAULT_DOCUMENT_EXTENSIONS.contains(&extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_variants() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn parse_environment_variants() {
        assert_eq!(parse_environment(Some("prod".to_string())), Environment::Production);
        assert_eq!(parse_environment(Some("staging".to_string())), Environment::Staging);
        assert_eq!(parse_environment(Some("testing".to_string())), Environment::Test);
        assert_eq!(parse_environment(None), Environment::Development);
    }

    #[test]
    fn parse_string_list_normalizes_extensions() {
        let parsed = parse_string_list(Some(".PDF, docx,,".to_string()), &["txt"]);
        assert_eq!(parsed, vec!["pdf".to_string(), "docx".to_string()]);
        assert_eq!(parse_string_list(None, &["txt"]), vec!["txt".to_string()]);
    }

    #[test]
    fn parse_upload_backend_rejects_unknown() {
        assert_eq!(parse_upload_backend("S3".to_string()).expect("s3"), UploadBackend::S3);
        assert!(parse_upload_backend("ftp".to_string()).is_err());
    }

    #[test]
    fn parse_base_url_trims_trailing_slash() {
        let url = parse_base_url("COURSEWORK_API_BASE_URL", "https://lms.example.com/api/".into())
            .expect("url");
        assert_eq!(url, "https://lms.example.com/api");
        assert!(parse_base_url("COURSEWORK_API_BASE_URL", "not a url".into()).is_err());
    }
}
