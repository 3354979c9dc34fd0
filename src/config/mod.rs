use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::upload::RetryPolicy;
use crate::domain::model::SftpTarget;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};

/// 管道設定：一律來自環境變數，憑證絕不寫死在程式裡
#[derive(Clone)]
pub struct PipelineConfig {
    pub api_url: String,
    pub sftp_host: String,
    pub sftp_port: u16,
    pub sftp_user: String,
    pub sftp_password: String,
    pub remote_file_path: String,
    pub upload_retries: u32,
    pub upload_retry_delay: Duration,
    pub log_file: PathBuf,
    pub log_json: bool,
}

impl PipelineConfig {
    /// Reads the full configuration from the environment. Required
    /// variables must be present and non-blank; the retry, delay, and
    /// logging knobs fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let sftp_port = {
            let raw = require_env("SFTP_PORT")?;
            raw.trim()
                .parse()
                .map_err(|_| invalid("SFTP_PORT", &raw, "not a valid TCP port"))?
        };

        let log_json = match env::var("PIPELINE_LOG_FORMAT") {
            Ok(raw) => match raw.trim() {
                "json" => true,
                "text" | "" => false,
                other => {
                    return Err(invalid(
                        "PIPELINE_LOG_FORMAT",
                        other,
                        "expected 'text' or 'json'",
                    ))
                }
            },
            Err(_) => false,
        };

        Ok(Self {
            api_url: require_env("API_URL")?,
            sftp_host: require_env("SFTP_HOST")?,
            sftp_port,
            sftp_user: require_env("SFTP_USER")?,
            sftp_password: require_env("SFTP_PASSWORD")?,
            remote_file_path: require_env("REMOTE_FILE_PATH")?,
            upload_retries: parse_env("UPLOAD_RETRIES", 3)?,
            upload_retry_delay: Duration::from_secs(parse_env("UPLOAD_RETRY_DELAY", 5)?),
            log_file: PathBuf::from(
                env::var("PIPELINE_LOG_FILE").unwrap_or_else(|_| "pipeline.log".to_string()),
            ),
            log_json,
        })
    }

    pub fn sftp_target(&self) -> SftpTarget {
        SftpTarget {
            host: self.sftp_host.clone(),
            port: self.sftp_port,
            username: self.sftp_user.clone(),
            password: self.sftp_password.clone(),
            remote_path: self.remote_file_path.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.upload_retries,
            delay: self.upload_retry_delay,
        }
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<()> {
        validate_url("API_URL", &self.api_url)?;
        validate_non_empty_string("SFTP_HOST", &self.sftp_host)?;
        validate_positive_number("SFTP_PORT", self.sftp_port as usize, 1)?;
        validate_non_empty_string("SFTP_USER", &self.sftp_user)?;
        validate_non_empty_string("SFTP_PASSWORD", &self.sftp_password)?;
        validate_path("REMOTE_FILE_PATH", &self.remote_file_path)?;
        validate_positive_number("UPLOAD_RETRIES", self.upload_retries as usize, 1)?;
        Ok(())
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_url", &self.api_url)
            .field("sftp_host", &self.sftp_host)
            .field("sftp_port", &self.sftp_port)
            .field("sftp_user", &self.sftp_user)
            .field("sftp_password", &"***")
            .field("remote_file_path", &self.remote_file_path)
            .field("upload_retries", &self.upload_retries)
            .field("upload_retry_delay", &self.upload_retry_delay)
            .field("log_file", &self.log_file)
            .field("log_json", &self.log_json)
            .finish()
    }
}

fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PipelineError::MissingConfigError {
            field: name.to_string(),
        }),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(name, &raw, "not a number")),
        Err(_) => Ok(default),
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
