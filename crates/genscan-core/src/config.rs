//! Configuration module
//!
//! Configuration is read once at startup into explicit structs that are passed
//! to the detector and the HTTP layer. Nothing reads the environment afterwards.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::validation::{mime_type_for_extension, validate_threshold};

pub const DEFAULT_INVOKE_URL: &str =
    "https://ai.api.nvidia.com/v1/cv/hive/ai-generated-image-detection";
pub const DEFAULT_ASSETS_URL: &str = "https://api.nvcf.nvidia.com/v2/nvcf/assets";
pub const DEFAULT_INLINE_LIMIT_BYTES: usize = 180_000;
pub const DEFAULT_ASSET_DESCRIPTION: &str = "Input Image";
pub const DEFAULT_THRESHOLD: f64 = 0.016;

const RESERVE_TIMEOUT_SECS: u64 = 30;
const TRANSFER_TIMEOUT_SECS: u64 = 300;
const SCORE_TIMEOUT_SECS: u64 = 120;
const REQUEST_TIMEOUT_SECS: u64 = 360;
const MAX_FILE_SIZE_MB: usize = 20;
const SERVER_PORT: u16 = 8000;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}

/// Vendor endpoints, credential, and timeouts used by the detector.
#[derive(Clone)]
pub struct DetectorConfig {
    pub api_key: String,
    pub invoke_url: String,
    pub assets_url: String,
    /// Encoded payloads at or above this length go through asset upload.
    pub inline_limit_bytes: usize,
    pub asset_description: String,
    pub reserve_timeout: Duration,
    pub transfer_timeout: Duration,
    pub score_timeout: Duration,
    /// Caller-side budget for one whole detection.
    pub request_timeout: Duration,
}

impl DetectorConfig {
    /// Defaults for everything except the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            invoke_url: DEFAULT_INVOKE_URL.to_string(),
            assets_url: DEFAULT_ASSETS_URL.to_string(),
            inline_limit_bytes: DEFAULT_INLINE_LIMIT_BYTES,
            asset_description: DEFAULT_ASSET_DESCRIPTION.to_string(),
            reserve_timeout: Duration::from_secs(RESERVE_TIMEOUT_SECS),
            transfer_timeout: Duration::from_secs(TRANSFER_TIMEOUT_SECS),
            score_timeout: Duration::from_secs(SCORE_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("NVIDIA_API_KEY must not be empty"));
        }

        for (name, url) in [
            ("DETECTOR_INVOKE_URL", &self.invoke_url),
            ("DETECTOR_ASSETS_URL", &self.assets_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        if self.inline_limit_bytes == 0 {
            return Err(anyhow::anyhow!(
                "DETECTOR_INLINE_LIMIT_BYTES must be greater than zero"
            ));
        }

        Ok(())
    }
}

// Keeps the credential out of logs and panic messages.
impl fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("api_key", &"<redacted>")
            .field("invoke_url", &self.invoke_url)
            .field("assets_url", &self.assets_url)
            .field("inline_limit_bytes", &self.inline_limit_bytes)
            .field("asset_description", &self.asset_description)
            .field("reserve_timeout", &self.reserve_timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .field("score_timeout", &self.score_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Input acceptance rules
#[derive(Clone, Debug)]
pub struct InputConfig {
    pub allowed_extensions: Vec<String>,
    pub default_threshold: f64,
    pub max_file_size_bytes: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            default_threshold: DEFAULT_THRESHOLD,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub detector: DetectorConfig,
    pub input: InputConfig,
}

impl Config {
    /// Build a config from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("NVIDIA_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("NVIDIA_API_KEY must be set"))?;

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            port: parse_or(&lookup, "PORT", SERVER_PORT)?,
            cors_origins,
            environment,
        };

        let mut detector = DetectorConfig::new(api_key);
        if let Some(url) = lookup("DETECTOR_INVOKE_URL") {
            detector.invoke_url = url;
        }
        if let Some(url) = lookup("DETECTOR_ASSETS_URL") {
            detector.assets_url = url;
        }
        if let Some(description) = lookup("DETECTOR_ASSET_DESCRIPTION") {
            detector.asset_description = description;
        }
        detector.inline_limit_bytes = parse_or(
            &lookup,
            "DETECTOR_INLINE_LIMIT_BYTES",
            DEFAULT_INLINE_LIMIT_BYTES,
        )?;
        detector.reserve_timeout = Duration::from_secs(parse_or(
            &lookup,
            "DETECTOR_RESERVE_TIMEOUT_SECS",
            RESERVE_TIMEOUT_SECS,
        )?);
        detector.transfer_timeout = Duration::from_secs(parse_or(
            &lookup,
            "DETECTOR_TRANSFER_TIMEOUT_SECS",
            TRANSFER_TIMEOUT_SECS,
        )?);
        detector.score_timeout = Duration::from_secs(parse_or(
            &lookup,
            "DETECTOR_SCORE_TIMEOUT_SECS",
            SCORE_TIMEOUT_SECS,
        )?);
        detector.request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "DETECT_REQUEST_TIMEOUT_SECS",
            REQUEST_TIMEOUT_SECS,
        )?);

        let allowed_extensions = lookup("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| "jpg,jpeg,png".to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb: usize = parse_or(&lookup, "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!("MAX_FILE_SIZE_MB is too large (got {})", max_file_size_mb)
            })?;

        let input = InputConfig {
            allowed_extensions,
            default_threshold: parse_or(&lookup, "DEFAULT_THRESHOLD", DEFAULT_THRESHOLD)?,
            max_file_size_bytes,
        };

        Ok(Config {
            server,
            detector,
            input,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.server.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.detector.validate()?;

        validate_threshold(self.input.default_threshold)
            .map_err(|e| anyhow::anyhow!("DEFAULT_THRESHOLD is invalid: {}", e))?;

        if self.input.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if let Some(unknown) = self
            .input
            .allowed_extensions
            .iter()
            .find(|ext| mime_type_for_extension(ext).is_none())
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS contains '{}', which has no known image MIME type",
                unknown
            ));
        }

        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number (got '{}')", key, raw)),
        None => Ok(default),
    }
}
