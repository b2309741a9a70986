use std::net::SocketAddr;
use std::str::FromStr;

/// Application-level constants
pub const APP_NAME: &str = "Fundex";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_GST_API_URL: &str = "https://sheet.gstincheck.co.in/check";
/// Registry lookups give up after 5 seconds and fall back to format-only acceptance.
const DEFAULT_GST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OCR_MODEL: &str = "llama3.2-vision";
const DEFAULT_OCR_TIMEOUT_SECS: u64 = 120;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,fundex_lib=debug,tower_http=info"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct FundexConfig {
    pub bind_addr: SocketAddr,
    pub gst_api_url: String,
    /// No key means no registry: GSTINs are accepted on format alone.
    pub gst_api_key: Option<String>,
    pub gst_timeout_secs: u64,
    pub ollama_url: String,
    pub ocr_model: String,
    pub ocr_timeout_secs: u64,
}

impl FundexConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            bind_addr: parse_var(
                "FUNDEX_BIND_ADDR",
                get("FUNDEX_BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR),
            )?,
            gst_api_url: get("FUNDEX_GST_API_URL")
                .unwrap_or_else(|| DEFAULT_GST_API_URL.to_string()),
            gst_api_key: get("FUNDEX_GST_API_KEY"),
            gst_timeout_secs: match get("FUNDEX_GST_TIMEOUT_SECS") {
                Some(v) => parse_secs("FUNDEX_GST_TIMEOUT_SECS", &v)?,
                None => DEFAULT_GST_TIMEOUT_SECS,
            },
            ollama_url: get("FUNDEX_OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ocr_model: get("FUNDEX_OCR_MODEL").unwrap_or_else(|| DEFAULT_OCR_MODEL.to_string()),
            ocr_timeout_secs: match get("FUNDEX_OCR_TIMEOUT_SECS") {
                Some(v) => parse_secs("FUNDEX_OCR_TIMEOUT_SECS", &v)?,
                None => DEFAULT_OCR_TIMEOUT_SECS,
            },
        })
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    let secs: u64 = parse_var(var, value)?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    Ok(secs)
}
