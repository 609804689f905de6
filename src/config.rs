// Configuration layer
// -------------------
// Settings come from an optional file (TOML, or JSON when the extension
// says so) with environment variables layered on top. Nothing reaches the
// HTTP layer until `RawApiSettings::validate` has produced an
// `ApiSettings`, so a missing value can never trigger a request.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "RLE_CLIENT_CONFIG";

const LOCAL_CANDIDATES: [&str; 2] = ["appsettings.toml", "appsettings.json"];

const ENV_BASE_URL: &str = "RLE_API_BASE_URL";
const ENV_AUTH_ENDPOINT: &str = "RLE_API_AUTH_ENDPOINT";
const ENV_ENCODE_ENDPOINT: &str = "RLE_API_ENCODE_ENDPOINT";
const ENV_EMAIL: &str = "RLE_API_EMAIL";
const ENV_PASSWORD: &str = "RLE_API_PASSWORD";
const ENV_ACCEPT_INVALID_CERTS: &str = "RLE_API_ACCEPT_INVALID_CERTS";

/// Validated, immutable settings for one run.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub auth_endpoint: String,
    pub encode_endpoint: String,
    pub credentials: Credentials,
    /// Allow self-signed certificates (local development servers).
    pub accept_invalid_certificates: bool,
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("encode_endpoint", &self.encode_endpoint)
            .field("credentials", &self.credentials)
            .field("accept_invalid_certificates", &self.accept_invalid_certificates)
            .finish()
    }
}

impl ApiSettings {
    /// Locate, parse, overlay and validate settings from the process
    /// environment. See `locate_config_file` for the lookup order.
    pub fn load() -> Result<Self, ConfigError> {
        let mut raw = match locate_config_file()? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings file");
                RawApiSettings::from_path(&path)?
            }
            None => {
                tracing::debug!("no settings file found, using environment only");
                RawApiSettings::default()
            }
        };
        raw.apply_overrides(|key| std::env::var(key).ok());
        raw.validate()
    }

    pub fn auth_url(&self) -> String {
        join_url(&self.base_url, &self.auth_endpoint)
    }

    pub fn encode_url(&self) -> String {
        join_url(&self.base_url, &self.encode_endpoint)
    }
}

/// Settings as read from a file, before validation. Every field is
/// optional here; `validate` decides what is missing.
#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawApiSettings {
    pub base_url: Option<String>,
    pub auth_endpoint: Option<String>,
    pub encode_endpoint: Option<String>,
    #[serde(default)]
    pub credentials: RawCredentials,
    pub accept_invalid_certificates: Option<bool>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCredentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Top-level shape of a settings file: everything lives under `ApiSettings`.
#[derive(Default, Deserialize)]
struct SettingsFile {
    #[serde(rename = "ApiSettings", default)]
    api_settings: RawApiSettings,
}

impl RawApiSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str::<SettingsFile>(content)
            .map(|file| file.api_settings)
            .map_err(|e| e.to_string())
    }

    pub fn from_json_str(content: &str) -> Result<Self, String> {
        serde_json::from_str::<SettingsFile>(content)
            .map(|file| file.api_settings)
            .map_err(|e| e.to_string())
    }

    /// Overlay values from `lookup` (normally `std::env::var`). Only keys
    /// the lookup returns replace file values.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overlay = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        };
        overlay(&mut self.base_url, ENV_BASE_URL);
        overlay(&mut self.auth_endpoint, ENV_AUTH_ENDPOINT);
        overlay(&mut self.encode_endpoint, ENV_ENCODE_ENDPOINT);
        overlay(&mut self.credentials.email, ENV_EMAIL);
        overlay(&mut self.credentials.password, ENV_PASSWORD);

        if let Some(flag) = lookup(ENV_ACCEPT_INVALID_CERTS) {
            self.accept_invalid_certificates = Some(parse_flag(&flag));
        }
    }

    /// Check that all five required values are present and non-blank and
    /// that the base URL is an absolute http(s) URI.
    pub fn validate(self) -> Result<ApiSettings, ConfigError> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, name: &'static str| -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let base_url = take(self.base_url, "ApiSettings.BaseUrl");
        let auth_endpoint = take(self.auth_endpoint, "ApiSettings.AuthEndpoint");
        let encode_endpoint = take(self.encode_endpoint, "ApiSettings.EncodeEndpoint");
        let email = take(self.credentials.email, "ApiSettings.Credentials.Email");
        let password = take(self.credentials.password, "ApiSettings.Credentials.Password");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        check_base_url(&base_url)?;

        Ok(ApiSettings {
            base_url,
            auth_endpoint,
            encode_endpoint,
            credentials: Credentials { email, password },
            accept_invalid_certificates: self.accept_invalid_certificates.unwrap_or(false),
        })
    }
}

/// Find the settings file: `$RLE_CLIENT_CONFIG` (must exist when set),
/// then `./appsettings.toml`, `./appsettings.json`, then the per-user
/// config directory.
pub fn locate_config_file() -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(explicit);
        if !path.is_file() {
            return Err(ConfigError::Read {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
                path,
            });
        }
        return Ok(Some(path));
    }

    let user_file = dirs::config_dir().map(|dir| dir.join("rle-client").join("appsettings.toml"));
    let found = LOCAL_CANDIDATES
        .into_iter()
        .map(PathBuf::from)
        .chain(user_file)
        .find(|path| path.is_file());
    Ok(found)
}

fn check_base_url(base_url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };
    let url = reqwest::Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("not an absolute URI"));
    }
    Ok(())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// `https://host/` + `api/x` and `https://host` + `/api/x` both give
/// `https://host/api/x`.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
