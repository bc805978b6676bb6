//! Configuration section types.

use daedalus_core::MatchMode;
use daedalus_telemetry::{LogConfig, LogFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// API metadata section.
///
/// Feeds the document's `info` block and its single server entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API description.
    #[serde(default)]
    pub description: Option<String>,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Public base URL of the deployment.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: None,
            version: default_version(),
            base_url: None,
        }
    }
}

fn default_title() -> String {
    "Daedalus API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// API key carried in a request header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiKeySchemeConfig {
    /// Scheme name in `components.securitySchemes`.
    #[serde(default = "default_api_key_scheme")]
    pub name: String,

    /// Header carrying the key.
    #[serde(default = "default_api_key_header")]
    pub header: String,
}

impl Default for ApiKeySchemeConfig {
    fn default() -> Self {
        Self {
            name: default_api_key_scheme(),
            header: default_api_key_header(),
        }
    }
}

fn default_api_key_scheme() -> String {
    "ApiKeyAuth".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

/// HTTP bearer authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BearerSchemeConfig {
    /// Scheme name in `components.securitySchemes`.
    #[serde(default = "default_bearer_scheme")]
    pub name: String,

    /// Token format hint, e.g. `JWT`.
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for BearerSchemeConfig {
    fn default() -> Self {
        Self {
            name: default_bearer_scheme(),
            format: None,
        }
    }
}

fn default_bearer_scheme() -> String {
    "BearerAuth".to_string()
}

/// Documented security schemes. Each one gates every operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// API key scheme.
    #[serde(default)]
    pub api_key: Option<ApiKeySchemeConfig>,

    /// Bearer scheme.
    #[serde(default)]
    pub bearer: Option<BearerSchemeConfig>,
}

/// Documentation endpoint section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Whether the reserved path serves the document.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Reserved path; any request path starting with it gets the document.
    #[serde(default = "default_docs_path")]
    pub path: String,

    /// The document's `openapi` field.
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,

    /// Security schemes.
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_docs_path(),
            openapi_version: default_openapi_version(),
            security: SecurityConfig::default(),
        }
    }
}

fn default_docs_path() -> String {
    "/swagger.json".to_string()
}

fn default_openapi_version() -> String {
    "3.0.0".to_string()
}

/// Path matching mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchModeSetting {
    /// Templates match path prefixes.
    #[default]
    Prefix,
    /// Templates match whole paths.
    Strict,
}

impl From<MatchModeSetting> for MatchMode {
    fn from(setting: MatchModeSetting) -> Self {
        match setting {
            MatchModeSetting::Prefix => Self::Prefix,
            MatchModeSetting::Strict => Self::Strict,
        }
    }
}

/// Routing section.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// How templates match request paths.
    #[serde(default)]
    pub match_mode: MatchModeSetting,
}

/// Response shaping section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Headers on every response, success or error. Handler headers win.
    #[serde(default = "default_response_headers")]
    pub default_headers: IndexMap<String, String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_headers: default_response_headers(),
        }
    }
}

fn default_response_headers() -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    headers.insert("access-control-allow-origin".to_string(), "*".to_string());
    headers.insert("access-control-allow-credentials".to_string(), "true".to_string());
    headers
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is installed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// The telemetry crate's view of this section.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            file_line_info: self.format == LogFormat::Pretty,
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
