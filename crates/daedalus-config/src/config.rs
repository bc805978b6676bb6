//! Main configuration types.
//!
//! This module provides the top-level [`DaedalusConfig`] struct and its builder.

use http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::{ApiConfig, ConfigError, DocsConfig, LoggingConfig, ResponseConfig, RoutingConfig};

/// Complete dispatcher configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert_eq!(config.docs.path, "/swagger.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// API metadata.
    #[serde(default)]
    pub api: ApiConfig,

    /// Documentation endpoint.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Path matching.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Response shaping.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaedalusConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> DaedalusConfigBuilder {
        DaedalusConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The API title or version is empty
    /// - `api.base_url` is set but empty
    /// - `docs.path` does not start with `/`
    /// - A default response header name or value is not valid HTTP
    /// - The log filter directive does not parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("api.title", "must not be empty"));
        }
        if self.api.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("api.version", "must not be empty"));
        }
        if matches!(&self.api.base_url, Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::invalid_value("api.base_url", "must not be empty when set"));
        }

        if !self.docs.path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.path",
                format!("must start with '/': {}", self.docs.path),
            ));
        }

        for (name, value) in &self.response.default_headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    "response.default_headers",
                    format!("invalid header name: {name}"),
                ));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::invalid_value(
                    "response.default_headers",
                    format!("invalid value for header {name}"),
                ));
            }
        }

        if self.logging.enabled {
            daedalus_telemetry::logging::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs. Routing stays on prefix
    /// matching.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::{DaedalusConfig, LogFormat};
    ///
    /// let config = DaedalusConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = daedalus_telemetry::LogFormat::Pretty;
        config
    }

    /// Deployed preset: JSON logs at info.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = daedalus_telemetry::LogFormat::Json;
        config
    }
}

/// Builder for [`DaedalusConfig`].
#[derive(Debug, Default)]
pub struct DaedalusConfigBuilder {
    api: Option<ApiConfig>,
    docs: Option<DocsConfig>,
    routing: Option<RoutingConfig>,
    response: Option<ResponseConfig>,
    logging: Option<LoggingConfig>,
}

impl DaedalusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API section.
    #[must_use]
    pub fn api(mut self, api: ApiConfig) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the docs section.
    #[must_use]
    pub fn docs(mut self, docs: DocsConfig) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Set the routing section.
    #[must_use]
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the response section.
    #[must_use]
    pub fn response(mut self, response: ResponseConfig) -> Self {
        self.response = Some(response);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> DaedalusConfig {
        DaedalusConfig {
            api: self.api.unwrap_or_default(),
            docs: self.docs.unwrap_or_default(),
            routing: self.routing.unwrap_or_default(),
            response: self.response.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DaedalusConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogFormat, MatchModeSetting};
    use indexmap::IndexMap;

    #[test]
    fn test_default_config() {
        let config = DaedalusConfig::default();
        assert_eq!(config.api.title, "Daedalus API");
        assert_eq!(config.docs.path, "/swagger.json");
        assert_eq!(config.routing.match_mode, MatchModeSetting::Prefix);
        assert_eq!(config.response.default_headers.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sections() {
        let config = DaedalusConfig::builder()
            .api(ApiConfig {
                title: "Example pet API".to_string(),
                base_url: Some("https://pets.example.com".to_string()),
                ..Default::default()
            })
            .routing(RoutingConfig {
                match_mode: MatchModeSetting::Strict,
            })
            .build();

        assert_eq!(config.api.title, "Example pet API");
        assert_eq!(config.routing.match_mode, MatchModeSetting::Strict);
        assert_eq!(config.docs, DocsConfig::default());
    }

    #[test]
    fn test_validate_docs_path() {
        let result = DaedalusConfig::builder()
            .docs(DocsConfig {
                path: "swagger.json".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("docs.path"));
    }

    #[test]
    fn test_validate_empty_title() {
        let result = DaedalusConfig::builder()
            .api(ApiConfig {
                title: "  ".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("api.title"));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let result = DaedalusConfig::builder()
            .api(ApiConfig {
                base_url: Some(String::new()),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("api.base_url"));
    }

    #[test]
    fn test_validate_header_name() {
        let mut headers = IndexMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let result = DaedalusConfig::builder()
            .response(ResponseConfig {
                default_headers: headers,
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("bad header"));
    }

    #[test]
    fn test_validate_log_level() {
        let result = DaedalusConfig::builder()
            .logging(LoggingConfig {
                level: "daedalus=loud".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_presets() {
        let dev = DaedalusConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(dev.routing.match_mode, MatchModeSetting::Prefix);

        let prod = DaedalusConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [api]
            title = "Example pet API"
            base_url = "https://pets.example.com"

            [docs.security.api_key]
            header = "x-api-key"

            [response.default_headers]
            "access-control-allow-origin" = "https://app.example.com"
        "#;

        let config: DaedalusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.title, "Example pet API");
        assert_eq!(config.api.version, "1.0.0");
        assert!(config.docs.security.api_key.is_some());
        assert_eq!(config.response.default_headers.len(), 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml_str = r#"
            [docs]
            path = "/swagger.json"
            ui = true
        "#;

        let result: Result<DaedalusConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let config = DaedalusConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[docs]"));
        assert!(toml_str.contains("[routing]"));
    }
}
