//! Server configuration from environment variables.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use http::HeaderValue;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT".to_string(),
                reason: format!("expected 'pretty' or 'json', got '{}'", other),
            }),
        }
    }
}

/// Origins allowed by the CORS layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin.
    Any,
    /// An explicit list of origins.
    List(Vec<HeaderValue>),
}

impl FromStr for CorsOrigins {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "*" {
            return Ok(Self::Any);
        }

        let origins = s
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidValue {
                    name: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("'{}' is not a valid origin", origin),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS".to_string(),
                reason: "no origins given".to_string(),
            });
        }

        Ok(Self::List(origins))
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Server port to listen on.
    pub port: u16,
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// CORS allowed origins.
    pub cors_allowed_origins: CorsOrigins,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Serve the GraphiQL IDE on `GET /graphql`.
    pub graphiql_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cors_allowed_origins: CorsOrigins::List(vec![HeaderValue::from_static(
                "http://localhost:4200",
            )]),
            request_timeout: Duration::from_secs(30),
            graphiql_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `HOST`: Bind address (default: 0.0.0.0)
    /// - `PORT`: Server port (default: 5000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "pretty" or "json" (default: "pretty")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "http://localhost:4200")
    /// - `REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `GRAPHIQL_ENABLED`: Serve GraphiQL (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_var(&lookup, "HOST", defaults.host)?;
        let port = parse_var(&lookup, "PORT", defaults.port)?;
        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => value.parse()?,
            None => defaults.cors_allowed_origins,
        };

        let request_timeout = Duration::from_secs(parse_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?);

        let graphiql_enabled = match lookup("GRAPHIQL_ENABLED") {
            Some(value) => parse_bool("GRAPHIQL_ENABLED", &value)?,
            None => defaults.graphiql_enabled,
        };

        Ok(Self {
            host,
            port,
            log_level,
            log_format,
            cors_allowed_origins,
            request_timeout,
            graphiql_enabled,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("cannot parse '{}'", raw),
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("expected a boolean, got '{}'", raw),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.graphiql_enabled);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(
            config.cors_allowed_origins,
            CorsOrigins::List(vec![HeaderValue::from_static("http://localhost:4200")])
        );
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("GRAPHIQL_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.cors_allowed_origins, CorsOrigins::Any);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.graphiql_enabled);
    }

    #[test]
    fn test_cors_list_is_split_and_trimmed() {
        let origins: CorsOrigins = "http://a.test, http://b.test ,".parse().unwrap();
        assert_eq!(
            origins,
            CorsOrigins::List(vec![
                HeaderValue::from_static("http://a.test"),
                HeaderValue::from_static("http://b.test"),
            ])
        );
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = ServerConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(err.to_string().contains("LOG_FORMAT"));

        let err =
            ServerConfig::from_lookup(lookup(&[("CORS_ALLOWED_ORIGINS", "bad\norigin")]))
                .unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOWED_ORIGINS"));

        let err =
            ServerConfig::from_lookup(lookup(&[("GRAPHIQL_ENABLED", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("GRAPHIQL_ENABLED"));
    }
}
