//! Server configuration
//!
//! Values arrive through `cli` (flags with environment fallbacks) and are
//! validated here before any listener is opened.

use crate::error::StubError;
use crate::load::LoadOptions;
use crate::session::DEFAULT_MAX_SESSIONS;
use std::net::SocketAddr;

/// Listen address, host and port configured independently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ListenConfig {
    /// `host:port` as passed to the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log verbosity as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse `DEBUG`, `INFO`, `WARNING` or `ERROR`; anything else is `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "DEBUG" => LogLevel::Debug,
            "WARNING" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    /// `EnvFilter` directive for this level
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Fixed body returned by the HTTP responder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Json(String),
    Text(String),
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Text(String::new())
    }
}

impl ResponseBody {
    /// A non-empty `json` wins over `text` and must parse as JSON.
    pub fn from_flags(json: Option<String>, text: String) -> Result<Self, StubError> {
        match json {
            Some(json) if !json.is_empty() => {
                serde_json::from_str::<serde_json::Value>(&json).map_err(|e| {
                    StubError::InvalidConfiguration(format!("--json is not valid JSON: {}", e))
                })?;
                Ok(ResponseBody::Json(json))
            }
            _ => Ok(ResponseBody::Text(text)),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ResponseBody::Json(_) => "application/json",
            ResponseBody::Text(_) => "text/plain; charset=utf-8",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ResponseBody::Json(body) | ResponseBody::Text(body) => body,
        }
    }
}

/// Configuration of the socket and WebSocket servers
#[derive(Debug, Clone)]
pub struct PacedServerConfig {
    pub listen: ListenConfig,
    pub load: LoadOptions,
    /// Admission cap of the session registry
    pub max_sessions: usize,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for PacedServerConfig {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            load: LoadOptions::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            metrics_addr: None,
        }
    }
}

impl PacedServerConfig {
    pub fn validate(&self) -> Result<(), StubError> {
        if self.max_sessions == 0 {
            return Err(StubError::InvalidConfiguration(
                "max sessions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration of the fixed-body HTTP server
#[derive(Debug, Clone, Default)]
pub struct HttpServerConfig {
    pub listen: ListenConfig,
    pub body: ResponseBody,
    pub metrics_addr: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PacedServerConfig::default();
        assert_eq!(config.listen.host, "127.0.0.1");
        assert_eq!(config.listen.port, 8080);
        assert_eq!(config.listen.addr(), "127.0.0.1:8080");
        assert_eq!(config.max_sessions, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_sessions_rejected() {
        let config = PacedServerConfig {
            max_sessions: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StubError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_log_level_names() {
        assert_eq!(LogLevel::from_name("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("WARNING"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::from_name("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::Warning.directive(), "warn");
    }

    #[test]
    fn test_json_body_wins_over_text() {
        let body =
            ResponseBody::from_flags(Some(r#"{"status":"ok"}"#.to_string()), "hi".to_string())
                .unwrap();
        assert_eq!(body, ResponseBody::Json(r#"{"status":"ok"}"#.to_string()));
        assert_eq!(body.content_type(), "application/json");
    }

    #[test]
    fn test_empty_json_falls_back_to_text() {
        let body = ResponseBody::from_flags(Some(String::new()), "hello".to_string()).unwrap();
        assert_eq!(body.content(), "hello");
        assert_eq!(body.content_type(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_invalid_json_body_rejected() {
        let err = ResponseBody::from_flags(Some("{not json".to_string()), String::new());
        assert!(matches!(err, Err(StubError::InvalidConfiguration(_))));
    }
}
