use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_https_port")]
    pub https_port: u16,
    #[serde(default = "default_enable_http")]
    pub enable_http: bool,
    #[serde(default)]
    pub enable_https: bool,
    pub ssl_cert_path: Option<String>,
    pub ssl_key_path: Option<String>,
    /// Directory holding the wasm-pack output served under `/pkg`
    #[serde(default = "default_pkg_dir")]
    pub pkg_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_https_port() -> u16 {
    3443
}

fn default_enable_http() -> bool {
    true
}

fn default_pkg_dir() -> String {
    "client/pkg".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            https_port: default_https_port(),
            enable_http: default_enable_http(),
            enable_https: false,
            ssl_cert_path: None,
            ssl_key_path: None,
            pkg_dir: default_pkg_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

impl ServerConfig {
    pub fn ip_addr(&self) -> std::net::IpAddr {
        self.host.parse().unwrap_or_else(|e| {
            tracing::warn!("Failed to parse host '{}': {}. Using 0.0.0.0", self.host, e);
            [0, 0, 0, 0].into()
        })
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("procam_config")
    }

    /// Read `path` (any extension the config crate knows, optional) and
    /// `PROCAM__SECTION__KEY` environment overrides
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PROCAM").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config file: {}. Using defaults.", e);
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.http_port, 3000);
        assert_eq!(config.server.https_port, 3443);
        assert!(config.server.enable_http);
        assert!(!config.server.enable_https);
        assert_eq!(config.server.pkg_dir, "client/pkg");
        assert_eq!(config.logging.tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nhttp_port = 8080\nenable_https = true\n\n[logging]\nlevel = \"DEBUG\"").unwrap();

        let path = file.path().with_extension("");
        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert!(config.server.enable_https);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from("/nonexistent/procam_config").unwrap();
        assert_eq!(config.server.https_port, 3443);
    }

    #[test]
    fn test_bad_host_falls_back() {
        let server = ServerConfig {
            host: "not-an-ip".to_string(),
            ..Default::default()
        };
        assert_eq!(server.ip_addr(), std::net::IpAddr::from([0, 0, 0, 0]));
    }
}
