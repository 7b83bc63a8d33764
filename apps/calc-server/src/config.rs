//! Layered server configuration.
//!
//! Sources, lowest to highest precedence: compiled defaults, an optional YAML
//! file, `CALC__SECTION__KEY` environment variables, then CLI overrides.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CALC__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub calculator: CalculatorConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Requests running longer than this get `504`.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_owned(),
            request_timeout_secs: 30,
            body_limit_bytes: 16 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CalculatorConfig {
    /// Decimal places kept in trigonometric results.
    pub trig_decimals: i32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { trig_decimals: 10 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `calculator=debug,tower_http=info`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: vec!["GET".to_owned(), "POST".to_owned(), "DELETE".to_owned()],
            max_age_secs: 0,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` if given, then the environment.
    ///
    /// # Errors
    /// Fails when `path` does not exist or any source does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)?
            .extract()
            .context("failed to load configuration")
    }

    /// # Errors
    /// Fails when `path` is given but is not a file.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Apply `--port` and `-v` on top of the loaded configuration.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) {
        if let Some(port) = port {
            let host = self
                .server
                .bind_addr
                .rsplit_once(':')
                .map_or(self.server.bind_addr.as_str(), |(host, _)| host);
            self.server.bind_addr = format!("{host}:{port}");
        }
        let level = match verbose {
            0 => return,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        level.clone_into(&mut self.logging.level);
    }

    /// # Errors
    /// Fails when `server.bind_addr` is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid server.bind_addr '{}'", self.server.bind_addr))
    }

    /// Checks that go beyond the schema.
    ///
    /// # Errors
    /// Describes the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be positive");
        }
        if !(0..=15).contains(&self.calculator.trig_decimals) {
            bail!("calculator.trig_decimals must be between 0 and 15");
        }
        for method in &self.cors.allowed_methods {
            if method.parse::<http::Method>().is_err() {
                bail!("cors.allowed_methods contains invalid method '{method}'");
            }
        }
        Ok(())
    }

    /// # Errors
    /// Fails if the configuration cannot be rendered.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
