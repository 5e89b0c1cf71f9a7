use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub verification: VerificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        )?;

        let verification = VerificationConfig::from_env(environment)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            verification,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output layout for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" | "" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Knobs for the verification services and the rating pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Exposes the forced Nafath confirmation path. Off by default in production.
    pub simulation_enabled: bool,
    pub identity_request_ttl_secs: i64,
    pub compliance_validity_days: i64,
    pub credit_validity_days: i64,
    pub minimum_age: u32,
    pub evaluation_timeout_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            simulation_enabled: true,
            identity_request_ttl_secs: 180,
            compliance_validity_days: 30,
            credit_validity_days: 30,
            minimum_age: 18,
            evaluation_timeout_secs: 30,
        }
    }
}

impl VerificationConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let simulation_enabled = match env::var("APP_VERIFICATION_SIMULATION") {
            Ok(raw) => parse_flag("APP_VERIFICATION_SIMULATION", &raw)?,
            Err(_) => environment != AppEnvironment::Production,
        };

        Ok(Self {
            simulation_enabled,
            identity_request_ttl_secs: number_or(
                "APP_NAFATH_TTL_SECS",
                defaults.identity_request_ttl_secs,
                MAX_REQUEST_TTL_SECS,
            )?,
            compliance_validity_days: number_or(
                "APP_COMPLIANCE_VALIDITY_DAYS",
                defaults.compliance_validity_days,
                MAX_VALIDITY_DAYS,
            )?,
            credit_validity_days: number_or(
                "APP_CREDIT_VALIDITY_DAYS",
                defaults.credit_validity_days,
                MAX_VALIDITY_DAYS,
            )?,
            minimum_age: number_or("APP_MINIMUM_AGE", defaults.minimum_age, MAX_MINIMUM_AGE)?,
            evaluation_timeout_secs: number_or(
                "APP_EVALUATION_TIMEOUT_SECS",
                defaults.evaluation_timeout_secs,
                MAX_EVALUATION_TIMEOUT_SECS,
            )?,
        })
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key }),
    }
}

const MAX_REQUEST_TTL_SECS: i64 = 86_400;
const MAX_VALIDITY_DAYS: i64 = 3_650;
const MAX_MINIMUM_AGE: u32 = 120;
const MAX_EVALUATION_TIMEOUT_SECS: u64 = 3_600;

/// Positive number from `key` no larger than `max`, or `default` when unset.
fn number_or<T>(key: &'static str, default: T, max: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { key })?;
            if value <= T::default() || value > max {
                return Err(ConfigError::InvalidNumber { key });
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidFlag { key: &'static str },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', found '{value}'")
            }
            ConfigError::InvalidFlag { key } => {
                write!(f, "{key} must be one of true/false/1/0/yes/no/on/off")
            }
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a positive number within range"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
