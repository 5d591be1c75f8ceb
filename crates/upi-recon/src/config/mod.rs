use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::lookup::WorkerBudget;

pub const DEFAULT_JUSPAY_URL: &str = "https://api.juspay.in/upi/verify-vpa";
pub const DEFAULT_MERCHANT_ID: &str = "milaap";
pub const DEFAULT_SUFFIX_FILE: &str = "data/mobile_suffixes.txt";
pub const DEFAULT_FAMPAY_URL: &str = "https://westeros.famapp.in/txn/create/payout/add/";
pub const DEFAULT_DEVICE_DETAILS: &str = "RMX2002 | Android 11 | Dalvik/2.1.0 | RMX2002L1 | \
A0A9F900EBF829949466A0CC2B04F395770149E7 | 3.11.5 (Build 525) | 1DAPK6BOLD";

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
    pub lookup: LookupConfig,
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
        let mut telemetry = TelemetryConfig::for_environment(environment, &log_level);
        if let Ok(raw) = env::var("APP_LOG_FORMAT") {
            telemetry.format = LogFormat::from_str(&raw).ok_or(ConfigError::InvalidLogFormat)?;
        }
        telemetry.verification_log_level = env::var("APP_VERIFY_LOG_LEVEL")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
            lookup: LookupConfig::from_env()?,
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

/// Line layout of the log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Separate level for per-candidate verification failures.
    pub verification_log_level: Option<String>,
    pub format: LogFormat,
    pub ansi: bool,
}

impl TelemetryConfig {
    /// Colored compact output for local runs, plain full lines elsewhere.
    pub fn for_environment(environment: AppEnvironment, log_level: &str) -> Self {
        let (format, ansi) = match environment {
            AppEnvironment::Development => (LogFormat::Compact, true),
            AppEnvironment::Test => (LogFormat::Compact, false),
            AppEnvironment::Production => (LogFormat::Full, false),
        };

        Self {
            log_level: log_level.to_string(),
            verification_log_level: None,
            format,
            ansi,
        }
    }
}

/// FamPay payee lookup endpoint and the device identity it expects.
#[derive(Debug, Clone)]
pub struct FamPayConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
    pub device_id: Option<String>,
    pub device_details: String,
    pub request_timeout: Duration,
}

impl FamPayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let non_empty = |var: &str| {
            env::var(var)
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Ok(Self {
            endpoint: non_empty("FAMPAY_URL").unwrap_or_else(|| DEFAULT_FAMPAY_URL.to_string()),
            auth_token: non_empty("AUTH_TOKEN"),
            device_id: non_empty("DEVICE_ID"),
            device_details: non_empty("DEVICE_DETAILS")
                .unwrap_or_else(|| DEFAULT_DEVICE_DETAILS.to_string()),
            request_timeout: seconds_from_env("FAMPAY_TIMEOUT_SECS", 15)?,
        })
    }
}

impl Default for FamPayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FAMPAY_URL.to_string(),
            auth_token: None,
            device_id: None,
            device_details: DEFAULT_DEVICE_DETAILS.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Oracle endpoint, suffix source, and scan limits.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub oracle_url: String,
    pub merchant_id: String,
    pub suffix_file: PathBuf,
    pub request_timeout: Duration,
    pub scan_deadline: Duration,
    pub default_workers: WorkerBudget,
    pub fampay: FamPayConfig,
}

impl LookupConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let oracle_url = env::var("JUSPAY_URL").unwrap_or_else(|_| DEFAULT_JUSPAY_URL.to_string());
        let merchant_id =
            env::var("JUSPAY_MERCHANT_ID").unwrap_or_else(|_| DEFAULT_MERCHANT_ID.to_string());
        let suffix_file = env::var("SUFFIX_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SUFFIX_FILE));

        let request_timeout = seconds_from_env("JUSPAY_TIMEOUT_SECS", 15)?;
        let scan_deadline = seconds_from_env("SCAN_DEADLINE_SECS", 60)?;

        let default_workers = match env::var("SCAN_DEFAULT_THREADS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .map(WorkerBudget::from_requested)
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "SCAN_DEFAULT_THREADS",
                })?,
            Err(_) => WorkerBudget::default(),
        };

        Ok(Self {
            oracle_url,
            merchant_id,
            suffix_file,
            request_timeout,
            scan_deadline,
            default_workers,
            fampay: FamPayConfig::from_env()?,
        })
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            oracle_url: DEFAULT_JUSPAY_URL.to_string(),
            merchant_id: DEFAULT_MERCHANT_ID.to_string(),
            suffix_file: PathBuf::from(DEFAULT_SUFFIX_FILE),
            request_timeout: Duration::from_secs(15),
            scan_deadline: Duration::from_secs(60),
            default_workers: WorkerBudget::default(),
            fampay: FamPayConfig::default(),
        }
    }
}

fn seconds_from_env(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidNumber { var }),
        },
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    InvalidLogFormat,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a positive whole number")
            }
            ConfigError::InvalidLogFormat => write!(f, "APP_LOG_FORMAT must be compact or full"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidLogFormat => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
