use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::logging::LogLevel;

pub const DEFAULT_API_BASE_URL: &str = "https://api.byu.edu/byuapi/av_rooms";

/// Command-line flags; every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "uapi-translator")]
#[command(about = "Serves AV rooms and devices in University API shape")]
#[command(version)]
pub struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 80, help = "Port to listen on")]
    pub port: u16,

    #[arg(short, long, env = "LOG_LEVEL", default_value_t = 2, help = "1 debug, 2 info, 3 warn, 4 error, 5 off")]
    pub log_level: u8,

    #[arg(long, env = "OPA_URL", help = "Policy service base URL")]
    pub opa_url: Option<String>,

    #[arg(long, env = "OPA_TOKEN", help = "Bearer token for the policy service")]
    pub opa_token: Option<String>,

    #[arg(long, env = "DISABLE_AUTH", help = "Allow every request without authorization")]
    pub disable_auth: bool,

    #[arg(long, env = "DB_ADDRESS", help = "Document database address")]
    pub db_address: String,

    #[arg(long, env = "DB_USERNAME")]
    pub db_username: Option<String>,

    #[arg(long, env = "DB_PASSWORD")]
    pub db_password: Option<String>,

    #[arg(long, env = "AV_API_URL", help = "AV control API base URL")]
    pub av_api_url: String,

    #[arg(long, env = "AUTH_URL", help = "Permissions service base URL")]
    pub auth_url: Option<String>,

    #[arg(long, env = "JWT_SECRET", help = "Shared HS256 secret for local token checks")]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL, help = "Base URL used in resource links")]
    pub api_base_url: String,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30, help = "Timeout for outbound requests")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} url '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },

    #[error("--opa-url is required unless --disable-auth is set")]
    MissingOpaUrl,

    #[error("--auth-url is required unless --disable-auth is set")]
    MissingAuthUrl,

    #[error("invalid log level {0}: must be 1-5")]
    InvalidLogLevel(u8),

    #[error("invalid JWT secret: {0}")]
    Token(#[from] crate::auth::TokenError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("database client: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("AV API client: {0}")]
    AvApi(#[from] crate::avapi::AvApiError),

    #[error("permissions client: {0}")]
    Permissions(#[from] crate::auth::AuthError),

    #[error("policy client: {0}")]
    Opa(#[from] crate::middleware::OpaError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub av_api: AvApiConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AvApiConfig {
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub disabled: bool,
    pub opa_url: Option<String>,
    pub opa_token: Option<String>,
    pub permissions_url: Option<String>,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub http_timeout: Duration,
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Validate parsed flags. With auth enabled both the policy service and
    /// the permissions service must be configured.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let log_level = LogLevel::from_number(args.log_level)
            .ok_or(ConfigError::InvalidLogLevel(args.log_level))?;

        check_url("database", &args.db_address)?;
        check_url("AV API", &args.av_api_url)?;

        let opa_url = non_empty(args.opa_url);
        let permissions_url = non_empty(args.auth_url);
        if !args.disable_auth {
            let opa = opa_url.as_deref().ok_or(ConfigError::MissingOpaUrl)?;
            check_url("OPA", opa)?;
            let auth = permissions_url.as_deref().ok_or(ConfigError::MissingAuthUrl)?;
            check_url("permissions", auth)?;
        }

        Ok(Self {
            server: ServerConfig {
                port: args.port,
                log_level,
            },
            store: StoreConfig {
                address: args.db_address,
                username: non_empty(args.db_username),
                password: args.db_password,
            },
            av_api: AvApiConfig {
                address: args.av_api_url,
            },
            auth: AuthConfig {
                disabled: args.disable_auth,
                opa_url,
                opa_token: non_empty(args.opa_token),
                permissions_url,
                jwt_secret: non_empty(args.jwt_secret),
            },
            api: ApiConfig {
                base_url: args.api_base_url,
                http_timeout: Duration::from_secs(args.http_timeout_secs),
            },
        })
    }

    /// The one outbound HTTP client; every backend shares its pool.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(self.api.http_timeout)
            .build()?)
    }
}
