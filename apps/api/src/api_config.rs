use std::env;
use std::fmt::{Debug, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use backoffice_application::{DEFAULT_SESSION_LIFETIME_SECONDS, MIN_SECRET_LENGTH};
use backoffice_core::AppError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Project settings published to the admin frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    pub name: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub powered_by: bool,
    pub logo: String,
    pub login_logo: String,
    pub icon: String,
    pub background: String,
    pub login_message: String,
    pub default_locale: String,
    pub default_timezone: String,
    pub session_timeout: u64,
    pub uri: String,
}

impl AdminConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let session_timeout = match lookup("ADMIN_SESSION_TIMEOUT") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid ADMIN_SESSION_TIMEOUT: {error}"))
            })?,
            None => 7200,
        };

        let uri = text("ADMIN_URI", "/admin");
        if !uri.starts_with('/') {
            return Err(AppError::Validation(format!(
                "ADMIN_URI must start with '/', got '{uri}'"
            )));
        }

        Ok(Self {
            name: text("ADMIN_NAME", "Backoffice"),
            author: text("ADMIN_AUTHOR", ""),
            copyright: text("ADMIN_COPYRIGHT", ""),
            description: text("ADMIN_DESCRIPTION", ""),
            powered_by: flag(lookup("ADMIN_POWERED_BY"), true),
            logo: text("ADMIN_LOGO", ""),
            login_logo: text("ADMIN_LOGIN_LOGO", ""),
            icon: text("ADMIN_ICON", ""),
            background: text("ADMIN_BACKGROUND", ""),
            login_message: text("ADMIN_LOGIN_MESSAGE", ""),
            default_locale: text("ADMIN_DEFAULT_LOCALE", "en_US"),
            default_timezone: text("ADMIN_DEFAULT_TIMEZONE", "UTC"),
            session_timeout,
            uri: uri.trim_end_matches('/').to_owned(),
        })
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub session_secret: String,
    pub session_domain: Option<String>,
    pub session_lifetime_seconds: i64,
    pub api_host: String,
    pub api_port: u16,
    pub dev_seed: bool,
    pub admin: AdminConfig,
}

impl Debug for ApiConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiConfig")
            .field("migrate_only", &self.migrate_only)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("frontend_url", &self.frontend_url)
            .field("session_secret", &"<redacted>")
            .field("session_domain", &self.session_domain)
            .field("session_lifetime_seconds", &self.session_lifetime_seconds)
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("dev_seed", &self.dev_seed)
            .field("admin", &self.admin)
            .finish()
    }
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Ok(config)
    }

    /// Builds the configuration from a variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = lookup("DATABASE_URL");
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        Url::parse(&frontend_url)
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

        let session_secret = required_env(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "SESSION_SECRET must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let session_lifetime_seconds = match lookup("SESSION_LIFETIME_SECONDS") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "SESSION_LIFETIME_SECONDS must be a positive integer, got '{value}'"
                    ))
                })?,
            None => DEFAULT_SESSION_LIFETIME_SECONDS,
        };

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let dev_seed = flag(lookup("DEV_SEED"), database_url.is_none());

        Ok(Self {
            migrate_only: false,
            session_domain: lookup("SESSION_DOMAIN"),
            admin: AdminConfig::from_lookup(&lookup)?,
            database_url,
            frontend_url,
            session_secret,
            session_lifetime_seconds,
            api_host,
            api_port,
            dev_seed,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn flag(value: Option<String>, default: bool) -> bool {
    match value {
        Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}
