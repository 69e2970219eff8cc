/*
 * Responsibility
 * - Read server settings from the environment (.env honoured)
 * - Pick per-variant defaults (plain vs OCI)
 * - Reject malformed values before anything binds
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::auth::token_service::DEFAULT_TOKEN_TTL;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_MASTER_ACCESS_KEY: &str = "MASTERKEY";

/// Deployment mode; only decides whether a panic aborts the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    /// Anything other than `production`/`prod` is development.
    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

/// Which flavour of the fixture server to run.
///
/// `Plain` serves `/oauth/token` over HTTP. `Oci` also serves `/auth` and
/// terminates TLS with the configured certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerVariant {
    Plain,
    Oci,
}

impl ServerVariant {
    pub fn is_oci(&self) -> bool {
        matches!(self, Self::Oci)
    }
}

impl FromStr for ServerVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "chartmuseum" => Ok(Self::Plain),
            "oci" => Ok(Self::Oci),
            _ => Err(ConfigError::Invalid("AUTH_SERVER_VARIANT")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub variant: ServerVariant,

    pub master_access_key: String,

    pub private_key_path: PathBuf,
    // TLS certificate chain, only read by the OCI variant
    pub public_cert_path: PathBuf,

    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub add_kid_header: bool,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source; `from_env` feeds it the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::from_value(lookup("APP_ENV").as_deref());

        let variant = match lookup("AUTH_SERVER_VARIANT") {
            Some(s) => s.parse()?,
            None => ServerVariant::Plain,
        };

        let master_access_key =
            lookup("MASTER_ACCESS_KEY").unwrap_or_else(|| DEFAULT_MASTER_ACCESS_KEY.to_string());
        if master_access_key.is_empty() {
            return Err(ConfigError::Missing("MASTER_ACCESS_KEY"));
        }

        let private_key_path = lookup("TOKEN_PRIVATE_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| match variant {
                ServerVariant::Plain => PathBuf::from("../config/server.key"),
                ServerVariant::Oci => PathBuf::from("/config/server.key"),
            });

        let public_cert_path = lookup("TOKEN_PUBLIC_CERT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/config/server.pem"));

        let (default_issuer, default_audience) = match variant {
            ServerVariant::Plain => (None, None),
            ServerVariant::Oci => (Some("Sample Issuer"), Some("Authentication")),
        };
        let non_empty = |key: &str| lookup(key).filter(|s: &String| !s.is_empty());
        let issuer = non_empty("TOKEN_ISSUER").or(default_issuer.map(str::to_string));
        let audience = non_empty("TOKEN_AUDIENCE").or(default_audience.map(str::to_string));

        let add_kid_header = match lookup("TOKEN_ADD_KID_HEADER") {
            Some(s) => parse_bool(&s).ok_or(ConfigError::Invalid("TOKEN_ADD_KID_HEADER"))?,
            None => variant.is_oci(),
        };

        let token_ttl = match lookup("TOKEN_TTL_SECONDS") {
            Some(s) => s
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("TOKEN_TTL_SECONDS"))?,
            None => DEFAULT_TOKEN_TTL,
        };

        Ok(Self {
            addr,
            app_env,
            variant,
            master_access_key,
            private_key_path,
            public_cert_path,
            issuer,
            audience,
            add_kid_header,
            token_ttl,
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
