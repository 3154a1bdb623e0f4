/*
 * Responsibility
 * - Load settings from the environment (bind address, CORS, identity provider, audience)
 * - Validate them up front (missing or unparsable values fail startup)
 * - Hand the auth middleware an immutable `AuthSettings` value
 */
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where token signing keys come from.
#[derive(Debug, Clone)]
pub enum KeySourceSettings {
    /// The provider's published JWK set, fetched over HTTP and cached.
    Jwks {
        url: Url,
        cache_ttl: Duration,
        min_refresh_interval: Duration,
        fetch_timeout: Duration,
    },
    /// A single public key in PEM form, fixed for the life of the process.
    StaticPem(String),
}

/// Read-only verification settings, fixed when the middleware is built.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub audience: String,
    pub issuer: Option<String>,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
    pub key_source: KeySourceSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(var("HOST"), "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(var("PORT"), "PORT", 8000)?;
        let addr = SocketAddr::new(host, port);

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout =
            Duration::from_secs(parse_or(var("REQUEST_TIMEOUT_SECONDS"), "REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes = parse_or(
            var("REQUEST_BODY_LIMIT_BYTES"),
            "REQUEST_BODY_LIMIT_BYTES",
            1024 * 1024,
        )?;

        let domain = var("OKTA_DOMAIN").ok_or(ConfigError::Missing("OKTA_DOMAIN"))?;
        let domain = provider_url(&domain).ok_or(ConfigError::Invalid("OKTA_DOMAIN"))?;

        let audience = var("AUDIENCE").ok_or(ConfigError::Missing("AUDIENCE"))?;
        let issuer = var("OKTA_ISSUER").map(|s| s.trim().to_string());
        let algorithms = parse_algorithms(var("AUTH_ALGORITHMS").as_deref())?;

        let leeway_seconds = parse_or(
            var("ACCESS_TOKEN_LEEWAY_SECONDS"),
            "ACCESS_TOKEN_LEEWAY_SECONDS",
            60,
        )?;

        let key_source = match var("OKTA_PUBLIC_KEY_PEM") {
            Some(pem) => KeySourceSettings::StaticPem(pem.replace("\\n", "\n")),
            None => {
                let url = match var("OKTA_JWKS_URL") {
                    Some(raw) => Url::parse(raw.trim())
                        .map_err(|_| ConfigError::Invalid("OKTA_JWKS_URL"))?,
                    None => default_jwks_url(&domain).ok_or(ConfigError::Invalid("OKTA_DOMAIN"))?,
                };

                KeySourceSettings::Jwks {
                    url,
                    cache_ttl: Duration::from_secs(parse_or(
                        var("JWKS_CACHE_TTL_SECONDS"),
                        "JWKS_CACHE_TTL_SECONDS",
                        300,
                    )?),
                    min_refresh_interval: Duration::from_secs(parse_or(
                        var("JWKS_MIN_REFRESH_SECONDS"),
                        "JWKS_MIN_REFRESH_SECONDS",
                        30,
                    )?),
                    fetch_timeout: Duration::from_secs(parse_or(
                        var("JWKS_FETCH_TIMEOUT_SECONDS"),
                        "JWKS_FETCH_TIMEOUT_SECONDS",
                        5,
                    )?),
                }
            }
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            request_body_limit_bytes,
            auth: AuthSettings {
                audience,
                issuer,
                algorithms,
                leeway_seconds,
                key_source,
            },
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// `dev-123.okta.com/oauth2/default` and `https://dev-123.okta.com/oauth2/default/` both work.
fn provider_url(raw: &str) -> Option<Url> {
    let raw = raw.trim().trim_end_matches('/');
    let url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("https://{raw}"))
    };
    url.ok().filter(|u| u.host_str().is_some())
}

fn default_jwks_url(domain: &Url) -> Option<Url> {
    Url::parse(&format!("{}/v1/keys", domain.as_str().trim_end_matches('/'))).ok()
}

/// Comma-separated algorithm names. Shared-secret (HMAC) algorithms are refused:
/// the provider's key material is public.
fn parse_algorithms(raw: Option<&str>) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = raw
        .unwrap_or("RS256")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Algorithm::from_str(s).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHMS")))
        .collect::<Result<Vec<_>, _>>()?;

    let has_hmac = algorithms
        .iter()
        .any(|a| matches!(a, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512));

    if algorithms.is_empty() || has_hmac {
        return Err(ConfigError::Invalid("AUTH_ALGORITHMS"));
    }

    Ok(algorithms)
}
