use std::time::Duration;

/// Primary environment variable holding the upstream backend base URL.
pub const API_BASE_ENV: &str = "RATE_PROXY_API_URL";
/// Name the frontend deployment already uses; honoured when the primary is unset.
pub const API_BASE_ENV_COMPAT: &str = "NEXT_PUBLIC_API_URL";

/// Where the upstream base URL comes from.
///
/// The base is resolved on every request, never cached, so an operator can
/// change the environment of a running process (or a test can pin a value)
/// without touching the rest of the state.
#[derive(Debug, Clone)]
pub enum ApiBase {
    /// Read the environment on each call.
    Env,
    /// A value supplied up front. `None` behaves like an unset variable.
    Fixed(Option<String>),
}

impl ApiBase {
    /// Returns the raw configured base, or an empty string when absent.
    pub fn resolve(&self) -> String {
        match self {
            ApiBase::Env => crate::proxy::url::api_base(),
            ApiBase::Fixed(base) => base.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_base: ApiBase,
    /// Frontend origin allowed by CORS in addition to localhost.
    pub allowed_origin: String,
    pub connect_timeout: Duration,
    /// Total per-request timeout for each upstream call. `None` leaves the
    /// transport's default (no limit) in place.
    pub upstream_timeout: Option<Duration>,
}

impl Config {
    /// Same defaults as `load()` with an unset environment, pinned to `base`.
    pub fn with_base(base: Option<String>) -> Self {
        Self {
            port: 3001,
            api_base: ApiBase::Fixed(base),
            allowed_origin: "http://localhost:3000".into(),
            connect_timeout: Duration::from_secs(5),
            upstream_timeout: None,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let port = match std::env::var("RATE_PROXY_PORT") {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("RATE_PROXY_PORT is not a valid port: {}", raw))?,
        Err(_) => 3001,
    };

    if ApiBase::Env.resolve().trim().is_empty() {
        tracing::warn!(
            "{} is not set, /api/payment-rate will serve default values",
            API_BASE_ENV
        );
    }

    Ok(Config {
        port,
        api_base: ApiBase::Env,
        allowed_origin: std::env::var("RATE_PROXY_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".into()),
        connect_timeout: Duration::from_secs(
            std::env::var("RATE_PROXY_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        ),
        upstream_timeout: std::env::var("RATE_PROXY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs),
    })
}
