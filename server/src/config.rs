use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use products_directory::{DEFAULT_BASE_URL, DEFAULT_MAX_IN_FLIGHT, DEFAULT_TIMEOUT, UpstreamConfig};
use reqwest::Url;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = parse_base_url(
            &lookup("UPSTREAM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        )?;
        let timeout_secs = positive(&lookup, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        let max_in_flight = positive(&lookup, "UPSTREAM_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?;

        let cors_allowed_origins = parse_origins(
            &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
        );

        Ok(Self {
            upstream: UpstreamConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                max_in_flight,
            },
            cors_allowed_origins,
        })
    }

    /// Replace the upstream base URL, e.g. from a CLI flag.
    pub fn set_upstream_base(&mut self, raw: &str) -> Result<()> {
        self.upstream.base_url = parse_base_url(raw)?;
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid upstream url {raw}"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("upstream url {raw} cannot carry a path"));
    }
    Ok(url)
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + PartialEq + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .with_context(|| format!("invalid {key}"))?;
    if value == T::default() {
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(value)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
