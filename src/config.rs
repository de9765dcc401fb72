// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use url::Url;

use crate::address::{AddressResolver, GeocoderClient, LocalResolver};
use crate::fetch::{build_client, SaferClient, DEFAULT_USER_AGENT};
use crate::lookup::Lookup;
use crate::output::{KeyScheme, OutputMode};

const DEFAULT_SAFER_URL: &str = "https://safer.fmcsa.dot.gov/query.asp";
const DEFAULT_GEOCODER_URL: &str =
    "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress";
const DEFAULT_GEOCODER_BENCHMARK: &str = "Public_AR_Current";

/// Which address resolver a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStrategy {
    Local,
    Geocoder,
}

impl FromStr for AddressStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AddressStrategy::Local),
            "geocoder" | "census" => Ok(AddressStrategy::Geocoder),
            other => bail!("unknown address strategy {other:?} (expected local|geocoder)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub safer_url: Url,
    pub fetch_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    pub strategy: AddressStrategy,
    pub geocoder_url: Url,
    pub geocoder_benchmark: String,
    pub geocode_timeout: Duration,
    pub output_mode: OutputMode,
    pub key_scheme: KeyScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            safer_url: Url::parse(DEFAULT_SAFER_URL).expect("default SAFER url"),
            fetch_timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            strategy: AddressStrategy::Local,
            geocoder_url: Url::parse(DEFAULT_GEOCODER_URL).expect("default geocoder url"),
            geocoder_benchmark: DEFAULT_GEOCODER_BENCHMARK.to_string(),
            geocode_timeout: Duration::from_secs(10),
            output_mode: OutputMode::Json,
            key_scheme: KeyScheme::Bracketed,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(v) = var("PORT") {
            cfg.port = v.trim().parse::<u16>().with_context(|| format!("PORT={v}"))?;
        }
        if let Some(v) = var("LOG_LEVEL") {
            cfg.log_level = v;
        }
        if let Some(v) = var("SAFER_URL") {
            cfg.safer_url = Url::parse(&v).with_context(|| format!("SAFER_URL={v}"))?;
        }
        if let Some(v) = var("FETCH_TIMEOUT_SECS") {
            cfg.fetch_timeout = parse_timeout("FETCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("MAX_REDIRECTS") {
            cfg.max_redirects = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_REDIRECTS={v}"))?;
        }
        if let Some(v) = var("USER_AGENT") {
            cfg.user_agent = v;
        }
        if let Some(v) = var("ADDRESS_STRATEGY") {
            cfg.strategy = v.parse::<AddressStrategy>().context("ADDRESS_STRATEGY")?;
        }
        if let Some(v) = var("GEOCODER_URL") {
            cfg.geocoder_url = Url::parse(&v).with_context(|| format!("GEOCODER_URL={v}"))?;
        }
        if let Some(v) = var("GEOCODER_BENCHMARK") {
            cfg.geocoder_benchmark = v;
        }
        if let Some(v) = var("GEOCODE_TIMEOUT_SECS") {
            cfg.geocode_timeout = parse_timeout("GEOCODE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("KEY_SCHEME") {
            cfg.key_scheme = v.parse::<KeyScheme>().context("KEY_SCHEME")?;
        }
        let redirect = var("REDIRECT_URL")
            .map(|v| Url::parse(&v).with_context(|| format!("REDIRECT_URL={v}")))
            .transpose()?;
        match var("OUTPUT_MODE").as_deref().map(str::trim) {
            None | Some("json") => {}
            Some("redirect") => match redirect {
                Some(url) => cfg.output_mode = OutputMode::Redirect(url),
                None => bail!("OUTPUT_MODE=redirect requires REDIRECT_URL"),
            },
            Some(other) => bail!("unknown OUTPUT_MODE {other:?} (expected json|redirect)"),
        }

        Ok(cfg)
    }

    /// Wire the document source and the configured address resolver.
    pub fn build_lookup(&self) -> Result<Lookup> {
        let fetch_client = build_client(self.fetch_timeout, self.max_redirects, &self.user_agent)
            .context("building SAFER client")?;
        let source = Arc::new(SaferClient::new(fetch_client, self.safer_url.clone()));

        let resolver: Arc<dyn AddressResolver> = match self.strategy {
            AddressStrategy::Local => Arc::new(LocalResolver),
            AddressStrategy::Geocoder => {
                let client =
                    build_client(self.geocode_timeout, self.max_redirects, &self.user_agent)
                        .context("building geocoder client")?;
                Arc::new(GeocoderClient::new(
                    client,
                    self.geocoder_url.clone(),
                    self.geocoder_benchmark.clone(),
                ))
            }
        };

        Ok(Lookup::new(source, resolver))
    }
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key}={value}"))?;
    if secs == 0 {
        bail!("{key} must be a positive number of seconds");
    }
    Ok(Duration::from_secs(secs))
}
