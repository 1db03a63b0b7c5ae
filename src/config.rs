use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// JSON files under `DATA_DIR`
    File,
    /// `documents` table in MySQL at `DATABASE_URL`
    Mysql,
    /// Nothing persisted; handy for demos
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub data_dir: String,
    pub database_url: Option<String>,
    pub admin_pin: String,
    pub utc_offset_minutes: i32,
    pub session_ttl_secs: u64,

    // Rate limiting
    pub rate_employee_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let store_backend: StoreBackend = parse_var("STORE_BACKEND", &var("STORE_BACKEND", "file"))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND=mysql"));
        }

        let admin_pin = lookup("ADMIN_PIN")
            .map(|pin| pin.trim().to_string())
            .filter(|pin| !pin.is_empty())
            .ok_or_else(|| anyhow!("ADMIN_PIN must be set"))?;

        let config = Self {
            server_addr: var("SERVER_ADDR", "127.0.0.1:8080"),
            store_backend,
            data_dir: var("DATA_DIR", "database"),
            database_url,
            admin_pin,
            utc_offset_minutes: parse_var("UTC_OFFSET_MINUTES", &var("UTC_OFFSET_MINUTES", "0"))?,
            session_ttl_secs: parse_var("SESSION_TTL_SECS", &var("SESSION_TTL_SECS", "900"))?,
            rate_employee_per_min: parse_var(
                "RATE_EMPLOYEE_PER_MIN",
                &var("RATE_EMPLOYEE_PER_MIN", "120"),
            )?,
            rate_admin_per_min: parse_var("RATE_ADMIN_PER_MIN", &var("RATE_ADMIN_PER_MIN", "30"))?,
            api_prefix: var("API_PREFIX", "/api"),
        };

        // fail at startup, not on the first request
        config.utc_offset()?;
        Ok(config)
    }

    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC_OFFSET_MINUTES out of range: {}", self.utc_offset_minutes))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{name} has an invalid value: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = from(&[("ADMIN_PIN", "4321")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::File);
        assert_eq!(config.data_dir, "database");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.session_ttl(), Duration::from_secs(900));
        assert_eq!(config.utc_offset().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn pin_is_required() {
        assert!(from(&[]).is_err());
        assert!(from(&[("ADMIN_PIN", "  ")]).is_err());
    }

    #[test]
    fn mysql_needs_a_url() {
        assert!(from(&[("ADMIN_PIN", "1"), ("STORE_BACKEND", "MySQL")]).is_err());
        let config = from(&[
            ("ADMIN_PIN", "1"),
            ("STORE_BACKEND", "mysql"),
            ("DATABASE_URL", "mysql://u:p@localhost/timeclock"),
        ])
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Mysql);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = from(&[("ADMIN_PIN", "1"), ("SESSION_TTL_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
    }

    #[test]
    fn offset_is_bounded() {
        assert!(from(&[("ADMIN_PIN", "1"), ("UTC_OFFSET_MINUTES", "330")]).is_ok());
        assert!(from(&[("ADMIN_PIN", "1"), ("UTC_OFFSET_MINUTES", "100000")]).is_err());
    }
}
