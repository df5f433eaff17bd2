use crate::service::connector::DbTarget;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;
use std::time::Duration;

/// Process configuration, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite URL naming the directory that holds the database files.
    pub database_url: Option<String>,
    /// Fallbacks for `database_url`, consulted in this order when it is unset or blank.
    pub sqlite_url: Option<String>,
    pub db_url: Option<String>,
    pub database_name: String,
    pub host: IpAddr,
    pub port: u16,
    pub connect_timeout_secs: u64,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            sqlite_url: None,
            db_url: None,
            database_name: "projectSchool".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            connect_timeout_secs: 7,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&[
                "database_url",
                "sqlite_url",
                "db_url",
                "database_name",
                "host",
                "port",
                "connect_timeout_secs",
                "loglevel",
            ]))
            .extract()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Connection target, or `None` when no endpoint is configured.
    pub fn db_target(&self) -> Option<DbTarget> {
        let url = [&self.database_url, &self.sqlite_url, &self.db_url]
            .into_iter()
            .flatten()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())?;
        Some(DbTarget {
            url: url.to_string(),
            name: self.database_name.clone(),
            timeout: self.connect_timeout(),
        })
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("FATAL: invalid configuration in environment"));
