use anyhow::{Context, Result};

/// Fixed KoboToolbox export endpoint for the conflict-event survey.
pub const KOBO_CSV_URL: &str = "https://kf.kobotoolbox.org/api/v2/assets/aZXWsZGZhqLn3xMaXUDff7/export-settings/esLzUHFGpDxBvpUMp7hofRS/data.csv";

/// Credentials for the export endpoint (HTTP Basic auth).
#[derive(Debug, Clone)]
pub struct KoboConfig {
    pub username: String,
    pub password: String,
}

/// Connection parameters for the destination Postgres.
#[derive(Debug, Clone)]
pub struct PgConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub kobo: KoboConfig,
    pub pg: PgConfig,
}

impl Config {
    /// Read every setting from the environment. There are no defaults: a
    /// missing variable fails the run before anything is fetched.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            kobo: KoboConfig {
                username: require("KOBO_USERNAME")?,
                password: require("KOBO_PASSWORD")?,
            },
            pg: PgConfig {
                host: require("PG_HOST")?,
                database: require("PG_DATABASE")?,
                user: require("PG_USER")?,
                password: require("PG_PASSWORD")?,
                port: require("PG_PORT")?
                    .parse()
                    .context("PG_PORT is not a valid port number")?,
            },
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing required environment variable {name}"))
}
