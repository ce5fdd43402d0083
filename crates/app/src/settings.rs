//! Settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory and
//! from `TRIPBOARD__*` environment variables, e.g.
//! `TRIPBOARD__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! port = 3000
//! database = { sqlite = "./tripboard.db" }
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Buffered realtime events per trip before slow subscribers lag.
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("TRIPBOARD").separator("__")),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        Settings::from_config(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
    }

    #[test]
    fn sqlite_server_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "./trips.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.database, Database::Sqlite("./trips.db".to_string()));
        assert_eq!(server.channel_capacity, None);
    }

    #[test]
    fn memory_database() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert_eq!(settings.server.unwrap().database, Database::Memory);
    }
}
