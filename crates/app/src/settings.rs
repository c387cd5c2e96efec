//! Runtime settings, read from an optional TOML file and `DOMPET__*`
//! environment variables (e.g. `DOMPET__SERVER__PORT=8080`).
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "dompet", version)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long, env = "DOMPET_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
    /// bcrypt cost for new password hashes. Unset keeps the engine default.
    #[serde(default)]
    pub password_cost: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        Self::load(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("DOMPET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load("does/not/exist").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.password_cost, None);
    }

    #[test]
    fn sqlite_database_from_toml() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [app]
                level = "debug"

                [server]
                bind = "0.0.0.0"
                port = 8080
                database = { sqlite = "dompet.db" }
                password_cost = 10
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.password_cost, Some(10));
        assert_eq!(
            settings.server.database,
            Database::Sqlite("dompet.db".to_string())
        );
    }
}
