//! Settings for `beansd`.
//!
//! Built-in defaults, then an optional TOML file (`beans.toml` unless
//! `--config` says otherwise), then `BEANS__SECTION__KEY` environment
//! variables.

use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "beans.toml";
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "beansd", version, about = "Beans budgeting server")]
pub struct Cli {
    /// Config file path (TOML).
    #[arg(long, env = "BEANS_CONFIG")]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Apply migrations and serve the HTTP API (default).
    Serve,
    /// Run a migration action against the database and exit.
    Migrate {
        #[arg(value_enum, default_value_t = MigrateAction::Up)]
        action: MigrateAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Db {
    pub path: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub http: Http,
    pub db: Db,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        let environment = Environment::with_prefix("BEANS")
            .separator("__")
            .try_parsing(true);
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name(path).required(config_path.is_some()))
                .add_source(environment),
        )
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("http.bind", "127.0.0.1")?
            .set_default("http.port", 8000)?
            .set_default("db.path", "beans.db")
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.http.bind, self.http.port)
    }

    pub fn database(&self) -> Database {
        if self.db.path == MEMORY_PATH {
            Database::Memory
        } else {
            Database::Sqlite(self.db.path.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::from_builder(Settings::defaults().unwrap()).unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.address(), "127.0.0.1:8000");
        assert_eq!(settings.database(), Database::Sqlite("beans.db".to_string()));
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            [http]
            port = 9090

            [db]
            path = ":memory:"
        "#;
        let builder = Settings::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml));
        let settings = Settings::from_builder(builder).unwrap();

        assert_eq!(settings.address(), "127.0.0.1:9090");
        assert_eq!(settings.database(), Database::Memory);
        assert_eq!(settings.app.level, "info");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["beansd"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());

        let cli = Cli::parse_from(["beansd", "--config", "other.toml", "migrate"]);
        assert!(matches!(
            cli.command,
            Some(Command::Migrate {
                action: MigrateAction::Up
            })
        ));
        assert_eq!(cli.config.as_deref(), Some("other.toml"));

        let cli = Cli::parse_from(["beansd", "migrate", "fresh"]);
        assert!(matches!(
            cli.command,
            Some(Command::Migrate {
                action: MigrateAction::Fresh
            })
        ));
    }
}
