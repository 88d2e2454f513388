use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/tally.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./tally.db".to_string())
    }
}

impl Database {
    /// Connection string understood by `sea_orm::Database::connect`.
    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Log {
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: Database,
    pub log: Log,
}

impl Settings {
    /// Layer the optional TOML file under `TALLY__*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?
            .try_deserialize()
    }
}
