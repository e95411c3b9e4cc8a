use serde::{Deserialize, Serialize};

use super::ConfigError;

/// `[database]`: where the five identity store tables live.
///
/// `type` selects the backend. A backend is only available when its cargo
/// feature is compiled in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum DatabaseConfig {
    /// Absent section. Login cannot work without stores, so validation
    /// rejects it with a readable message.
    #[default]
    None,

    #[cfg(feature = "database-sqlite")]
    Sqlite(SqliteConfig),

    #[cfg(feature = "database-postgres")]
    Postgres(PostgresConfig),
}

impl DatabaseConfig {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::None => Ok(()),
            #[cfg(feature = "database-sqlite")]
            Self::Sqlite(sqlite) if sqlite.path.trim().is_empty() => Err(ConfigError::Validation(
                "database.path must name a SQLite file or :memory:".into(),
            )),
            #[cfg(feature = "database-sqlite")]
            Self::Sqlite(_) => Ok(()),
            #[cfg(feature = "database-postgres")]
            Self::Postgres(pg) => pg.validate(),
        }
    }

    /// Whether `serve` applies pending migrations before listening.
    pub fn run_migrations(&self) -> bool {
        match self {
            Self::None => false,
            #[cfg(feature = "database-sqlite")]
            Self::Sqlite(sqlite) => sqlite.run_migrations,
            #[cfg(feature = "database-postgres")]
            Self::Postgres(pg) => pg.run_migrations,
        }
    }
}

/// `type = "sqlite"`. Suits a single gateway instance; `:memory:` is for
/// tests only.
#[cfg(feature = "database-sqlite")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqliteConfig {
    pub path: String,
    pub create_if_missing: bool,
    pub run_migrations: bool,
    /// Write-ahead logging, so logins keep reading while records are
    /// provisioned.
    pub wal_mode: bool,
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
}

#[cfg(feature = "database-sqlite")]
impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "schoolgate.db".into(),
            create_if_missing: true,
            run_migrations: true,
            wal_mode: true,
            busy_timeout_ms: 5_000,
            max_connections: 5,
        }
    }
}

/// `type = "postgres"`, e.g. `url = "postgres://school:${DB_PASSWORD}@db/school"`.
#[cfg(feature = "database-postgres")]
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostgresConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a login waits for a free connection.
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub run_migrations: bool,
}

#[cfg(feature = "database-postgres")]
impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 1,
            max_connections: 10,
            connect_timeout_secs: 10,
            idle_timeout_secs: 300,
            run_migrations: true,
        }
    }
}

#[cfg(feature = "database-postgres")]
impl PostgresConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Validation("database.url is required for postgres".into()));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ConfigError::Validation(format!(
                "database pool bounds are inconsistent (min {}, max {})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

/// The URL usually embeds a password.
#[cfg(feature = "database-postgres")]
impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &"[redacted]")
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}
