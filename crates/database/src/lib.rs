use std::{env, fmt};

use async_trait::async_trait;
use queries::convert_error;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Transaction,
};
use storage::database::{
    Database, DatabaseAutocommit, DatabaseOperations, DatabaseTransaction,
};

pub mod data_model;
pub mod queries;

/// Postgres connection settings, read from `DATABASE_USER`,
/// `DATABASE_PASSWORD`, `DATABASE_HOST`, `DATABASE_PORT` and
/// `DATABASE_NAME`.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl fmt::Debug for DatabaseConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConnectionInfo")
            .field("username", &self.username)
            .field("password", &"***")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseConnectionInfo {
    /// `None` unless every variable is set and the port is a number.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        Some(Self {
            username: lookup("DATABASE_USER")?,
            password: lookup("DATABASE_PASSWORD")?,
            hostname: lookup("DATABASE_HOST")?,
            port: lookup("DATABASE_PORT")?.trim().parse().ok()?,
            database: lookup("DATABASE_NAME")?,
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.hostname)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

const MAX_CONNECTIONS: u32 = 8;

#[derive(Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

pub struct PgDatabaseTransaction<'a> {
    tx: Transaction<'a, sqlx::Postgres>,
}

#[async_trait]
impl<'a> DatabaseTransaction for PgDatabaseTransaction<'a> {
    async fn commit(self) -> storage::database::Result<()> {
        self.tx.commit().await.map_err(convert_error)
    }
}

pub struct PgDatabaseAutocommit {
    pool: sqlx::PgPool,
}

impl DatabaseAutocommit for PgDatabaseAutocommit {}

impl DatabaseOperations for PgDatabaseAutocommit {}

impl<'a> DatabaseOperations for PgDatabaseTransaction<'a> {}

impl PgDatabase {
    /// Connects and brings the schema up to date.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, sqlx::Error> {
        log::info!(
            "connecting to database {} at {}:{}",
            database_connection_info.database,
            database_connection_info.hostname,
            database_connection_info.port
        );
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(database_connection_info.connect_options())
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("database schema is up to date");

        Ok(Self { connection: pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Transaction = PgDatabaseTransaction<'static>;
    type Autocommit = PgDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        PgDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }

    async fn transaction(&self) -> storage::database::Result<Self::Transaction> {
        let tx: Transaction<'_, sqlx::Postgres> = self
            .connection
            .begin()
            .await
            .map_err(convert_error)?;

        Ok(PgDatabaseTransaction { tx })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    const COMPLETE: [(&str, &str); 5] = [
        ("DATABASE_USER", "vending"),
        ("DATABASE_PASSWORD", "secret"),
        ("DATABASE_HOST", "db"),
        ("DATABASE_PORT", "5432"),
        ("DATABASE_NAME", "routes"),
    ];

    #[test]
    fn complete_env() {
        let info = DatabaseConnectionInfo::from_lookup(lookup(&COMPLETE)).unwrap();
        assert_eq!(info.port, 5432);
        assert_eq!(info.database, "routes");
        assert!(!format!("{:?}", info).contains("secret"));
    }

    #[test]
    fn incomplete_env() {
        assert_eq!(DatabaseConnectionInfo::from_lookup(lookup(&COMPLETE[1..])), None);

        let mut bad_port = COMPLETE;
        bad_port[3] = ("DATABASE_PORT", "postgres");
        assert_eq!(DatabaseConnectionInfo::from_lookup(lookup(&bad_port)), None);
    }
}
