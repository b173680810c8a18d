//! The connected executor.
//!
//! A [`StudentStore`] owns exactly one PostgreSQL connection. Statements run one at a
//! time (`execute` takes `&mut self`); sharing a store between tasks is up to the caller.
//!
//! ```ignore
//! use studentdb::{StoreConfig, Student, StudentStore, build_insert, build_select};
//!
//! let config = StoreConfig::new("postgres", "secret").database("university");
//! let mut store = StudentStore::connect(config).await?;
//!
//! store.execute(&build_insert(&Student::new(1, "Ann", "ann", "pw", 2))).await?;
//! let rows = store.execute(&build_select(Some("group_id=2"))?).await?;
//!
//! store.close().await?;
//! ```

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::response::ExecuteResult;
use crate::statement::Statement;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, warn};

const MAX_LOGGED_SQL: usize = 200;

/// A connection to the students database plus the statement executor.
pub struct StudentStore {
    config: StoreConfig,
    database: String,
    client: Client,
    driver: JoinHandle<()>,
}

impl StudentStore {
    /// Connect eagerly.
    ///
    /// When `config.database` is set, the database is created if it does not exist and
    /// the store is rebound to it; otherwise the store stays on the maintenance database.
    pub async fn connect(config: StoreConfig) -> DbResult<Self> {
        config.validate()?;

        let database = config.maintenance_database.clone();
        let (client, driver) = open(&config, &database).await?;
        let mut store = Self {
            config,
            database,
            client,
            driver,
        };

        if let Some(name) = store.config.database.clone() {
            store.create_database_if_absent(&name).await?;
            store.set_database(&name).await?;
        }
        Ok(store)
    }

    /// Create `name` unless it already exists. Returns whether it was created.
    pub async fn create_database_if_absent(&self, name: &str) -> DbResult<bool> {
        let exists = self
            .client
            .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
            .await?
            .is_some();
        if exists {
            return Ok(false);
        }

        match self
            .client
            .batch_execute(&format!("CREATE DATABASE {}", quote_ident(name)))
            .await
        {
            Ok(()) => {
                info!(target: "studentdb", database = name, "created database");
                Ok(true)
            }
            // Lost a race with another creator.
            Err(e) if e.code() == Some(&SqlState::DUPLICATE_DATABASE) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Rebind to another existing database.
    ///
    /// PostgreSQL cannot switch databases on a live connection, so this opens a new
    /// connection and closes the previous one. On failure the store keeps its old binding.
    pub async fn set_database(&mut self, name: &str) -> DbResult<()> {
        let (client, driver) = open(&self.config, name).await?;
        let old_client = std::mem::replace(&mut self.client, client);
        let old_driver = std::mem::replace(&mut self.driver, driver);
        let previous = std::mem::replace(&mut self.database, name.to_string());

        drop(old_client);
        if let Err(e) = old_driver.await {
            warn!(target: "studentdb", database = %previous, error = %e, "previous connection task failed");
        }
        info!(target: "studentdb", from = %previous, to = name, "rebound connection");
        Ok(())
    }

    /// Name of the database the store is bound to.
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying driver client, for anything the executor does not cover.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a statement and commit.
    ///
    /// Reads (`SELECT`, `SHOW`) return all rows; everything else returns the driver's
    /// acknowledgement. Insert/select/update/delete run in a transaction committed after
    /// the statement succeeds; a failed statement leaves nothing committed. Other kinds
    /// run in autocommit mode. Driver errors are returned as-is.
    pub async fn execute(&mut self, statement: &Statement) -> DbResult<ExecuteResult> {
        let kind = statement.kind();
        let started = Instant::now();

        let messages = if kind.is_transactional() {
            let tx = self.client.transaction().await?;
            let messages = tx.simple_query(statement.sql()).await?;
            tx.commit().await?;
            messages
        } else {
            self.client.simple_query(statement.sql()).await?
        };

        let result = ExecuteResult::from_messages(kind, &messages);
        self.log_statement(statement, started.elapsed(), &result);
        Ok(result)
    }

    /// Execute caller-written SQL, classified by its leading keyword.
    pub async fn execute_sql(&mut self, sql: &str) -> DbResult<ExecuteResult> {
        self.execute(&Statement::raw(sql)).await
    }

    /// Close the connection and wait for the connection task to finish.
    pub async fn close(self) -> DbResult<()> {
        let Self {
            database,
            client,
            driver,
            ..
        } = self;

        drop(client);
        driver
            .await
            .map_err(|e| DbError::connection(format!("connection task failed: {e}")))?;
        info!(target: "studentdb", database = %database, "connection closed");
        Ok(())
    }

    fn log_statement(&self, statement: &Statement, elapsed: Duration, result: &ExecuteResult) {
        let plan = LogPlan::decide(&self.config, elapsed);
        if !plan.debug && !plan.slow {
            return;
        }

        let sql = truncate_sql_bytes(statement.sql(), MAX_LOGGED_SQL);
        let kind = statement.kind().as_str();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        if plan.debug {
            debug!(
                target: "studentdb.sql",
                kind,
                database = %self.database,
                elapsed_ms,
                rows = ?result.row_count(),
                sql = %sql,
            );
        }

        if plan.slow {
            warn!(
                target: "studentdb.sql",
                kind,
                elapsed_ms,
                threshold_ms = self
                    .config
                    .slow_statement_threshold
                    .map_or(0, |t| t.as_millis() as u64),
                sql = %sql,
                "slow statement"
            );
        }
    }
}

/// Which log events a finished statement emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogPlan {
    /// Per-statement debug event (`log_statements`).
    debug: bool,
    /// Slow-statement warning (`elapsed >= slow_statement_threshold`).
    slow: bool,
}

impl LogPlan {
    fn decide(config: &StoreConfig, elapsed: Duration) -> Self {
        Self {
            debug: config.log_statements,
            slow: config
                .slow_statement_threshold
                .is_some_and(|threshold| elapsed >= threshold),
        }
    }
}

impl std::fmt::Debug for StudentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudentStore")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("user", &self.config.user)
            .field("database", &self.database)
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

async fn open(config: &StoreConfig, dbname: &str) -> DbResult<(Client, JoinHandle<()>)> {
    let (client, connection) = config.pg_config(dbname).connect(NoTls).await.map_err(|e| {
        DbError::connection(format!(
            "failed to connect to {}:{}/{dbname} as {}: {e}",
            config.host, config.port, config.user
        ))
    })?;

    let driver = tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!(target: "studentdb", error = %e, "connection error");
        }
    });

    info!(
        target: "studentdb",
        host = %config.host,
        port = config.port,
        database = dbname,
        "connected"
    );
    Ok((client, driver))
}

/// Quote an identifier, doubling embedded `"`.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
