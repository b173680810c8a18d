//! Connection configuration.
//!
//! A [`StoreConfig`] can be assembled with builder methods, read from `STUDENTDB_*`
//! environment variables, or loaded from a TOML file:
//!
//! ```toml
//! version = "1"
//!
//! [database]
//! user = "postgres"
//! password = "${PGPASSWORD}"
//! host = "localhost"
//! port = 5432
//! name = "university"
//! ```

use crate::error::{DbError, DbResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_MAINTENANCE_DATABASE: &str = "postgres";

/// Configuration for [`StudentStore`](crate::StudentStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Login used for every connection.
    pub user: String,
    /// Secret for `user`.
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Database to create (if absent) and bind to. `None` stays on the maintenance database.
    pub database: Option<String>,
    /// Database used for the bootstrap connection.
    pub maintenance_database: String,
    /// Connect timeout handed to the driver.
    pub connect_timeout: Option<Duration>,
    /// Whether to log executed statements.
    pub log_statements: bool,
    /// Statements slower than this are logged at WARN.
    pub slow_statement_threshold: Option<Duration>,
}

impl StoreConfig {
    /// Create a configuration for `localhost:5432` with defaults.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: None,
            maintenance_database: DEFAULT_MAINTENANCE_DATABASE.to_string(),
            connect_timeout: None,
            log_statements: true,
            slow_statement_threshold: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bind to `name`, creating it on connect when it does not exist.
    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    pub fn maintenance_database(mut self, name: impl Into<String>) -> Self {
        self.maintenance_database = name.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disable statement logging.
    pub fn no_statement_log(mut self) -> Self {
        self.log_statements = false;
        self
    }

    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_statement_threshold = Some(threshold);
        self
    }

    /// Read configuration from `STUDENTDB_*` environment variables.
    ///
    /// `STUDENTDB_USER` is required; `STUDENTDB_PASSWORD`, `STUDENTDB_HOST`,
    /// `STUDENTDB_PORT` and `STUDENTDB_DATABASE` are optional.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let user = lookup("STUDENTDB_USER")
            .ok_or_else(|| DbError::config("STUDENTDB_USER is not set"))?;
        let password = lookup("STUDENTDB_PASSWORD").unwrap_or_default();

        let mut config = Self::new(user, password);
        if let Some(host) = lookup("STUDENTDB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("STUDENTDB_PORT") {
            config.port = port
                .parse()
                .map_err(|e| DbError::config(format!("invalid STUDENTDB_PORT {port:?}: {e}")))?;
        }
        config.database = lookup("STUDENTDB_DATABASE").filter(|s| !s.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DbError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text, expanding `${VAR}` references.
    pub fn from_toml_str(raw: &str) -> DbResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| DbError::config(format!("failed to parse config: {e}")))?;
        file.into_config(|key| std::env::var(key).ok())
    }

    /// Check the fields a connection cannot do without.
    pub fn validate(&self) -> DbResult<()> {
        if self.user.trim().is_empty() {
            return Err(DbError::config("user must not be empty"));
        }
        if self.host.trim().is_empty() {
            return Err(DbError::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(DbError::config("port must not be 0"));
        }
        if self.maintenance_database.trim().is_empty() {
            return Err(DbError::config("maintenance_database must not be empty"));
        }
        if matches!(&self.database, Some(name) if name.trim().is_empty()) {
            return Err(DbError::config("database name must not be empty"));
        }
        Ok(())
    }

    /// Driver configuration bound to `dbname`.
    pub(crate) fn pg_config(&self, dbname: &str) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.user(&self.user)
            .password(&self.password)
            .host(&self.host)
            .port(self.port)
            .dbname(dbname)
            .application_name("studentdb");
        if let Some(timeout) = self.connect_timeout {
            pg.connect_timeout(timeout);
        }
        pg
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    version: Option<String>,
    database: DatabaseSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    user: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    name: Option<String>,
    maintenance_database: Option<String>,
    connect_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LoggingSection {
    #[serde(default = "default_true")]
    statements: bool,
    slow_statement_ms: Option<u64>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            statements: true,
            slow_statement_ms: None,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_true() -> bool {
    true
}

impl ConfigFile {
    fn into_config(self, lookup: impl Fn(&str) -> Option<String>) -> DbResult<StoreConfig> {
        if let Some(version) = &self.version {
            if version.trim() != "1" {
                return Err(DbError::config(format!("unsupported config version: {version}")));
            }
        }

        let db = self.database;
        let mut config = StoreConfig::new(
            expand_env_vars(&db.user, &lookup)?,
            expand_env_vars(&db.password, &lookup)?,
        )
        .host(expand_env_vars(&db.host, &lookup)?)
        .port(db.port);

        if let Some(name) = db.name {
            config.database = Some(expand_env_vars(&name, &lookup)?);
        }
        if let Some(name) = db.maintenance_database {
            config.maintenance_database = expand_env_vars(&name, &lookup)?;
        }
        config.connect_timeout = db.connect_timeout_ms.map(Duration::from_millis);
        config.log_statements = self.logging.statements;
        config.slow_statement_threshold = self.logging.slow_statement_ms.map(Duration::from_millis);

        config.validate()?;
        Ok(config)
    }
}

/// Replace `${VAR}` references with values from `lookup`.
fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> DbResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(DbError::config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(DbError::config("invalid env var reference: ${}"));
            }

            let v = lookup(&key).ok_or_else(|| {
                DbError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
