use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use log::{debug, info};

use crate::app::{config::Config, AppError};

embed_migrations!("migrations");

no_arg_sql_function!(
    last_insert_rowid,
    BigInt,
    "Rowid of the most recent successful INSERT on this connection"
);

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

const MEMORY_URL: &str = ":memory:";
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Per-connection settings. SQLite leaves foreign keys off unless asked.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            busy_timeout_ms: BUSY_TIMEOUT_MS,
        }
    }
}

impl ConnectionOptions {
    pub fn apply(&self, conn: &SqliteConnection) -> QueryResult<()> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        self.apply(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool described by `config`.
/// Every connection handed out has foreign keys enforced.
///
/// An in-memory database only exists inside one connection, so `:memory:`
/// pools are capped at a single connection.
pub fn build_pool(config: &Config) -> Result<DbPool, AppError> {
    let size = if config.database_url == MEMORY_URL {
        1
    } else {
        config.pool_size
    };
    let manager = ConnectionManager::<SqliteConnection>::new(config.database_url.as_str());
    let pool = Pool::builder()
        .max_size(size)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)?;

    info!("connection pool ready for {} ({} connections)", config.database_url, size);
    Ok(pool)
}

/// Return a single connection to the database at `database_url`,
/// with foreign keys enforced.
///
/// # Example
/// ```no_run
/// let conn = blogsite_schema::database::db_utils::establish("blog.db")?;
/// # Ok::<(), blogsite_schema::app::AppError>(())
/// ```
pub fn establish(database_url: &str) -> Result<SqliteConnection, AppError> {
    let conn = SqliteConnection::establish(database_url)?;
    ConnectionOptions::default().apply(&conn)?;
    Ok(conn)
}

/** Opens a fresh in-memory database with every migration applied */
pub fn establish_in_memory() -> Result<SqliteConnection, AppError> {
    let conn = establish(MEMORY_URL)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/** Applies the embedded migrations that have not run yet */
pub fn run_migrations(conn: &SqliteConnection) -> Result<(), AppError> {
    embedded_migrations::run(conn)?;
    debug!("schema migrations applied");
    Ok(())
}

pub(crate) fn last_insert_id(conn: &SqliteConnection) -> QueryResult<i64> {
    diesel::select(last_insert_rowid).get_result(conn)
}

/// Categories and tags keep 32-bit keys even though SQLite rowids are 64-bit.
pub(crate) fn narrow_id(table: &str, rowid: i64) -> Result<i32, AppError> {
    i32::try_from(rowid)
        .map_err(|_| AppError::DomainViolation(format!("{}.id {} exceeds the integer range", table, rowid)))
}
