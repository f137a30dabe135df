use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Opens (or creates) the SQLite file at `database_path` and creates the
/// schema before handing the pool out. Fails when the schema cannot be created.
///
/// # Example
///
/// ```no_run
/// use sierrabravo::storage::create_pool;
///
/// let pool = create_pool("sierrabravo.sqlite")?;
/// # Ok::<(), sierrabravo::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    migrate_schema(&conn).inspect_err(|e| log::error!("Failed to create schema in {}: {}", database_path, e))?;

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

fn migrate_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            user_id    INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
}

/// Records a chat id. Returns `true` when the row is new, `false` when the
/// user was already registered.
pub fn register_user(conn: &Connection, user_id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (user_id) VALUES (?1)",
        params![user_id],
    )?;
    Ok(inserted > 0)
}

pub fn is_registered(conn: &Connection, user_id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM users WHERE user_id = ?1",
        params![user_id],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pool() -> (TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, pool)
    }

    #[test]
    fn test_register_is_idempotent() {
        let (_dir, pool) = pool();
        let conn = get_connection(&pool).unwrap();

        assert!(!is_registered(&conn, 42).unwrap());
        assert!(register_user(&conn, 42).unwrap());
        assert!(!register_user(&conn, 42).unwrap());
        assert!(is_registered(&conn, 42).unwrap());
        assert_eq!(count_users(&conn).unwrap(), 1);
    }

    #[test]
    fn test_users_table_keyed_by_user_id() {
        let (_dir, pool) = pool();
        let conn = get_connection(&pool).unwrap();

        conn.execute("INSERT INTO users (user_id) VALUES (?1)", params![7]).unwrap();
        assert!(is_registered(&conn, 7).unwrap());
    }

    #[test]
    fn test_unusable_database_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite");
        std::fs::write(&path, "this is not an sqlite database\n".repeat(256)).unwrap();

        assert!(create_pool(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_schema_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite");
        let path = path.to_str().unwrap();

        {
            let pool = create_pool(path).unwrap();
            register_user(&get_connection(&pool).unwrap(), -1001).unwrap();
        }

        let pool = create_pool(path).unwrap();
        assert!(is_registered(&get_connection(&pool).unwrap(), -1001).unwrap());
    }
}
