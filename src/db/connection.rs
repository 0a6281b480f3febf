use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreError;

/// Ensure the database file exists, create the `students` table when missing,
/// and return the live connection. This is the only place a connection is
/// opened; the session keeps it for the lifetime of the process.
pub fn open_store(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| StoreError::Connection {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Private, throwaway database with the same schema. Used by tests and handy
/// for demos.
pub fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `students` table. `roll_number` carries the uniqueness guarantee
/// that `insert_student` relies on; `dob` holds ISO 8601 text.
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            roll_number TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            mobile TEXT NOT NULL,
            alt_mobile TEXT NOT NULL,
            branch TEXT NOT NULL,
            course TEXT NOT NULL,
            gender TEXT NOT NULL,
            dob TEXT NOT NULL,
            address TEXT NOT NULL
        )",
        [],
    )?;
    debug!("students schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('students')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 11);
    }

    #[test]
    fn open_store_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("students.sqlite");

        let conn = open_store(&path).unwrap();
        drop(conn);
        assert!(path.exists());
    }
}
