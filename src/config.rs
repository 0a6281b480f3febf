//! Startup configuration: where the database and the log files live.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-registry";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "students.sqlite";
/// Log folder, placed next to the database.
const LOG_DIR_NAME: &str = "logs";
/// Environment variable that points the application at a different database.
pub const DB_PATH_ENV: &str = "STUDENT_REGISTRY_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Resolve the configuration from the environment, falling back to the
    /// per-user data directory.
    pub fn load() -> Result<Self> {
        match env::var_os(DB_PATH_ENV).filter(|value| !value.is_empty()) {
            Some(path) => Ok(Self::for_database(PathBuf::from(path))),
            None => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                Ok(Self::in_data_dir(&base_dirs.home_dir().join(DATA_DIR_NAME)))
            }
        }
    }

    /// Default layout inside a data directory.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
        }
    }

    /// Explicit database path; logs go next to it.
    pub fn for_database(database_path: PathBuf) -> Self {
        let log_dir = database_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_DIR_NAME);
        Self {
            database_path,
            log_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_layout() {
        let config = Config::in_data_dir(Path::new("/home/op/.student-registry"));
        assert_eq!(
            config.database_path,
            PathBuf::from("/home/op/.student-registry/students.sqlite")
        );
        assert_eq!(config.log_dir, PathBuf::from("/home/op/.student-registry/logs"));
    }

    #[test]
    fn explicit_database_keeps_logs_alongside() {
        let config = Config::for_database(PathBuf::from("/srv/registry/db.sqlite"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/registry/logs"));
    }
}
