//! Error taxonomy shared by the store, the command handlers, and the UI.

use std::path::PathBuf;

use thiserror::Error;

use crate::form::ValidationError;

/// Failures reported by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A record with roll number {0} already exists.")]
    DuplicateKey(String),
    #[error("No record with roll number {0} was found.")]
    NotFound(String),
    #[error("Nothing to update.")]
    NoOp,
    #[error("The roll number of an existing record cannot be changed.")]
    ImmutableKey,
    #[error("failed to create data directory {path}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open database {path}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    DataAccess(#[from] rusqlite::Error),
}

/// Outcome of a command handler that did not complete. Every variant is
/// recoverable: the UI shows it and returns to idle.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please select a record to {0}.")]
    Selection(&'static str),
    #[error("A record with this Roll Number already exists.")]
    DuplicateKey(String),
    #[error("No record with roll number {roll_number} was found.")]
    NotFound {
        action: &'static str,
        roll_number: String,
    },
    #[error("You must change at least one field to update.")]
    NoChanges,
    #[error("{0}")]
    DataAccess(#[source] StoreError),
}

impl CommandError {
    /// Title for the notice dialog that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            CommandError::Validation(_) => "Input Error",
            CommandError::Selection(_) => "Selection Error",
            CommandError::DuplicateKey(_) => "Duplicate Entry",
            CommandError::NotFound {
                action: "delete", ..
            } => "Delete Error",
            CommandError::NotFound { .. } | CommandError::NoChanges => "Update Error",
            CommandError::DataAccess(_) => "Database Error",
        }
    }

    /// Classify a store failure raised while performing `action`.
    pub fn from_store(action: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(roll) => CommandError::DuplicateKey(roll),
            StoreError::NotFound(roll_number) => CommandError::NotFound {
                action,
                roll_number,
            },
            StoreError::NoOp => CommandError::NoChanges,
            other => CommandError::DataAccess(other),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        CommandError::from_store("load", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_command_kinds() {
        assert!(matches!(
            CommandError::from(StoreError::DuplicateKey("R1".into())),
            CommandError::DuplicateKey(roll) if roll == "R1"
        ));
        assert!(matches!(
            CommandError::from(StoreError::NoOp),
            CommandError::NoChanges
        ));
        let err = CommandError::from(StoreError::DataAccess(rusqlite::Error::InvalidQuery));
        assert_eq!(err.title(), "Database Error");
    }

    #[test]
    fn missing_row_title_follows_the_action() {
        let delete = CommandError::from_store("delete", StoreError::NotFound("R9".into()));
        assert_eq!(delete.title(), "Delete Error");
        assert_eq!(delete.to_string(), "No record with roll number R9 was found.");

        let update = CommandError::from_store("update", StoreError::NotFound("R9".into()));
        assert_eq!(update.title(), "Update Error");
    }

    #[test]
    fn selection_message_names_the_action() {
        let err = CommandError::Selection("delete");
        assert_eq!(err.to_string(), "Please select a record to delete.");
        assert_eq!(err.title(), "Selection Error");
    }
}
