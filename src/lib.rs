//! Core library surface for the Student Registry TUI application.
//!
//! The binary wires these pieces together; tests and other tooling can drive
//! a [`Session`] directly without a terminal.
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;

/// Persistence entry points used at startup.
pub use db::{open_in_memory, open_store};

pub use config::Config;
pub use error::{CommandError, StoreError};
pub use form::{FieldSet, ValidationError};
pub use models::{Branch, ChangeSet, Course, Gender, SearchFilters, StudentField, StudentRecord};
pub use session::{Outcome, PendingDelete, Session};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
