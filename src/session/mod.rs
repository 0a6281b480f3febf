//! The interactive session: the single owner of the database connection, the
//! form buffer, and the rows on screen. Command handlers live in `commands`
//! and take the session by `&mut self`, so nothing else holds this state.

mod commands;
mod list_view;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::{CommandError, StoreError};
use crate::form::FieldSet;

pub use commands::{Outcome, PendingDelete};
pub use list_view::ListView;

pub struct Session {
    conn: Connection,
    form: FieldSet,
    records: ListView,
}

impl Session {
    /// Wrap an open connection. The list starts empty; call [`Session::load`]
    /// to show the stored records.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            form: FieldSet::new(),
            records: ListView::new(),
        }
    }

    /// Populate the list with every stored record.
    pub fn load(&mut self) -> Result<usize, CommandError> {
        self.reload()
    }

    pub fn form(&self) -> &FieldSet {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FieldSet {
        &mut self.form
    }

    pub fn records(&self) -> &ListView {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut ListView {
        &mut self.records
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Pull row `index` into the form and make it the selection. Returns false
    /// when the index is out of range.
    pub fn activate_row(&mut self, index: usize) -> bool {
        match self.records.activate(index) {
            Some(record) => {
                self.form.populate(record);
                true
            }
            None => false,
        }
    }

    /// Close the connection, surfacing any error SQLite reports while doing so.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::DataAccess(err))?;
        info!("database closed");
        Ok(())
    }

    fn reload(&mut self) -> Result<usize, CommandError> {
        Ok(self.records.reload(&self.conn)?)
    }

    /// Refresh the list after `action` has finished. The action's own result
    /// is what the user sees, so a failure here only goes to the log.
    fn reload_quietly(&mut self, action: &'static str) {
        if let Err(err) = self.records.reload(&self.conn) {
            warn!(action, error = %err, "list refresh failed");
        }
    }
}
