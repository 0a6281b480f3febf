use tracing::{info, warn};

use super::Session;
use crate::db::{delete_student, insert_student, student_exists, update_student};
use crate::error::{CommandError, StoreError};
use crate::form::validate;
use crate::models::{ChangeSet, StudentRecord};

/// What a completed command did, for the notice or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved { roll_number: String },
    Updated { roll_number: String, fields: usize },
    Deleted { roll_number: String },
    Searched { matches: usize },
    Cleared { records: usize },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Saved { .. } => "Record Saved".to_string(),
            Outcome::Updated { .. } => "Record Updated".to_string(),
            Outcome::Deleted { .. } => "Record Deleted".to_string(),
            Outcome::Searched { matches: 1 } => "1 matching record.".to_string(),
            Outcome::Searched { matches } => format!("{matches} matching records."),
            Outcome::Cleared { records } => format!("Form cleared. {records} records."),
        }
    }

    /// Writes are confirmed with a dialog; reads only touch the status line.
    pub fn needs_notice(&self) -> bool {
        matches!(
            self,
            Outcome::Saved { .. } | Outcome::Updated { .. } | Outcome::Deleted { .. }
        )
    }
}

/// A deletion waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    record: StudentRecord,
}

impl PendingDelete {
    pub fn record(&self) -> &StudentRecord {
        &self.record
    }

    pub fn prompt(&self) -> String {
        format!(
            "Delete {} {} (roll number {})?",
            self.record.first_name, self.record.last_name, self.record.roll_number
        )
    }
}

impl Session {
    /// Insert the form as a new record. Save never edits: a row pulled in from
    /// the list is inserted again and so fails on its roll number.
    pub fn save(&mut self) -> Result<Outcome, CommandError> {
        let record = validate(&self.form).inspect_err(|err| warn!(%err, "save rejected"))?;

        match student_exists(&self.conn, &record.roll_number) {
            Ok(false) => {}
            Ok(true) => {
                warn!(roll_number = %record.roll_number, "save rejected: duplicate roll number");
                return Err(CommandError::DuplicateKey(record.roll_number));
            }
            Err(err) => return Err(self.fail_and_reload("save", err)),
        }

        match insert_student(&self.conn, &record) {
            Ok(()) => {}
            Err(StoreError::DuplicateKey(roll_number)) => {
                return Err(CommandError::DuplicateKey(roll_number));
            }
            Err(err) => return Err(self.fail_and_reload("save", err)),
        }

        info!(roll_number = %record.roll_number, "record saved");
        self.form.reset();
        self.reload_quietly("save");
        Ok(Outcome::Saved {
            roll_number: record.roll_number,
        })
    }

    /// Write the fields that differ between the form and the selected row.
    pub fn update(&mut self) -> Result<Outcome, CommandError> {
        let snapshot = self
            .records
            .selected()
            .cloned()
            .ok_or(CommandError::Selection("update"))?;
        let record = validate(&self.form).inspect_err(|err| warn!(%err, "update rejected"))?;

        let changes = ChangeSet::between(&snapshot, &record);
        if changes.is_empty() {
            return Err(CommandError::NoChanges);
        }

        if let Err(err) = update_student(&self.conn, &snapshot.roll_number, &changes) {
            return Err(self.fail_and_reload("update", err));
        }

        info!(
            roll_number = %snapshot.roll_number,
            fields = changes.len(),
            "record updated"
        );
        self.form.reset();
        self.reload_quietly("update");
        Ok(Outcome::Updated {
            roll_number: snapshot.roll_number,
            fields: changes.len(),
        })
    }

    /// First half of a delete: capture the selected row for confirmation.
    pub fn begin_delete(&self) -> Result<PendingDelete, CommandError> {
        self.records
            .selected()
            .cloned()
            .map(|record| PendingDelete { record })
            .ok_or(CommandError::Selection("delete"))
    }

    /// Second half of a delete, after the user confirmed. The form is reset
    /// and the list reloaded whether or not the delete succeeded.
    pub fn confirm_delete(&mut self, pending: PendingDelete) -> Result<Outcome, CommandError> {
        let roll_number = pending.record.roll_number;
        let deleted = delete_student(&self.conn, &roll_number)
            .map_err(|err| CommandError::from_store("delete", err));
        match &deleted {
            Ok(()) => info!(%roll_number, "record deleted"),
            Err(err) => warn!(%roll_number, %err, "delete failed"),
        }

        self.form.reset();
        self.reload_quietly("delete");
        deleted.map(|()| Outcome::Deleted { roll_number })
    }

    /// Show the records matching the filled-in fields. Reads only.
    pub fn search(&mut self) -> Result<Outcome, CommandError> {
        let filters = self.form.filters();
        let matches = self
            .records
            .apply_filter(&self.conn, &filters)
            .inspect_err(|err| warn!(%err, "search failed"))?;
        info!(filters = filters.len(), matches, "search applied");
        Ok(Outcome::Searched { matches })
    }

    /// Empty the form, drop the selection, and show every record again.
    pub fn clear(&mut self) -> Result<Outcome, CommandError> {
        self.form.reset();
        self.records.clear_selection();
        let records = self.reload()?;
        Ok(Outcome::Cleared { records })
    }

    fn fail_and_reload(&mut self, action: &'static str, err: StoreError) -> CommandError {
        warn!(action, %err, "command failed");
        self.reload_quietly(action);
        CommandError::from_store(action, err)
    }
}
