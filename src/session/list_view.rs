use rusqlite::Connection;

use crate::db::{fetch_students, search_students};
use crate::error::StoreError;
use crate::models::{SearchFilters, StudentRecord};

/// Rows currently on screen, mirroring the last query against the store.
///
/// Two positions are tracked: the `cursor` the user moves over the rows, and
/// the `selected` row that was last activated. Only the selection counts as
/// the target of update and delete, and every refresh drops it.
#[derive(Debug, Default)]
pub struct ListView {
    rows: Vec<StudentRecord>,
    cursor: usize,
    selected: Option<usize>,
    filtered: bool,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows with every stored record. The previous rows are gone
    /// even if the query fails.
    pub fn reload(&mut self, conn: &Connection) -> Result<usize, StoreError> {
        self.reset_rows(false);
        self.rows = fetch_students(conn)?;
        self.clamp_cursor();
        Ok(self.rows.len())
    }

    /// Replace the rows with the records matching `filters`.
    pub fn apply_filter(
        &mut self,
        conn: &Connection,
        filters: &SearchFilters,
    ) -> Result<usize, StoreError> {
        self.reset_rows(!filters.is_empty());
        self.rows = search_students(conn, filters)?;
        self.clamp_cursor();
        Ok(self.rows.len())
    }

    /// Mark `index` as the selected row and return its record.
    pub fn activate(&mut self, index: usize) -> Option<&StudentRecord> {
        let record = self.rows.get(index)?;
        self.selected = Some(index);
        self.cursor = index;
        Some(record)
    }

    pub fn selected(&self) -> Option<&StudentRecord> {
        self.selected.and_then(|index| self.rows.get(index))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn rows(&self) -> &[StudentRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the rows come from a search rather than the full table.
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, offset: isize) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = self.rows.len() as isize - 1;
        self.cursor = (self.cursor as isize + offset).clamp(0, max) as usize;
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    fn reset_rows(&mut self, filtered: bool) {
        self.rows.clear();
        self.selected = None;
        self.filtered = filtered;
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_student, open_in_memory};
    use crate::models::tests::sample_record;
    use crate::models::StudentField;

    fn store_with(rolls: &[&str]) -> Connection {
        let conn = open_in_memory().unwrap();
        for roll in rolls {
            insert_student(&conn, &sample_record(roll)).unwrap();
        }
        conn
    }

    #[test]
    fn reload_mirrors_the_store() {
        let conn = store_with(&["A", "B"]);
        let mut list = ListView::new();

        assert_eq!(list.reload(&conn).unwrap(), 2);
        assert_eq!(list.rows(), fetch_students(&conn).unwrap().as_slice());
        assert!(!list.is_filtered());
    }

    #[test]
    fn activation_selects_and_refresh_drops_selection() {
        let conn = store_with(&["A", "B"]);
        let mut list = ListView::new();
        list.reload(&conn).unwrap();

        assert_eq!(list.activate(1).unwrap().roll_number, "B");
        assert_eq!(list.selected().unwrap().roll_number, "B");
        assert!(list.activate(5).is_none());
        assert_eq!(list.selected_index(), Some(1));

        list.reload(&conn).unwrap();
        assert!(list.selected().is_none());
    }

    #[test]
    fn filter_replaces_rows() {
        let conn = store_with(&["A1", "B1", "A2"]);
        let mut list = ListView::new();
        list.reload(&conn).unwrap();
        list.cursor_last();

        let filters = SearchFilters::new().with(StudentField::RollNumber, "A");
        assert_eq!(list.apply_filter(&conn, &filters).unwrap(), 2);
        assert!(list.is_filtered());
        assert_eq!(list.cursor(), 1);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let conn = store_with(&["A", "B", "C"]);
        let mut list = ListView::new();
        list.move_cursor(3);
        assert_eq!(list.cursor(), 0);

        list.reload(&conn).unwrap();
        list.move_cursor(10);
        assert_eq!(list.cursor(), 2);
        list.move_cursor(-10);
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn failed_reload_leaves_no_stale_rows() {
        let conn = store_with(&["A"]);
        let mut list = ListView::new();
        list.reload(&conn).unwrap();

        conn.execute("DROP TABLE students", []).unwrap();
        assert!(list.reload(&conn).is_err());
        assert!(list.is_empty());
    }
}
