use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, Error as SqlError, ErrorCode, Row};
use tracing::debug;

use crate::error::StoreError;
use crate::models::{ChangeSet, SearchFilters, StudentField, StudentRecord};

/// Column list shared by every read so `row_to_student` can index by position.
const SELECT_STUDENTS: &str = "SELECT first_name, last_name, roll_number, email, mobile, \
     alt_mobile, branch, course, gender, dob, address FROM students";

/// True when a record with this roll number is present.
pub fn student_exists(conn: &Connection, roll_number: &str) -> Result<bool, StoreError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE roll_number = ?1)",
        [roll_number],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn count_students(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Persist all eleven fields in a single statement. Duplicate roll numbers are
/// refused up front and, should one slip in between the check and the write,
/// by the unique constraint.
pub fn insert_student(conn: &Connection, record: &StudentRecord) -> Result<(), StoreError> {
    if student_exists(conn, &record.roll_number)? {
        return Err(StoreError::DuplicateKey(record.roll_number.clone()));
    }

    conn.execute(
        "INSERT INTO students (first_name, last_name, roll_number, email, mobile, alt_mobile,
                               branch, course, gender, dob, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.first_name,
            record.last_name,
            record.roll_number,
            record.email,
            record.mobile,
            record.alt_mobile,
            record.branch,
            record.course,
            record.gender,
            record.value(StudentField::Dob),
            record.address,
        ],
    )
    .map_err(|err| map_unique_constraint(err, &record.roll_number))?;

    debug!(roll_number = %record.roll_number, "student inserted");
    Ok(())
}

/// Every record in insertion order, which is the order the list shows them in.
pub fn fetch_students(conn: &Connection) -> Result<Vec<StudentRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_STUDENTS} ORDER BY rowid"))?;
    let students = stmt
        .query_map([], row_to_student)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

/// Records matching every filter. Each filter is a substring match (`LIKE`,
/// so ASCII letters compare case-insensitively); wildcard characters in the
/// filter text match literally.
pub fn search_students(
    conn: &Connection,
    filters: &SearchFilters,
) -> Result<Vec<StudentRecord>, StoreError> {
    let mut sql = format!("{SELECT_STUDENTS} WHERE 1=1");
    let mut patterns = Vec::with_capacity(filters.len());
    for (index, (field, value)) in filters.iter().enumerate() {
        sql.push_str(&format!(
            " AND {} LIKE ?{} ESCAPE '\\'",
            field.column(),
            index + 1
        ));
        patterns.push(format!("%{}%", escape_like(value)));
    }
    sql.push_str(" ORDER BY rowid");
    debug!(filters = filters.len(), "searching students");

    let mut stmt = conn.prepare(&sql)?;
    let students = stmt
        .query_map(params_from_iter(patterns.iter()), row_to_student)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

/// Write only the columns in `changes` for the record keyed by `roll_number`.
/// An empty change set is refused rather than silently succeeding.
pub fn update_student(
    conn: &Connection,
    roll_number: &str,
    changes: &ChangeSet,
) -> Result<(), StoreError> {
    if changes.is_empty() {
        return Err(StoreError::NoOp);
    }
    if changes.fields().any(|field| field == StudentField::RollNumber) {
        return Err(StoreError::ImmutableKey);
    }

    let assignments = changes
        .fields()
        .enumerate()
        .map(|(index, field)| format!("{} = ?{}", field.column(), index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE students SET {assignments} WHERE roll_number = ?{}",
        changes.len() + 1
    );

    let mut values: Vec<&dyn ToSql> = changes.iter().map(|(_, value)| value as &dyn ToSql).collect();
    values.push(&roll_number);

    let updated = conn.execute(&sql, values.as_slice())?;
    if updated == 0 {
        Err(StoreError::NotFound(roll_number.to_string()))
    } else {
        debug!(roll_number, columns = changes.len(), "student updated");
        Ok(())
    }
}

/// Remove a record permanently.
pub fn delete_student(conn: &Connection, roll_number: &str) -> Result<(), StoreError> {
    let deleted = conn.execute(
        "DELETE FROM students WHERE roll_number = ?1",
        [roll_number],
    )?;

    if deleted == 0 {
        Err(StoreError::NotFound(roll_number.to_string()))
    } else {
        debug!(roll_number, "student deleted");
        Ok(())
    }
}

fn row_to_student(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        first_name: row.get(0)?,
        last_name: row.get(1)?,
        roll_number: row.get(2)?,
        email: row.get(3)?,
        mobile: row.get(4)?,
        alt_mobile: row.get(5)?,
        branch: row.get(6)?,
        course: row.get(7)?,
        gender: row.get(8)?,
        dob: row.get(9)?,
        address: row.get(10)?,
    })
}

/// Escape `LIKE` metacharacters so user text is matched verbatim.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// The only constraint on the table is roll number uniqueness, so any
/// constraint violation on insert is reported as a duplicate key.
fn map_unique_constraint(err: SqlError, roll_number: &str) -> StoreError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        StoreError::DuplicateKey(roll_number.to_string())
    } else {
        err.into()
    }
}
