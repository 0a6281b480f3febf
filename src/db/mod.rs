//! Persistence module split across logical submodules. Every function wraps
//! one statement against the `students` table so the session layer can stay
//! focused on form and list state.

mod connection;
mod students;

pub use connection::{ensure_schema, open_in_memory, open_store};
pub use students::{
    count_students, delete_student, fetch_students, insert_student, search_students,
    student_exists, update_student,
};
