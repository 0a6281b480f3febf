//! Domain models that mirror the `students` table and get passed throughout
//! the TUI. These types stay light-weight data holders so the form, session,
//! and persistence layers can focus on their own concerns.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use thiserror::Error;

/// Raised when a stored or typed label does not name one of the fixed options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Declare one of the enumerated record attributes (branch, course, gender).
/// Every option round-trips through its display label, which is also the text
/// stored in SQLite.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every option in presentation order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            /// Display labels, index-aligned with `ALL`.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Position of this option inside `ALL`.
            pub fn index(self) -> usize {
                Self::ALL
                    .iter()
                    .position(|option| *option == self)
                    .unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.as_str() == value)
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|err| FromSqlError::Other(Box::new(err)))
            }
        }
    };
}

choice_enum!(
    /// Engineering branch the student is enrolled in.
    Branch, "branch" {
        Cse => "CSE",
        It => "IT",
        Ece => "ECE",
        Eee => "EEE",
        Mechanical => "Mechanical",
        Civil => "Civil",
    }
);

choice_enum!(
    /// Degree programme.
    Course, "course" {
        BTech => "B.Tech",
        MTech => "M.Tech",
        PhD => "PhD",
    }
);

choice_enum!(
    Gender, "gender" {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
);

/// Identifies one of the eleven columns of a student record. Filters, change
/// sets, validation errors, and form focus all address fields through this
/// closed set so column names never come from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StudentField {
    FirstName,
    LastName,
    RollNumber,
    Email,
    Mobile,
    AltMobile,
    Branch,
    Course,
    Gender,
    Dob,
    Address,
}

impl StudentField {
    /// Table column order, which is also the record list column order.
    pub const COLUMNS: [StudentField; 11] = [
        StudentField::FirstName,
        StudentField::LastName,
        StudentField::RollNumber,
        StudentField::Email,
        StudentField::Mobile,
        StudentField::AltMobile,
        StudentField::Branch,
        StudentField::Course,
        StudentField::Gender,
        StudentField::Dob,
        StudentField::Address,
    ];

    /// Order in which the form presents (and focuses) the fields: free text
    /// first, then the date and the three selectors.
    pub const FORM_ORDER: [StudentField; 11] = [
        StudentField::FirstName,
        StudentField::LastName,
        StudentField::RollNumber,
        StudentField::Email,
        StudentField::Mobile,
        StudentField::AltMobile,
        StudentField::Address,
        StudentField::Dob,
        StudentField::Gender,
        StudentField::Branch,
        StudentField::Course,
    ];

    /// SQL column name.
    pub fn column(self) -> &'static str {
        match self {
            StudentField::FirstName => "first_name",
            StudentField::LastName => "last_name",
            StudentField::RollNumber => "roll_number",
            StudentField::Email => "email",
            StudentField::Mobile => "mobile",
            StudentField::AltMobile => "alt_mobile",
            StudentField::Branch => "branch",
            StudentField::Course => "course",
            StudentField::Gender => "gender",
            StudentField::Dob => "dob",
            StudentField::Address => "address",
        }
    }

    /// Human-facing label used by the form and messages.
    pub fn label(self) -> &'static str {
        match self {
            StudentField::FirstName => "First Name",
            StudentField::LastName => "Last Name",
            StudentField::RollNumber => "Roll Number",
            StudentField::Email => "Email",
            StudentField::Mobile => "Mobile",
            StudentField::AltMobile => "Alternate Phone",
            StudentField::Branch => "Branch",
            StudentField::Course => "Course",
            StudentField::Gender => "Gender",
            StudentField::Dob => "DOB",
            StudentField::Address => "Address",
        }
    }

    /// Record list heading, built from the column name: each underscore-separated
    /// word is capitalised, and `dob` is an acronym.
    pub fn heading(self) -> String {
        if self == StudentField::Dob {
            return "DOB".to_string();
        }
        self.column()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One student registration row. All fields are mandatory; `roll_number` is the
/// immutable key used for update and delete targeting.
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub roll_number: String,
    pub email: String,
    pub mobile: String,
    pub alt_mobile: String,
    pub branch: Branch,
    pub course: Course,
    pub gender: Gender,
    /// Stored as ISO 8601 `YYYY-MM-DD` text.
    pub dob: NaiveDate,
    pub address: String,
}

impl StudentRecord {
    /// Typed value of a single column.
    pub fn value(&self, field: StudentField) -> FieldValue {
        match field {
            StudentField::FirstName => FieldValue::Text(self.first_name.clone()),
            StudentField::LastName => FieldValue::Text(self.last_name.clone()),
            StudentField::RollNumber => FieldValue::Text(self.roll_number.clone()),
            StudentField::Email => FieldValue::Text(self.email.clone()),
            StudentField::Mobile => FieldValue::Text(self.mobile.clone()),
            StudentField::AltMobile => FieldValue::Text(self.alt_mobile.clone()),
            StudentField::Branch => FieldValue::Branch(self.branch),
            StudentField::Course => FieldValue::Course(self.course),
            StudentField::Gender => FieldValue::Gender(self.gender),
            StudentField::Dob => FieldValue::Date(self.dob),
            StudentField::Address => FieldValue::Text(self.address.clone()),
        }
    }

    /// Values in `StudentField::COLUMNS` order, rendered as display text for
    /// the record list.
    pub fn cells(&self) -> Vec<String> {
        StudentField::COLUMNS
            .iter()
            .map(|field| self.value(*field).to_string())
            .collect()
    }
}

/// A single typed column value, bindable as a SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Branch(Branch),
    Course(Course),
    Gender(Gender),
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Branch(branch) => branch.fmt(f),
            FieldValue::Course(course) => course.fmt(f),
            FieldValue::Gender(gender) => gender.fmt(f),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Text(text) => Ok(ToSqlOutput::from(text.as_str())),
            FieldValue::Branch(branch) => branch.to_sql(),
            FieldValue::Course(course) => course.to_sql(),
            FieldValue::Gender(gender) => gender.to_sql(),
            FieldValue::Date(date) => Ok(ToSqlOutput::from(date.format("%Y-%m-%d").to_string())),
        }
    }
}

/// Column updates for an existing record. The roll number is never part of a
/// change set that `between` computes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<(StudentField, FieldValue)>,
}

impl ChangeSet {
    /// Diff two versions of the same record, keeping only the columns whose
    /// value differs in `after`.
    pub fn between(before: &StudentRecord, after: &StudentRecord) -> Self {
        let changes = StudentField::COLUMNS
            .iter()
            .copied()
            .filter(|field| *field != StudentField::RollNumber)
            .filter_map(|field| {
                let value = after.value(field);
                (before.value(field) != value).then_some((field, value))
            })
            .collect();
        Self { changes }
    }

    /// Set (or replace) a single column change.
    pub fn set(&mut self, field: StudentField, value: FieldValue) {
        if let Some(slot) = self.changes.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value;
        } else {
            self.changes.push((field, value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = StudentField> + '_ {
        self.changes.iter().map(|(field, _)| *field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StudentField, FieldValue)> {
        self.changes.iter()
    }
}

/// Substring filters for a search. Blank values are never stored, so an empty
/// filter set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    filters: Vec<(StudentField, String)>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`SearchFilters::insert`].
    pub fn with(mut self, field: StudentField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add a filter on `field`, replacing any earlier one. Whitespace-only
    /// values remove the filter instead.
    pub fn insert(&mut self, field: StudentField, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        self.filters.retain(|(f, _)| *f != field);
        if !value.is_empty() {
            self.filters.push((field, value.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, field: StudentField) -> Option<&str> {
        self.filters
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StudentField, String)> {
        self.filters.iter()
    }
}
