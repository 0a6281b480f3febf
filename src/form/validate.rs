use thiserror::Error;

use super::{Field, FieldSet};
use crate::models::{StudentField, StudentRecord};

/// A required field is missing. `field` tells the UI where to move focus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: StudentField,
    pub message: String,
}

impl ValidationError {
    fn missing(field: StudentField) -> Self {
        let message = match field {
            StudentField::Branch | StudentField::Course | StudentField::Gender => {
                format!("Please select a valid {}.", field.label())
            }
            _ => format!("{} is required.", field.label()),
        };
        Self { field, message }
    }
}

/// Order in which choices are checked once every text field is filled.
const CHOICES: [StudentField; 3] = [
    StudentField::Branch,
    StudentField::Course,
    StudentField::Gender,
];

/// Gate for every write. Text fields are checked in form order, then branch,
/// course, and gender; the first gap wins. On success the trimmed values come
/// back as a typed record.
pub fn validate(form: &FieldSet) -> Result<StudentRecord, ValidationError> {
    for (field, slot) in form.iter() {
        if matches!(slot, Field::Text(_)) && slot.is_blank() {
            return Err(ValidationError::missing(*field));
        }
    }
    for field in CHOICES {
        check_field(form, field)?;
    }

    let text = |field: StudentField| form.text(field).trim().to_string();
    Ok(StudentRecord {
        first_name: text(StudentField::FirstName),
        last_name: text(StudentField::LastName),
        roll_number: text(StudentField::RollNumber),
        email: text(StudentField::Email),
        mobile: text(StudentField::Mobile),
        alt_mobile: text(StudentField::AltMobile),
        branch: form
            .branch()
            .ok_or_else(|| ValidationError::missing(StudentField::Branch))?,
        course: form
            .course()
            .ok_or_else(|| ValidationError::missing(StudentField::Course))?,
        gender: form
            .gender()
            .ok_or_else(|| ValidationError::missing(StudentField::Gender))?,
        dob: form
            .date()
            .ok_or_else(|| ValidationError::missing(StudentField::Dob))?,
        address: text(StudentField::Address),
    })
}

/// Check a single field, as done when Enter moves focus onward.
pub fn check_field(form: &FieldSet, field: StudentField) -> Result<(), ValidationError> {
    if form.get(field).is_blank() {
        Err(ValidationError::missing(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::tests::filled_form;
    use crate::models::tests::sample_record;

    #[test]
    fn complete_form_yields_trimmed_record() {
        let mut form = filled_form("R1");
        form.set_text(StudentField::FirstName, "  Ada ");

        assert_eq!(validate(&form).unwrap(), sample_record("R1"));
    }

    #[test]
    fn every_blank_text_field_is_reported() {
        for field in StudentField::FORM_ORDER {
            if !matches!(filled_form("R1").get(field), Field::Text(_)) {
                continue;
            }
            let mut form = filled_form("R1");
            form.set_text(field, "   ");

            let err = validate(&form).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.message, format!("{} is required.", field.label()));
        }
    }

    #[test]
    fn unselected_choices_are_reported() {
        let mut form = filled_form("R1");
        form.select_gender(None);
        let err = validate(&form).unwrap_err();
        assert_eq!(err.field, StudentField::Gender);
        assert_eq!(err.to_string(), "Please select a valid Gender.");

        form.select_branch(None);
        assert_eq!(validate(&form).unwrap_err().field, StudentField::Branch);
    }

    #[test]
    fn text_gaps_are_reported_before_choices() {
        let mut form = crate::form::FieldSet::new();
        form.set_text(StudentField::FirstName, "Ada");
        let err = validate(&form).unwrap_err();
        assert_eq!(err.field, StudentField::LastName);
    }

    #[test]
    fn single_field_check() {
        let form = filled_form("R1");
        assert!(check_field(&form, StudentField::Email).is_ok());

        let empty = crate::form::FieldSet::new();
        assert!(check_field(&empty, StudentField::Dob).is_ok());
        assert_eq!(
            check_field(&empty, StudentField::Course).unwrap_err().field,
            StudentField::Course
        );
    }
}
