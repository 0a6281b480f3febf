//! The editable form: one record-shaped buffer of typed fields plus the focus
//! cursor, and the validation that gates every write.

mod field;
mod validate;

use chrono::{Local, NaiveDate};

use crate::models::{Branch, Course, Gender, SearchFilters, StudentField, StudentRecord};

pub use field::{DateStep, Field};
pub use validate::{check_field, validate, ValidationError};

/// Today's date in the local timezone, the default for the DOB field.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The eleven inputs of a student record, held in `StudentField::FORM_ORDER`.
/// Empty means every text is blank, no choice is selected, and the date is
/// today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    slots: Vec<(StudentField, Field)>,
    focus: usize,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSet {
    pub fn new() -> Self {
        Self::with_date(today())
    }

    /// Empty form whose date field starts at `date`.
    pub fn with_date(date: NaiveDate) -> Self {
        let slots = StudentField::FORM_ORDER
            .iter()
            .map(|field| (*field, empty_field(*field, date)))
            .collect();
        Self { slots, focus: 0 }
    }

    pub fn get(&self, field: StudentField) -> &Field {
        &self.slots[slot_index(field)].1
    }

    pub fn get_mut(&mut self, field: StudentField) -> &mut Field {
        &mut self.slots[slot_index(field)].1
    }

    /// Fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = &(StudentField, Field)> {
        self.slots.iter()
    }

    /// Current text of a text field; empty for other kinds.
    pub fn text(&self, field: StudentField) -> &str {
        match self.get(field) {
            Field::Text(value) => value,
            _ => "",
        }
    }

    /// Replace a text field's contents.
    pub fn set_text(&mut self, field: StudentField, value: impl Into<String>) {
        if let Field::Text(current) = self.get_mut(field) {
            *current = value.into();
        }
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        *self.get_mut(StudentField::Dob) = Field::Date(date);
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self.get(StudentField::Dob) {
            Field::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn select_branch(&mut self, branch: Option<Branch>) {
        self.select(StudentField::Branch, branch.map(Branch::index));
    }

    pub fn select_course(&mut self, course: Option<Course>) {
        self.select(StudentField::Course, course.map(Course::index));
    }

    pub fn select_gender(&mut self, gender: Option<Gender>) {
        self.select(StudentField::Gender, gender.map(Gender::index));
    }

    pub fn branch(&self) -> Option<Branch> {
        self.selected_index(StudentField::Branch)
            .and_then(|index| Branch::ALL.get(index).copied())
    }

    pub fn course(&self) -> Option<Course> {
        self.selected_index(StudentField::Course)
            .and_then(|index| Course::ALL.get(index).copied())
    }

    pub fn gender(&self) -> Option<Gender> {
        self.selected_index(StudentField::Gender)
            .and_then(|index| Gender::ALL.get(index).copied())
    }

    /// Copy a record into the form, selecting its options and date.
    pub fn populate(&mut self, record: &StudentRecord) {
        for (field, slot) in self.slots.iter_mut() {
            *slot = match &*slot {
                Field::Text(_) => Field::Text(record.value(*field).to_string()),
                Field::Choice { options, .. } => {
                    let mut choice = Field::choice(*options);
                    choice.select_label(&record.value(*field).to_string());
                    choice
                }
                Field::Date(_) => Field::Date(record.dob),
            };
        }
    }

    /// Clear every field and move focus back to the first one.
    pub fn reset(&mut self) {
        self.reset_to(today());
    }

    /// Empty every field and put the date back to `date`.
    pub fn reset_to(&mut self, date: NaiveDate) {
        for (_, slot) in self.slots.iter_mut() {
            slot.reset(date);
        }
        self.focus = 0;
    }

    /// True when the form matches a freshly reset one.
    pub fn is_cleared(&self) -> bool {
        self.is_cleared_on(today())
    }

    pub fn is_cleared_on(&self, day: NaiveDate) -> bool {
        self.slots.iter().all(|(_, slot)| match slot {
            Field::Date(date) => *date == day,
            other => other.is_blank() && other.display().is_empty(),
        })
    }

    /// Filters for a search: every non-blank text field plus any selected
    /// branch, course, or gender. The date always holds a value, so it never
    /// participates.
    pub fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new();
        for (field, slot) in &self.slots {
            match slot {
                Field::Text(value) => filters.insert(*field, value.as_str()),
                Field::Choice { .. } => {
                    if let Some(label) = slot.selected_label() {
                        filters.insert(*field, label);
                    }
                }
                Field::Date(_) => {}
            }
        }
        filters
    }

    pub fn focused(&self) -> StudentField {
        self.slots[self.focus].0
    }

    pub fn focus(&mut self, field: StudentField) {
        self.focus = slot_index(field);
    }

    /// Advance focus; returns false when it wrapped past the last field.
    pub fn focus_next(&mut self) -> bool {
        self.focus = (self.focus + 1) % self.slots.len();
        self.focus != 0
    }

    /// Step focus backwards; returns false when it wrapped past the first field.
    pub fn focus_prev(&mut self) -> bool {
        let wrapped = self.focus == 0;
        self.focus = self.focus.checked_sub(1).unwrap_or(self.slots.len() - 1);
        !wrapped
    }

    pub fn focus_first(&mut self) {
        self.focus = 0;
    }

    pub fn focus_last(&mut self) {
        self.focus = self.slots.len() - 1;
    }

    pub fn focused_field(&self) -> &Field {
        &self.slots[self.focus].1
    }

    pub fn focused_field_mut(&mut self) -> &mut Field {
        &mut self.slots[self.focus].1
    }

    fn select(&mut self, field: StudentField, index: Option<usize>) {
        if let Field::Choice { selected, options } = self.get_mut(field) {
            *selected = index.filter(|index| *index < options.len());
        }
    }

    fn selected_index(&self, field: StudentField) -> Option<usize> {
        match self.get(field) {
            Field::Choice { selected, .. } => *selected,
            _ => None,
        }
    }
}

fn empty_field(field: StudentField, date: NaiveDate) -> Field {
    match field {
        StudentField::Branch => Field::choice(Branch::LABELS),
        StudentField::Course => Field::choice(Course::LABELS),
        StudentField::Gender => Field::choice(Gender::LABELS),
        StudentField::Dob => Field::Date(date),
        _ => Field::Text(String::new()),
    }
}

fn slot_index(field: StudentField) -> usize {
    StudentField::FORM_ORDER
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::tests::sample_record;

    /// A form holding `sample_record(roll_number)`.
    pub(crate) fn filled_form(roll_number: &str) -> FieldSet {
        let mut form = FieldSet::new();
        form.populate(&sample_record(roll_number));
        form
    }

    #[test]
    fn new_form_is_cleared_and_dated() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let form = FieldSet::with_date(day);
        assert!(form.is_cleared_on(day));
        assert!(!form.is_cleared_on(day.succ_opt().unwrap()));
        assert_eq!(form.date(), Some(day));
        assert_eq!(form.focused(), StudentField::FirstName);
    }

    #[test]
    fn populate_selects_options_and_date() {
        let record = sample_record("R7");
        let form = filled_form("R7");

        assert_eq!(form.text(StudentField::RollNumber), "R7");
        assert_eq!(form.text(StudentField::Address), record.address);
        assert_eq!(form.branch(), Some(record.branch));
        assert_eq!(form.course(), Some(record.course));
        assert_eq!(form.gender(), Some(record.gender));
        assert_eq!(form.date(), Some(record.dob));
    }

    #[test]
    fn reset_clears_populated_form() {
        let mut form = filled_form("R7");
        form.focus(StudentField::Course);
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        form.reset_to(day);

        assert!(form.is_cleared_on(day));
        assert_eq!(form, FieldSet::with_date(day));
    }

    #[test]
    fn filters_skip_blank_fields_and_date() {
        let mut form = FieldSet::new();
        form.set_text(StudentField::FirstName, "Ad");
        form.set_text(StudentField::Email, "  ");
        form.select_branch(Some(Branch::Cse));

        let filters = form.filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.get(StudentField::FirstName), Some("Ad"));
        assert_eq!(filters.get(StudentField::Branch), Some("CSE"));
        assert_eq!(filters.get(StudentField::Dob), None);
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = FieldSet::new();
        assert!(!form.focus_prev());
        assert_eq!(form.focused(), StudentField::Course);
        assert!(!form.focus_next());
        assert_eq!(form.focused(), StudentField::FirstName);
        assert!(form.focus_next());
        assert_eq!(form.focused(), StudentField::LastName);
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = FieldSet::new();
        form.focus(StudentField::Mobile);
        form.focused_field_mut().push_char('9');
        assert_eq!(form.text(StudentField::Mobile), "9");

        form.focus(StudentField::Gender);
        assert!(!form.focused_field_mut().push_char('x'));
        form.focused_field_mut().cycle(1);
        assert_eq!(form.gender(), Some(Gender::Male));
    }
}
