use chrono::{Days, Months, NaiveDate};

/// How far a date adjustment moves the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStep {
    Day,
    Month,
    Year,
}

/// One editable input in the form. The tag decides how keys, validation, and
/// population treat the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Free text, validated as non-blank after trimming.
    Text(String),
    /// Single choice among fixed `options`; `selected` indexes into them.
    Choice {
        selected: Option<usize>,
        options: &'static [&'static str],
    },
    /// Calendar date; always holds a value.
    Date(NaiveDate),
}

impl Field {
    pub fn choice(options: &'static [&'static str]) -> Self {
        Field::Choice {
            selected: None,
            options,
        }
    }

    /// Empty text or an unselected choice. A date is never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Field::Text(value) => value.trim().is_empty(),
            Field::Choice { selected, .. } => selected.is_none(),
            Field::Date(_) => false,
        }
    }

    /// Append a typed character. Only text fields accept input.
    pub fn push_char(&mut self, ch: char) -> bool {
        match self {
            Field::Text(value) if !ch.is_control() => {
                value.push(ch);
                true
            }
            _ => false,
        }
    }

    /// Delete the last character, or unselect a choice.
    pub fn backspace(&mut self) {
        match self {
            Field::Text(value) => {
                value.pop();
            }
            Field::Choice { selected, .. } => *selected = None,
            Field::Date(_) => {}
        }
    }

    /// Move a choice selection by `delta`, wrapping around. From the
    /// unselected state, forward lands on the first option and backward on the
    /// last.
    pub fn cycle(&mut self, delta: isize) {
        if let Field::Choice { selected, options } = self {
            let len = options.len() as isize;
            if len == 0 {
                return;
            }
            let next = match *selected {
                None if delta >= 0 => 0,
                None => len - 1,
                Some(index) => (index as isize + delta).rem_euclid(len),
            };
            *selected = Some(next as usize);
        }
    }

    /// Select the option whose label matches. Unknown labels unselect.
    pub fn select_label(&mut self, label: &str) {
        if let Field::Choice { selected, options } = self {
            *selected = options.iter().position(|option| *option == label);
        }
    }

    /// Shift a date by `delta` steps. Moves that would leave chrono's range are
    /// ignored; month arithmetic clamps to the end of shorter months.
    pub fn step_date(&mut self, step: DateStep, delta: i32) {
        let Field::Date(date) = self else {
            return;
        };
        let magnitude = delta.unsigned_abs();
        let shifted = match step {
            DateStep::Day if delta >= 0 => date.checked_add_days(Days::new(u64::from(magnitude))),
            DateStep::Day => date.checked_sub_days(Days::new(u64::from(magnitude))),
            DateStep::Month if delta >= 0 => date.checked_add_months(Months::new(magnitude)),
            DateStep::Month => date.checked_sub_months(Months::new(magnitude)),
            DateStep::Year if delta >= 0 => {
                date.checked_add_months(Months::new(magnitude.saturating_mul(12)))
            }
            DateStep::Year => date.checked_sub_months(Months::new(magnitude.saturating_mul(12))),
        };
        if let Some(shifted) = shifted {
            *date = shifted;
        }
    }

    pub fn selected_label(&self) -> Option<&'static str> {
        match self {
            Field::Choice {
                selected: Some(index),
                options,
            } => options.get(*index).copied(),
            _ => None,
        }
    }

    /// Text shown in the form; empty for blank fields.
    pub fn display(&self) -> String {
        match self {
            Field::Text(value) => value.clone(),
            Field::Choice { .. } => self.selected_label().unwrap_or_default().to_string(),
            Field::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Return to the empty state: no text, no selection, `today` for dates.
    pub fn reset(&mut self, today: NaiveDate) {
        match self {
            Field::Text(value) => value.clear(),
            Field::Choice { selected, .. } => *selected = None,
            Field::Date(date) => *date = today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: &[&str] = &["Male", "Female", "Other"];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn text_accepts_printable_characters_only() {
        let mut field = Field::Text(String::new());
        assert!(field.push_char('a'));
        assert!(!field.push_char('\n'));
        field.backspace();
        assert!(field.is_blank());
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(Field::Text("   ".into()).is_blank());
        assert!(!Field::Date(date(2000, 1, 1)).is_blank());
    }

    #[test]
    fn choice_cycles_and_wraps() {
        let mut field = Field::choice(OPTIONS);
        field.cycle(-1);
        assert_eq!(field.selected_label(), Some("Other"));
        field.cycle(1);
        assert_eq!(field.selected_label(), Some("Male"));
        field.backspace();
        assert!(field.is_blank());
        field.cycle(1);
        assert_eq!(field.selected_label(), Some("Male"));
    }

    #[test]
    fn select_label_unknown_unselects() {
        let mut field = Field::choice(OPTIONS);
        field.select_label("Female");
        assert_eq!(field.display(), "Female");
        field.select_label("Robot");
        assert!(field.is_blank());
    }

    #[test]
    fn date_steps_clamp_month_ends() {
        let mut field = Field::Date(date(2000, 1, 31));
        field.step_date(DateStep::Month, 1);
        assert_eq!(field, Field::Date(date(2000, 2, 29)));
        field.step_date(DateStep::Year, -1);
        assert_eq!(field, Field::Date(date(1999, 2, 28)));
        field.step_date(DateStep::Day, 1);
        assert_eq!(field.display(), "1999-03-01");
    }

    #[test]
    fn reset_restores_empty_state() {
        let today = date(2024, 5, 6);
        let mut field = Field::Date(date(2000, 1, 1));
        field.reset(today);
        assert_eq!(field, Field::Date(today));

        let mut field = Field::Text("x".into());
        field.reset(today);
        assert_eq!(field, Field::Text(String::new()));
    }
}
