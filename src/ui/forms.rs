use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::error::CommandError;
use crate::form::Field;
use crate::models::StudentField;
use crate::session::PendingDelete;

/// Width reserved for field labels so values line up in each column.
pub(crate) const LABEL_WIDTH: usize = 16;

/// Render one form field as `Label: value`, highlighting the focused one.
pub(crate) fn build_field_line(field: StudentField, value: &Field, active: bool) -> Line<'static> {
    let label = format!("{:<width$}", format!("{}:", field.label()), width = LABEL_WIDTH);

    let style = if active {
        Style::default().fg(Color::Yellow)
    } else if value.is_blank() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::raw(label)];
    match value {
        Field::Text(text) if text.is_empty() => {
            spans.push(Span::styled("<required>", style));
        }
        Field::Text(text) => spans.push(Span::styled(text.clone(), style)),
        Field::Choice { .. } => {
            let shown = value
                .selected_label()
                .map(str::to_string)
                .unwrap_or_else(|| "<select>".to_string());
            if active {
                spans.push(Span::styled(format!("< {shown} >"), style));
            } else {
                spans.push(Span::styled(shown, style));
            }
        }
        Field::Date(_) => {
            spans.push(Span::styled(value.display(), style));
            if active {
                spans.push(Span::styled(
                    "  ←/→ day  PgUp/PgDn month  [/] year",
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
    }
    Line::from(spans)
}

/// Column offset of the text cursor inside a rendered text field line.
pub(crate) fn text_cursor_offset(value: &Field) -> usize {
    match value {
        Field::Text(text) => LABEL_WIDTH + text.chars().count(),
        _ => LABEL_WIDTH,
    }
}

/// Severity of a notice dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub(crate) fn style(self) -> Style {
        match self {
            NoticeKind::Info => Style::default().fg(Color::Green),
            NoticeKind::Warning => Style::default().fg(Color::Yellow),
            NoticeKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// A blocking message dialog. `focus` names the field to jump to once the
/// dialog is dismissed.
#[derive(Debug, Clone)]
pub(crate) struct Notice {
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) kind: NoticeKind,
    pub(crate) focus: Option<StudentField>,
}

impl Notice {
    pub(crate) fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: NoticeKind::Info,
            focus: None,
        }
    }

    /// Dialog for a failed command. Selection problems are warnings; input
    /// errors send focus back to the offending field.
    pub(crate) fn from_error(err: &CommandError) -> Self {
        let kind = match err {
            CommandError::Selection(_) => NoticeKind::Warning,
            _ => NoticeKind::Error,
        };
        let focus = match err {
            CommandError::Validation(validation) => Some(validation.field),
            _ => None,
        };
        Self {
            title: err.title().to_string(),
            message: err.to_string(),
            kind,
            focus,
        }
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                self.message.clone(),
                self.kind.style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or Esc to continue.",
                Style::default().fg(Color::Gray),
            )),
        ]
    }
}

/// Lines of the delete confirmation dialog.
pub(crate) fn confirm_delete_lines(pending: &PendingDelete) -> Vec<Line<'static>> {
    vec![
        Line::from(pending.prompt()),
        Line::from("This cannot be undone."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )),
    ]
}

/// Lines of the quit confirmation dialog.
pub(crate) fn confirm_quit_lines() -> Vec<Line<'static>> {
    vec![
        Line::from("Do you want to quit?"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Y to quit or N / Esc to stay.",
            Style::default().fg(Color::Gray),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidationError;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn blank_fields_show_placeholders() {
        let text = line_text(&build_field_line(
            StudentField::Email,
            &Field::Text(String::new()),
            false,
        ));
        assert!(text.starts_with("Email:"));
        assert!(text.ends_with("<required>"));

        let choice = Field::choice(&["Male", "Female"]);
        let text = line_text(&build_field_line(StudentField::Gender, &choice, true));
        assert!(text.ends_with("< <select> >"));
    }

    #[test]
    fn validation_notice_carries_focus() {
        let err = CommandError::Validation(ValidationError {
            field: StudentField::Mobile,
            message: "Mobile is required.".to_string(),
        });
        let notice = Notice::from_error(&err);
        assert_eq!(notice.title, "Input Error");
        assert_eq!(notice.focus, Some(StudentField::Mobile));
        assert_eq!(notice.kind, NoticeKind::Error);

        let notice = Notice::from_error(&CommandError::Selection("update"));
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.focus, None);
    }

    #[test]
    fn cursor_offset_follows_text_length() {
        assert_eq!(
            text_cursor_offset(&Field::Text("Ada".to_string())),
            LABEL_WIDTH + 3
        );
    }
}
