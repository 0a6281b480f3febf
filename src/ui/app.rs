use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::info;

use crate::error::CommandError;
use crate::form::{check_field, DateStep, Field};
use crate::models::StudentField;
use crate::session::{Outcome, PendingDelete, Session};

use super::forms::{
    build_field_line, confirm_delete_lines, confirm_quit_lines, text_cursor_offset, Notice,
};
use super::helpers::{centered_rect, key_hints};

/// Window title, kept from the desktop version of the tool.
const TITLE: &str = "Student Management System";
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Form fields shown in the left column; the rest go to the right.
const LEFT_COLUMN_FIELDS: usize = 6;
/// Rows moved by PageUp/PageDown in the record list.
const PAGE_ROWS: isize = 10;

/// Which half of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Form,
    Records,
}

/// Modal state layered on top of the main screen.
enum Mode {
    Normal,
    Notice(Notice),
    ConfirmDelete(PendingDelete),
    ConfirmQuit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front-end around a [`Session`]. Keys are translated into field
/// edits and command calls; command results become notices or status text.
pub struct App {
    session: Session,
    focus: Focus,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            focus: Focus::Form,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Load the record list for the first frame. A failure is shown as a
    /// notice and the screen starts without rows.
    pub fn start(&mut self) {
        match self.session.load() {
            Ok(count) => {
                info!(records = count, "initial load complete");
                self.set_status(format!("{count} records loaded."), StatusKind::Info);
            }
            Err(err) => self.mode = Mode::Notice(Notice::from_error(&err)),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give the session back so the caller can close the connection.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Handle a plain key press. Returns true when the user confirmed quitting.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Notice(notice) => self.handle_notice(code, notice),
            Mode::ConfirmDelete(pending) => self.handle_confirm_delete(code, pending),
            Mode::ConfirmQuit => self.handle_confirm_quit(code, &mut exit),
        };

        exit
    }

    /// Handle a Ctrl-modified key. Returns true when the key was a command
    /// shortcut; other keys fall through to [`App::handle_key`].
    pub fn handle_ctrl(&mut self, code: KeyCode) -> bool {
        if !matches!(self.mode, Mode::Normal) {
            return false;
        }

        match code {
            KeyCode::Char('f') => {
                let result = self.session.search();
                self.finish_command(result);
            }
            KeyCode::Char('s') => {
                let result = self.session.save();
                self.finish_command(result);
            }
            KeyCode::Char('u') => {
                let result = self.session.update();
                self.finish_command(result);
            }
            KeyCode::Char('d') => match self.session.begin_delete() {
                Ok(pending) => {
                    self.clear_status();
                    self.mode = Mode::ConfirmDelete(pending);
                }
                Err(err) => self.mode = Mode::Notice(Notice::from_error(&err)),
            },
            KeyCode::Char('n') => {
                let result = self.session.clear();
                self.focus = Focus::Form;
                self.finish_command(result);
            }
            KeyCode::Char('q') => self.mode = Mode::ConfirmQuit,
            _ => return false,
        }
        true
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Mode {
        if code == KeyCode::Esc {
            return Mode::ConfirmQuit;
        }
        match self.focus {
            Focus::Form => self.handle_form_key(code),
            Focus::Records => self.handle_records_key(code),
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Mode {
        let form = self.session.form_mut();
        let is_date = matches!(form.focused_field(), Field::Date(_));
        let is_choice = matches!(form.focused_field(), Field::Choice { .. });

        match code {
            KeyCode::Tab | KeyCode::Down => {
                if !form.focus_next() {
                    self.focus = Focus::Records;
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if !form.focus_prev() {
                    self.focus = Focus::Records;
                }
            }
            KeyCode::Enter => {
                let field = form.focused();
                match check_field(form, field) {
                    Ok(()) => {
                        if !form.focus_next() {
                            self.focus = Focus::Records;
                        }
                        self.clear_status();
                    }
                    Err(err) => self.set_status(err.to_string(), StatusKind::Error),
                }
            }
            KeyCode::Backspace => form.focused_field_mut().backspace(),
            KeyCode::Left if is_date => form.focused_field_mut().step_date(DateStep::Day, -1),
            KeyCode::Right if is_date => form.focused_field_mut().step_date(DateStep::Day, 1),
            KeyCode::PageUp if is_date => form.focused_field_mut().step_date(DateStep::Month, -1),
            KeyCode::PageDown if is_date => form.focused_field_mut().step_date(DateStep::Month, 1),
            KeyCode::Char('[') if is_date => form.focused_field_mut().step_date(DateStep::Year, -1),
            KeyCode::Char(']') if is_date => form.focused_field_mut().step_date(DateStep::Year, 1),
            KeyCode::Left => form.focused_field_mut().cycle(-1),
            KeyCode::Right => form.focused_field_mut().cycle(1),
            KeyCode::Char(' ') if is_choice => form.focused_field_mut().cycle(1),
            KeyCode::Char(ch) => {
                form.focused_field_mut().push_char(ch);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_records_key(&mut self, code: KeyCode) -> Mode {
        let records = self.session.records_mut();
        match code {
            KeyCode::Char('q') => return Mode::ConfirmQuit,
            KeyCode::Up => records.move_cursor(-1),
            KeyCode::Down => records.move_cursor(1),
            KeyCode::PageUp => records.move_cursor(-PAGE_ROWS),
            KeyCode::PageDown => records.move_cursor(PAGE_ROWS),
            KeyCode::Home => records.cursor_first(),
            KeyCode::End => records.cursor_last(),
            KeyCode::Tab => {
                self.session.form_mut().focus_first();
                self.focus = Focus::Form;
            }
            KeyCode::BackTab => {
                self.session.form_mut().focus_last();
                self.focus = Focus::Form;
            }
            KeyCode::Enter => {
                let cursor = records.cursor();
                if self.session.activate_row(cursor) {
                    let roll_number = self
                        .session
                        .records()
                        .selected()
                        .map(|record| record.roll_number.clone())
                        .unwrap_or_default();
                    self.set_status(
                        format!("Loaded {roll_number} into the form."),
                        StatusKind::Info,
                    );
                } else {
                    self.set_status("No record to select.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_notice(&mut self, code: KeyCode, notice: Notice) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                if let Some(field) = notice.focus {
                    self.session.form_mut().focus(field);
                    self.focus = Focus::Form;
                }
                Mode::Normal
            }
            _ => Mode::Notice(notice),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, pending: PendingDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.session.confirm_delete(pending);
                self.focus = Focus::Form;
                self.finish_command(result);
                mem::replace(&mut self.mode, Mode::Normal)
            }
            _ => Mode::ConfirmDelete(pending),
        }
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Mode::Normal,
            _ => Mode::ConfirmQuit,
        }
    }

    /// Route a command result to the user: writes get a dialog, searches and
    /// clears a status line, failures an error dialog.
    fn finish_command(&mut self, result: Result<Outcome, CommandError>) {
        match result {
            Ok(outcome) if outcome.needs_notice() => {
                self.clear_status();
                self.focus = Focus::Form;
                self.mode = Mode::Notice(Notice::info("Success", outcome.message()));
            }
            Ok(outcome) => self.set_status(outcome.message(), StatusKind::Info),
            Err(err) => {
                self.clear_status();
                self.mode = Mode::Notice(Notice::from_error(&err));
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let form_height = (LEFT_COLUMN_FIELDS as u16) + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(form_height),
                Constraint::Min(3),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        self.draw_form(frame, chunks[1]);
        self.draw_records(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::Notice(notice) => self.draw_notice(frame, area, notice),
            Mode::ConfirmDelete(pending) => {
                self.draw_dialog(frame, area, "Confirm Delete", confirm_delete_lines(pending))
            }
            Mode::ConfirmQuit => self.draw_dialog(frame, area, "Quit", confirm_quit_lines()),
            Mode::Normal => {}
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::Form {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title("Student")
            .borders(Borders::ALL)
            .border_style(border_style);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let form = self.session.form();
        let focused = form.focused();
        let form_active = self.focus == Focus::Form && matches!(self.mode, Mode::Normal);
        let lines: Vec<Line<'static>> = form
            .iter()
            .map(|(field, value)| build_field_line(*field, value, form_active && *field == focused))
            .collect();
        let split = LEFT_COLUMN_FIELDS.min(lines.len());
        let (left, right) = lines.split_at(split);
        frame.render_widget(Paragraph::new(left.to_vec()), columns[0]);
        frame.render_widget(Paragraph::new(right.to_vec()), columns[1]);

        if form_active && matches!(form.focused_field(), Field::Text(_)) {
            if let Some(position) = form.iter().position(|(field, _)| *field == focused) {
                let (column, row) = if position < split {
                    (columns[0], position)
                } else {
                    (columns[1], position - split)
                };
                let offset = text_cursor_offset(form.focused_field()) as u16;
                let x = (column.x + offset).min(column.right().saturating_sub(1));
                frame.set_cursor_position((x, column.y + row as u16));
            }
        }
    }

    fn draw_records(&self, frame: &mut Frame, area: Rect) {
        let records = self.session.records();
        let title = if records.is_filtered() {
            format!("Search Results ({})", records.len())
        } else {
            format!("Records ({})", records.len())
        };
        let border_style = if self.focus == Focus::Records {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        if records.is_empty() {
            let message = if records.is_filtered() {
                "No records match the search. Press Ctrl-N to show all."
            } else {
                "No records yet. Fill in the form and press Ctrl-S to save one."
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(
            StudentField::COLUMNS
                .iter()
                .map(|field| Cell::from(field.heading())),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let selected = records.selected_index();
        let rows = records.rows().iter().enumerate().map(|(index, record)| {
            let row = Row::new(record.cells().into_iter().map(Cell::from));
            if Some(index) == selected {
                row.style(Style::default().fg(Color::Yellow))
            } else {
                row
            }
        });

        let widths = [Constraint::Ratio(1, StudentField::COLUMNS.len() as u32);
            StudentField::COLUMNS.len()];
        let highlight = if self.focus == Focus::Records {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(highlight);

        let mut state = TableState::default().with_selected(Some(records.cursor()));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.mode, self.focus) {
            (Mode::Normal, Focus::Form) => key_hints(&[
                ("Tab", "Next"),
                ("^F", "Search"),
                ("^S", "Save"),
                ("^U", "Update"),
                ("^D", "Delete"),
                ("^N", "Clear"),
                ("Esc", "Quit"),
            ]),
            (Mode::Normal, Focus::Records) => key_hints(&[
                ("↑↓", "Navigate"),
                ("Enter", "Select"),
                ("Tab", "Form"),
                ("^U", "Update"),
                ("^D", "Delete"),
                ("q", "Quit"),
            ]),
            (Mode::Notice(_), _) => key_hints(&[("Enter", "Continue")]),
            (Mode::ConfirmDelete(_), _) | (Mode::ConfirmQuit, _) => {
                key_hints(&[("Y", "Confirm"), ("N", "Cancel")])
            }
        }
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(notice.title.clone())
            .borders(Borders::ALL)
            .border_style(notice.kind.style());
        let paragraph = Paragraph::new(notice.lines())
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_dialog(&self, frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
