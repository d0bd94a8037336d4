//! Survey form: one section's questions and their current answers.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{FieldKind, SurveyField, SurveyState, SurveyUpdate};
use crate::tui::styles::MedicalTheme;

/// Cursor and edit buffer of the form being shown.
#[derive(Debug, Default)]
pub struct SurveyFormState {
    pub selected_field: usize,
    /// Text typed into the selected numeric field, not yet committed
    pub buffer: Option<String>,
}

impl SurveyFormState {
    /// Move to the next field
    pub fn next_field(&mut self, len: usize) {
        if len > 0 {
            self.selected_field = (self.selected_field + 1) % len;
        }
    }

    /// Move to the previous field
    pub fn prev_field(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.selected_field == 0 {
            self.selected_field = len - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    /// Start editing with `initial` as the buffer content.
    pub fn start_edit(&mut self, initial: String) {
        self.cancel_edit();
        self.buffer = Some(initial);
    }

    /// Add a character to the edit buffer, starting one if needed.
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.buffer.get_or_insert_with(String::new).push(c);
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.pop();
        }
    }

    /// Drop the edit buffer without applying it.
    pub fn cancel_edit(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.zeroize();
        }
    }

    /// Turn the edit buffer into an update for `field`, wiping the buffer.
    ///
    /// Returns an empty update when nothing is being edited.
    pub fn commit(&mut self, field: SurveyField, survey: &SurveyState) -> SurveyUpdate {
        let Some(mut buffer) = self.buffer.take() else {
            return SurveyUpdate::default();
        };
        let update = field.parse_input(survey, &buffer);
        buffer.zeroize();
        update
    }

    /// Reset the cursor when the form switches to another section.
    pub fn reset(&mut self) {
        self.cancel_edit();
        self.selected_field = 0;
    }
}

/// Render a section's fields in one or two columns.
pub fn render_survey_form(
    f: &mut Frame,
    area: Rect,
    title: &str,
    fields: &[SurveyField],
    survey: &SurveyState,
    state: &SurveyFormState,
) {
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = inner.height.saturating_sub(1) as usize;
    if fields.len() > rows && inner.width >= 140 {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);
        let mid = fields.len().div_ceil(2);
        render_field_column(f, columns[0], &fields[..mid], 0, survey, state);
        render_field_column(f, columns[1], &fields[mid..], mid, survey, state);
    } else {
        render_field_column(f, inner, fields, 0, survey, state);
    }
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[SurveyField],
    offset: usize,
    survey: &SurveyState,
    state: &SurveyFormState,
) {
    let width = fields.iter().map(|f| f.label().len()).max().unwrap_or(0) + 2;
    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            field_line(*field, width, offset + i == state.selected_field, survey, state)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

fn field_line<'a>(
    field: SurveyField,
    width: usize,
    is_selected: bool,
    survey: &SurveyState,
    state: &'a SurveyFormState,
) -> Line<'a> {
    let label_style = if is_selected {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };
    let marker = if is_selected { "▸ " } else { "  " };

    let mut spans = vec![
        Span::styled(marker, MedicalTheme::cursor()),
        Span::styled(format!("{:<width$}", field.label()), label_style),
    ];

    match (&state.buffer, is_selected) {
        (Some(buffer), true) => {
            spans.push(Span::styled(buffer.as_str(), MedicalTheme::text()));
            spans.push(Span::styled("▌", MedicalTheme::cursor()));
        }
        _ => {
            let value_style = if is_selected {
                MedicalTheme::selected()
            } else {
                MedicalTheme::text()
            };
            let value = match field.kind() {
                FieldKind::Number { .. } => field.display_value(survey),
                FieldKind::Toggle | FieldKind::Choice => format!("‹ {} ›", field.display_value(survey)),
            };
            spans.push(Span::styled(value, value_style));
        }
    }

    let hint = field.hint();
    if !hint.is_empty() {
        spans.push(Span::styled(format!("  {hint}"), MedicalTheme::text_muted()));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut state = SurveyFormState::default();
        state.prev_field(4);
        assert_eq!(state.selected_field, 3);
        state.next_field(4);
        assert_eq!(state.selected_field, 0);
    }

    #[test]
    fn test_commit_parses_and_clears_buffer() {
        let survey = SurveyState::default();
        let mut state = SurveyFormState::default();
        for c in "42".chars() {
            state.input_char(c);
        }
        state.input_char('x');

        let update = state.commit(SurveyField::Age, &survey);
        assert_eq!(update.age, Some(42.0));
        assert!(!state.is_editing());
    }

    #[test]
    fn test_commit_without_edit_is_empty() {
        let mut state = SurveyFormState::default();
        let update = state.commit(SurveyField::Weight, &SurveyState::default());
        assert!(update.is_empty());
    }

    #[test]
    fn test_bad_input_keeps_current_value() {
        let survey = SurveyState::default();
        let mut state = SurveyFormState::default();
        state.start_edit("-.-".to_string());
        let update = state.commit(SurveyField::Cholesterol, &survey);
        assert_eq!(update.cholesterol, Some(survey.cholesterol));
    }

    #[test]
    fn test_cancel_and_delete() {
        let mut state = SurveyFormState::default();
        state.start_edit("120".to_string());
        state.delete_char();
        assert_eq!(state.buffer.as_deref(), Some("12"));
        state.cancel_edit();
        assert!(!state.is_editing());
    }
}
