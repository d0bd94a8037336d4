//! UI module: View components for the TUI.

pub mod panel;
pub mod sections;
pub mod survey;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: These predictions are indicative estimates from statistical models and do not replace professional medical evaluation.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Answers never leave this machine.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
