//! Header bar and section list.

use std::path::Path;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::{PanelState, PredictionPanel};
use crate::domain::PredictionTask;
use crate::tui::styles::MedicalTheme;

/// One entry of the section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    General,
    Panel(PredictionTask),
}

impl Section {
    pub const ALL: [Self; 5] = [
        Self::General,
        Self::Panel(PredictionTask::HeartDisease),
        Self::Panel(PredictionTask::MaternalHealthRisk),
        Self::Panel(PredictionTask::ObesityLikelihood),
        Self::Panel(PredictionTask::DiabetesLikelihood),
    ];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Panel(task) => task.title(),
        }
    }
}

pub fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Vitalcheck", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Health Risk Self-Assessment", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// Render the section list with each panel's status and the key help.
pub fn render_sections(
    f: &mut Frame,
    area: Rect,
    selected: Section,
    panels: &[PredictionPanel],
    model_dir: &Path,
    missing_models: &[PredictionTask],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(Section::ALL.len() as u16 + 2), // Sections
            Constraint::Length(Section::ALL.len() as u16 + 1), // Models
            Constraint::Min(0),                                // Keys
        ])
        .split(area);

    let items: Vec<Line> = Section::ALL
        .iter()
        .map(|section| {
            let style = if *section == selected {
                MedicalTheme::selected()
            } else {
                MedicalTheme::text()
            };
            let mut spans = vec![Span::styled(format!(" {} ", section.title()), style)];
            if let Section::Panel(task) = section {
                if let Some(panel) = panels.iter().find(|p| p.task() == *task) {
                    spans.push(status_badge(panel));
                }
            }
            Line::from(spans)
        })
        .collect();

    let sections = Paragraph::new(items).block(
        Block::default()
            .title(Span::styled(" Sections ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(sections, chunks[0]);

    let models: Vec<Line> = PredictionTask::ALL
        .iter()
        .map(|task| format_status_item(task.model_file(), !missing_models.contains(task)))
        .collect();
    let models = Paragraph::new(models).block(
        Block::default()
            .title(Span::styled(models_title(model_dir), MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(models, chunks[1]);

    let keys = vec![
        key_line("[Tab]", "Next section"),
        key_line("[↑↓]", "Select question"),
        key_line("[0-9]", "Type a number"),
        key_line("[Enter]", "Edit / confirm"),
        key_line("[←→]", "Change option"),
        key_line("[R]", "Compute"),
        key_line("[C]", "Clear results"),
        key_line("[X]", "Reset answers"),
        key_line("[Q]", "Quit"),
    ];
    let keys = Paragraph::new(keys).block(
        Block::default()
            .title(Span::styled(" Keys ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(keys, chunks[2]);
}

fn status_badge(panel: &PredictionPanel) -> Span<'static> {
    match panel.state() {
        PanelState::Idle => Span::raw(""),
        PanelState::Loading { .. } => Span::styled("…", MedicalTheme::info()),
        PanelState::HasResults(result) => match result.verdict {
            Some(class) => Span::styled(
                result.verdict_label().unwrap_or_default(),
                MedicalTheme::verdict(result.task, class),
            ),
            None => Span::raw(""),
        },
        PanelState::Error { .. } => Span::styled("!", MedicalTheme::danger()),
    }
}

fn models_title(model_dir: &Path) -> String {
    format!(" Models: {} ", model_dir.display())
}

fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key} "), MedicalTheme::key_hint()),
        Span::styled(desc, MedicalTheme::key_desc()),
    ])
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", MedicalTheme::success())
    } else {
        ("MISSING", MedicalTheme::danger())
    };

    Line::from(vec![
        Span::styled(format!(" {icon} "), style),
        Span::styled(label.to_string(), MedicalTheme::text_secondary()),
    ])
}
