//! Prediction panel view: progress, per-class results and advice.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::{PanelState, PredictionPanel};
use crate::domain::PredictionResult;
use crate::tui::styles::MedicalTheme;

/// Extra context the panel view needs besides the panel itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelView {
    /// Fake progress of a running model, `0.0..1.0`
    pub progress: f64,
    /// Survey answers changed since the shown result was computed
    pub stale: bool,
    /// Model file is missing from the model directory
    pub model_missing: bool,
}

/// Render the results side of a prediction panel
pub fn render_panel(f: &mut Frame, area: Rect, panel: &PredictionPanel, view: PanelView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(2), // Footer
        ])
        .split(area);

    match panel.state() {
        PanelState::Idle => render_idle(f, chunks[0], view),
        PanelState::Loading { .. } => render_progress(f, chunks[0], view.progress),
        PanelState::HasResults(result) => render_result(f, chunks[0], result, view.stale),
        PanelState::Error { message } => render_error(f, chunks[0], message),
    }
    render_panel_footer(f, chunks[1], panel.state());
}

fn results_block() -> Block<'static> {
    Block::default()
        .title(Span::styled(" Results ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
}

fn render_idle(f: &mut Frame, area: Rect, view: PanelView) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Fill in the answers, then compute the prediction",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Compute", MedicalTheme::key_desc()),
        ]),
    ];
    if view.model_missing {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Model file not found in the model directory",
            MedicalTheme::warning(),
        )));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(results_block());
    f.render_widget(content, area);
}

fn render_progress(f: &mut Frame, area: Rect, progress: f64) {
    let block = results_block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let stage = Paragraph::new(Line::from(Span::styled(
        "Running model...",
        MedicalTheme::focused(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(stage, chunks[0]);

    let progress = progress.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);
}

fn render_result(f: &mut Frame, area: Rect, result: &PredictionResult, stale: bool) {
    let block = results_block().border_style(MedicalTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = result.rows();
    let mut constraints = vec![Constraint::Length(2)]; // Verdict
    constraints.extend(rows.iter().map(|_| Constraint::Length(1)));
    constraints.push(Constraint::Length(1)); // Spacer
    constraints.push(Constraint::Min(0)); // Advice

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .horizontal_margin(1)
        .split(inner);

    let verdict_style = result
        .verdict
        .map_or(MedicalTheme::text_muted(), |class| {
            MedicalTheme::verdict(result.task, class)
        });
    let mut verdict_line = vec![
        Span::styled("Verdict: ", MedicalTheme::text_secondary()),
        Span::styled(
            result.verdict_label().unwrap_or("n/a"),
            verdict_style.add_modifier(Modifier::BOLD),
        ),
    ];
    if stale {
        verdict_line.push(Span::styled(
            "  (answers changed, press [R] to update)",
            MedicalTheme::warning(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(verdict_line)), chunks[0]);

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (i, (label, percentage)) in rows.iter().enumerate() {
        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(label_width as u16 + 2), Constraint::Min(0)])
            .split(chunks[i + 1]);

        f.render_widget(
            Paragraph::new(Span::styled(*label, MedicalTheme::text_secondary())),
            row[0],
        );

        let gauge = Gauge::default()
            .gauge_style(MedicalTheme::info())
            .ratio((percentage / 100.0).clamp(0.0, 1.0))
            .label(format!("{percentage:.2}%"));
        f.render_widget(gauge, row[1]);
    }

    if let Some(advice) = result.advice() {
        let mut lines = vec![Line::from(Span::styled(advice.summary, MedicalTheme::text()))];
        lines.extend(advice.items.iter().map(|item| {
            Line::from(vec![
                Span::styled("  • ", MedicalTheme::cursor()),
                Span::styled(*item, MedicalTheme::text()),
            ])
        }));
        if let Some(source) = advice.source {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Source: ", MedicalTheme::text_muted()),
                Span::styled(source, MedicalTheme::info()),
            ]));
        }
        let advice_area = chunks[chunks.len() - 1];
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), advice_area);
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Results ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_panel_footer(f: &mut Frame, area: Rect, state: &PanelState) {
    let content = match state {
        PanelState::Idle => Line::from(vec![
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Compute", MedicalTheme::key_desc()),
        ]),
        PanelState::Loading { .. } => Line::from(vec![
            Span::styled("[C] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ]),
        PanelState::HasResults(_) => Line::from(vec![
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Recompute ", MedicalTheme::key_desc()),
            Span::styled("[C] ", MedicalTheme::key_hint()),
            Span::styled("Clear", MedicalTheme::key_desc()),
        ]),
        PanelState::Error { .. } => Line::from(vec![
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Retry ", MedicalTheme::key_desc()),
            Span::styled("[C] ", MedicalTheme::key_hint()),
            Span::styled("Clear", MedicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
