//! Medical-themed color palette and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::PredictionTask;

/// Color palette shared by every view.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Teal accent for selection and focus
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Slate used for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // Verdict and status colors
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Foreground of the selected section
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    /// App name in the header
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Block titles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    /// Labels and secondary values
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Hints and the disclaimer
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Progress and in-flight markers
    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted section or question
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Question currently being edited
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    /// Border of the active form or panel
    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Key in the key help
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for the edit cursor
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Style for a verdict: green for the healthy class, amber for
    /// borderline classes, rose for the worst ones.
    #[must_use]
    pub fn verdict(task: PredictionTask, class: usize) -> Style {
        match (task, class) {
            (PredictionTask::HeartDisease, 0)
            | (PredictionTask::MaternalHealthRisk, 1)
            | (PredictionTask::ObesityLikelihood, 1)
            | (PredictionTask::DiabetesLikelihood, 0) => Self::success(),
            (PredictionTask::MaternalHealthRisk, 2)
            | (PredictionTask::ObesityLikelihood, 0 | 5 | 6)
            | (PredictionTask::DiabetesLikelihood, 1) => Self::warning(),
            _ => Self::danger(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_colors() {
        assert_eq!(MedicalTheme::verdict(PredictionTask::HeartDisease, 0), MedicalTheme::success());
        assert_eq!(MedicalTheme::verdict(PredictionTask::HeartDisease, 1), MedicalTheme::danger());
        assert_eq!(
            MedicalTheme::verdict(PredictionTask::MaternalHealthRisk, 2),
            MedicalTheme::warning()
        );
        assert_eq!(
            MedicalTheme::verdict(PredictionTask::ObesityLikelihood, 4),
            MedicalTheme::danger()
        );
        assert_eq!(
            MedicalTheme::verdict(PredictionTask::DiabetesLikelihood, 1),
            MedicalTheme::warning()
        );
    }
}
