//! Main TUI application state machine.
//!
//! Handles:
//! - Section navigation and survey editing
//! - Input event handling
//! - Background prediction workers, one per panel

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};

use crate::adapters::onnx::OnnxEngine;
use crate::application::{
    PanelState, PredictionPanel, PredictionService, SubscriptionId, SurveyStore,
};
use crate::config::AppConfig;
use crate::domain::{FieldKind, PredictionTask, SurveyField};
use crate::ports::{InferenceEngine, InferenceError};

use super::ui::{
    panel::{render_panel, PanelView},
    render_disclaimer,
    sections::{render_header, render_sections, Section},
    survey::{render_survey_form, SurveyFormState},
};
use super::worker::{PredictionProgress, PredictionWorker, PredictionWorkerHandle};

/// Main application state
pub struct App<E = OnnxEngine>
where
    E: InferenceEngine + 'static,
{
    /// Whether the app should quit
    should_quit: bool,

    service: PredictionService<E>,

    /// Shared survey answers
    store: SurveyStore,

    /// Bumped by a store listener on every survey change
    revision: Arc<AtomicU64>,
    subscription: SubscriptionId,

    /// Index into `Section::ALL`
    section: usize,
    form: SurveyFormState,

    panels: Vec<PredictionPanel>,

    /// Running workers by task. A new run replaces the previous handle.
    pending: HashMap<PredictionTask, PredictionWorkerHandle>,

    /// Survey revision each panel's current run started from
    run_revision: HashMap<PredictionTask, u64>,

    missing_models: Vec<PredictionTask>,
}

impl App<OnnxEngine> {
    /// Create a new application instance using the ONNX Runtime engine.
    ///
    /// # Errors
    /// Returns error if the application cannot be initialized.
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.model_dir.exists() {
            tracing::warn!(
                model_dir = %config.model_dir.display(),
                "Model directory not found; predictions will fail until it exists"
            );
        }

        let engine = Arc::new(OnnxEngine::new(config.require_manifest));
        let service = PredictionService::new(engine, &config.model_dir);
        Ok(Self::with_dependencies(service))
    }
}

impl<E> App<E>
where
    E: InferenceEngine + 'static,
{
    /// Create application with an injected prediction service.
    pub fn with_dependencies(service: PredictionService<E>) -> Self {
        let missing_models = service.missing_models();
        for task in &missing_models {
            tracing::warn!(%task, "Model file missing");
        }

        let mut store = SurveyStore::default();
        let revision = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&revision);
        let subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        Self {
            should_quit: false,
            service,
            store,
            revision,
            subscription,
            section: 0,
            form: SurveyFormState::default(),
            panels: PredictionTask::ALL
                .into_iter()
                .map(PredictionPanel::new)
                .collect(),
            pending: HashMap::new(),
            run_revision: HashMap::new(),
            missing_models,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.store.unsubscribe(self.subscription);
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_workers();

            terminal.draw(|f| self.draw(f))?;

            // Short poll to stay responsive
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Disclaimer
            ])
            .split(area);

        render_header(f, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(rows[1]);

        render_sections(
            f,
            columns[0],
            self.current_section(),
            &self.panels,
            self.service.model_dir(),
            &self.missing_models,
        );
        self.draw_section(f, columns[1]);

        render_disclaimer(f, rows[2]);
    }

    fn draw_section(&self, f: &mut Frame, area: Rect) {
        let section = self.current_section();
        let fields = self.current_fields();

        let Section::Panel(task) = section else {
            render_survey_form(f, area, section.title(), fields, self.store.get(), &self.form);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        render_survey_form(f, chunks[0], section.title(), fields, self.store.get(), &self.form);
        if let Some(panel) = self.panel(task) {
            render_panel(f, chunks[1], panel, self.panel_view(task));
        }
    }

    fn panel_view(&self, task: PredictionTask) -> PanelView {
        let progress = self
            .pending
            .get(&task)
            .map_or(0.0, |worker| fake_progress(worker.started_at));
        let stale = self
            .run_revision
            .get(&task)
            .is_some_and(|rev| *rev != self.revision.load(Ordering::Relaxed));
        PanelView {
            progress,
            stale,
            model_missing: self.missing_models.contains(&task),
        }
    }

    fn current_section(&self) -> Section {
        Section::ALL[self.section % Section::ALL.len()]
    }

    fn current_fields(&self) -> &'static [SurveyField] {
        match self.current_section() {
            Section::General => &SurveyField::GENERAL,
            Section::Panel(task) => task.fields(),
        }
    }

    fn current_field(&self) -> Option<SurveyField> {
        self.current_fields().get(self.form.selected_field).copied()
    }

    fn panel(&self, task: PredictionTask) -> Option<&PredictionPanel> {
        self.panels.iter().find(|p| p.task() == task)
    }

    fn panel_mut(&mut self, task: PredictionTask) -> Option<&mut PredictionPanel> {
        self.panels.iter_mut().find(|p| p.task() == task)
    }

    /// Poll every pending worker and apply finished outcomes.
    fn poll_workers(&mut self) {
        let mut finished = Vec::new();

        for (task, worker) in &self.pending {
            loop {
                match worker.try_recv() {
                    Ok(PredictionProgress::Running) => {}
                    Ok(PredictionProgress::Complete(result)) => {
                        finished.push((*task, worker.ticket, Ok(result)));
                        break;
                    }
                    Ok(PredictionProgress::Error(e)) => {
                        finished.push((*task, worker.ticket, Err(e)));
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::error!(%task, "Prediction worker exited without a result");
                        finished.push((
                            *task,
                            worker.ticket,
                            Err(InferenceError::Runtime(
                                "prediction worker stopped unexpectedly".into(),
                            )),
                        ));
                        break;
                    }
                }
            }
        }

        for (task, ticket, outcome) in finished {
            self.pending.remove(&task);
            if let Some(panel) = self.panel_mut(task) {
                panel.complete(ticket, outcome);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.form.is_editing() {
            self.handle_edit_key(key);
            return;
        }

        match key {
            KeyCode::Tab => self.switch_section(true),
            KeyCode::BackTab => self.switch_section(false),
            KeyCode::Up => self.form.prev_field(self.current_fields().len()),
            KeyCode::Down => self.form.next_field(self.current_fields().len()),
            KeyCode::Left => self.cycle_field(false),
            KeyCode::Right | KeyCode::Char(' ') => self.cycle_field(true),
            KeyCode::Enter => self.activate_field(),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if self.current_field_is_numeric() {
                    self.form.input_char(c);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.start_run(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.clear_panel(),
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.store.reset();
                self.form.cancel_edit();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.form.cancel_edit(),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Up => {
                self.commit_edit();
                self.form.prev_field(self.current_fields().len());
            }
            KeyCode::Down => {
                self.commit_edit();
                self.form.next_field(self.current_fields().len());
            }
            KeyCode::Tab => {
                self.commit_edit();
                self.switch_section(true);
            }
            KeyCode::BackTab => {
                self.commit_edit();
                self.switch_section(false);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.commit_edit();
                self.start_run();
            }
            KeyCode::Char(c) => self.form.input_char(c),
            _ => {}
        }
    }

    fn switch_section(&mut self, forward: bool) {
        let len = Section::ALL.len();
        self.section = if forward {
            (self.section + 1) % len
        } else {
            (self.section + len - 1) % len
        };
        self.form.reset();
    }

    fn current_field_is_numeric(&self) -> bool {
        self.current_field()
            .is_some_and(|field| matches!(field.kind(), FieldKind::Number { .. }))
    }

    fn commit_edit(&mut self) {
        let Some(field) = self.current_field() else {
            self.form.cancel_edit();
            return;
        };
        let update = self.form.commit(field, self.store.get());
        self.store.update(&update);
    }

    fn activate_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Number { .. } => {
                let current = field.display_value(self.store.get());
                self.form.start_edit(current);
            }
            FieldKind::Toggle | FieldKind::Choice => self.cycle_field(true),
        }
    }

    fn cycle_field(&mut self, forward: bool) {
        if let Some(field) = self.current_field() {
            let update = field.cycle(self.store.get(), forward);
            self.store.update(&update);
        }
    }

    fn start_run(&mut self) {
        let Section::Panel(task) = self.current_section() else {
            return;
        };
        let retry = matches!(
            self.panel(task).map(PredictionPanel::state),
            Some(PanelState::Error { .. })
        );
        if retry {
            // A failed load may have left a broken session behind.
            self.service.reload(task);
        }
        let Some(panel) = self.panel_mut(task) else {
            return;
        };

        let ticket = panel.begin_run();
        let survey = self.store.get().clone();
        self.run_revision
            .insert(task, self.revision.load(Ordering::Relaxed));

        let worker = PredictionWorker::spawn(self.service.clone(), ticket, survey);
        if self.pending.insert(task, worker).is_some() {
            tracing::debug!(%task, "Replaced pending prediction worker");
        }
    }

    fn clear_panel(&mut self) {
        let Section::Panel(task) = self.current_section() else {
            return;
        };
        if let Some(panel) = self.panel_mut(task) {
            panel.clear();
        }
        self.pending.remove(&task);
        self.run_revision.remove(&task);
    }
}

/// Smooth, monotonic fake progress approaching 95%.
fn fake_progress(started_at: Instant) -> f64 {
    let elapsed = Instant::now()
        .saturating_duration_since(started_at)
        .as_secs_f64();
    (0.95 * (1.0 - (-elapsed / 1.5).exp())).clamp(0.0, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Answers for heart and maternal models, fails the others.
    #[derive(Default)]
    struct FixedEngine {
        evicted: Mutex<Vec<PathBuf>>,
    }

    impl InferenceEngine for FixedEngine {
        fn infer(&self, model: &Path, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            let name = model.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            match name {
                "heart_disease_model.onnx" => Ok(vec![0.25, 0.75]),
                "maternal_health_risk_model.onnx" => Ok(vec![0.1, 0.8, 0.1]),
                _ => Err(InferenceError::ModelNotFound(model.to_path_buf())),
            }
        }

        fn evict(&self, model: &Path) {
            self.evicted.lock().unwrap().push(model.to_path_buf());
        }
    }

    /// Engine whose runtime crashes mid-inference.
    struct CrashingEngine;

    impl InferenceEngine for CrashingEngine {
        fn infer(&self, _model: &Path, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            panic!("runtime crashed");
        }
    }

    fn app_with<E: InferenceEngine + 'static>(engine: Arc<E>) -> App<E> {
        App::with_dependencies(PredictionService::new(engine, "models"))
    }

    fn test_app() -> App<FixedEngine> {
        app_with(Arc::new(FixedEngine::default()))
    }

    fn press<E: InferenceEngine>(app: &mut App<E>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn type_text<E: InferenceEngine>(app: &mut App<E>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn wait_for_workers<E: InferenceEngine>(app: &mut App<E>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !app.pending.is_empty() && Instant::now() < deadline {
            app.poll_workers();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_typing_a_number_updates_the_store() {
        let mut app = test_app();
        type_text(&mut app, "45");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.get().age, 45.0);
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = test_app();
        type_text(&mut app, "99");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.get().age, 18.0);
        assert!(!app.form.is_editing());
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut app = test_app();
        type_text(&mut app, "300");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.store.get().age, 120.0);
        assert_eq!(app.form.selected_field, 1);
    }

    #[test]
    fn test_answers_are_shared_across_sections() {
        let mut app = test_app();
        type_text(&mut app, "52");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_section(), Section::Panel(PredictionTask::HeartDisease));
        assert_eq!(app.current_field(), Some(SurveyField::Age));
        assert_eq!(
            app.current_field().and_then(|f| f.number(app.store.get())),
            Some(52.0)
        );
    }

    #[test]
    fn test_cycle_choice_field() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.current_field(), Some(SurveyField::Sex));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.store.get().sex, crate::domain::Sex::Female);
    }

    #[test]
    fn test_run_completes_panel() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('r'));
        assert!(app
            .panel(PredictionTask::HeartDisease)
            .is_some_and(PredictionPanel::is_loading));

        wait_for_workers(&mut app);
        let panel = app.panel(PredictionTask::HeartDisease).unwrap();
        assert_eq!(panel.result().and_then(|r| r.verdict_label()), Some("High Risk"));
        assert!(!app.panel_view(PredictionTask::HeartDisease).stale);
    }

    #[test]
    fn test_result_goes_stale_after_edit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('r'));
        wait_for_workers(&mut app);

        type_text(&mut app, "33");
        press(&mut app, KeyCode::Enter);
        assert!(app.panel_view(PredictionTask::MaternalHealthRisk).stale);
    }

    #[test]
    fn test_failed_run_shows_error_and_retry() {
        let mut app = test_app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        press(&mut app, KeyCode::Char('r'));
        wait_for_workers(&mut app);
        assert!(matches!(
            app.panel(PredictionTask::ObesityLikelihood).map(PredictionPanel::state),
            Some(PanelState::Error { .. })
        ));

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(
            app.panel(PredictionTask::ObesityLikelihood).map(PredictionPanel::state),
            Some(&PanelState::Idle)
        );
    }

    #[test]
    fn test_crashed_worker_surfaces_error() {
        let mut app = app_with(Arc::new(CrashingEngine));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('r'));
        wait_for_workers(&mut app);

        assert!(app.pending.is_empty());
        match app.panel(PredictionTask::HeartDisease).map(PredictionPanel::state) {
            Some(PanelState::Error { message }) => {
                assert!(message.contains("stopped unexpectedly"));
            }
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[test]
    fn test_retry_after_error_reloads_model() {
        let engine = Arc::new(FixedEngine::default());
        let mut app = app_with(Arc::clone(&engine));
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        press(&mut app, KeyCode::Char('r'));
        wait_for_workers(&mut app);
        assert!(engine.evicted.lock().unwrap().is_empty());

        press(&mut app, KeyCode::Char('r'));
        wait_for_workers(&mut app);
        assert_eq!(
            *engine.evicted.lock().unwrap(),
            vec![Path::new("models").join("obesity_likelihood_model.onnx")]
        );
    }

    #[test]
    fn test_run_on_general_section_is_ignored() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut app = test_app();
        type_text(&mut app, "70");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.store.get().age, 18.0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_fake_progress_is_bounded() {
        let p = fake_progress(Instant::now());
        assert!((0.0..=0.95).contains(&p));
    }
}
