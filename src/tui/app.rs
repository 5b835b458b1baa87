use std::error::Error;
use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cli::session::Session;
use crate::model::config::{ListSettings, TrackerConfig};
use crate::model::route::PlaceholderKind;
use crate::render::list::ListRenderer;
use crate::render::rows::{RowKey, RowView};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a text filter after `/`
    Filter,
}

/// Cursor and scroll position of the list view
#[derive(Debug, Clone, Default)]
pub struct ListViewState {
    /// Index into the visible rows
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub renderer: ListRenderer,
    pub settings: ListSettings,
    /// Applied text filter
    pub text_filter: String,
    /// Text being typed in filter mode
    pub filter_input: String,
    pub mode: Mode,
    pub view: ListViewState,
    pub should_quit: bool,
    pub theme: Theme,
    /// One-shot status message, cleared by the next key
    pub message: Option<String>,
}

impl App {
    /// Build the app and start populating the list. Rows appear as the
    /// event loop runs the queued batches.
    pub fn new(session: Session) -> Result<Self, Box<dyn Error>> {
        let settings = session.list_settings();
        let filter = session.standing_filter(&settings);
        let mut renderer = ListRenderer::new(settings.clone(), Box::new(filter));
        renderer.populate(session.catalog.clone())?;
        Ok(App {
            session,
            renderer,
            settings,
            text_filter: String::new(),
            filter_input: String::new(),
            mode: Mode::Navigate,
            view: ListViewState::default(),
            should_quit: false,
            theme: Theme::default(),
            message: None,
        })
    }

    /// Run at most one queued renderer job. Returns whether one ran.
    pub fn step(&mut self) -> bool {
        let ran = match self.renderer.run_next(&mut self.session.store) {
            Ok(ran) => ran,
            Err(e) => {
                self.message = Some(e.to_string());
                false
            }
        };
        if ran {
            self.clamp_cursor();
        }
        ran
    }

    pub fn visible_len(&self) -> usize {
        self.renderer.visible_rows().len()
    }

    pub fn selected(&self) -> Option<RowKey> {
        self.renderer
            .visible_rows()
            .get(self.view.cursor)
            .map(RowView::key)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.view.cursor = 0;
        } else if self.view.cursor >= len {
            self.view.cursor = len - 1;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let next = self.view.cursor as isize + delta;
        self.view.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    /// Push the current settings and filter into the renderer and redraw.
    pub fn apply_settings(&mut self) {
        self.renderer.set_settings(self.settings.clone());
        let mut filter = self.session.standing_filter(&self.settings);
        filter.set_text(&self.text_filter);
        self.renderer.set_filter(Box::new(filter));
        self.redraw();
    }

    fn redraw(&mut self) {
        if let Err(e) = self.renderer.redraw(&self.session.store) {
            self.message = Some(e.to_string());
        }
        self.clamp_cursor();
    }

    fn report<T>(&mut self, result: Result<T, crate::render::RenderError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    // --- Actions ---

    /// Space/Enter: collapse a header, complete a placeholder or a task.
    pub fn toggle_selected(&mut self) {
        let Some(key) = self.selected() else {
            return;
        };
        match key {
            RowKey::Header(k) => {
                let result = self.renderer.toggle_collapsed(&mut self.session.store, &k);
                self.report(result);
            }
            RowKey::Placeholder(id) => {
                let done = self.renderer.completed_placeholders().contains(&id);
                let result =
                    self.renderer
                        .set_placeholder_completed(&mut self.session.store, &id, !done);
                self.report(result);
            }
            RowKey::Task(id) => {
                let now = chrono::Utc::now().timestamp_millis();
                let Some(task) = self.session.catalog.task_mut(id) else {
                    return;
                };
                let done = task.is_completed();
                task.set_completed(!done, now);
                let task = task.clone();
                self.session.save_tasks();
                let result = self.renderer.update_task(task);
                self.report(result);
            }
        }
        self.clamp_cursor();
    }

    pub fn cycle_sort(&mut self) {
        self.settings.sort = self.settings.sort.next();
        self.apply_settings();
    }

    pub fn flip_direction(&mut self) {
        self.settings.direction = self.settings.direction.flipped();
        self.apply_settings();
    }

    pub fn cycle_completed_filter(&mut self) {
        self.settings.completed = self.settings.completed.next();
        self.apply_settings();
    }

    /// Activate the next saved route; after the last one, no route.
    pub fn cycle_route(&mut self) {
        let tab = self.session.tab;
        let type_key = self.session.type_key().to_string();
        let routes = self.session.store.load(tab, &type_key);
        if routes.is_empty() {
            self.message = Some(format!("no routes for {}", type_key));
            return;
        }
        let current = self.session.store.load_active_route_name(tab, &type_key);
        let next = match current.and_then(|name| routes.iter().position(|r| r.name == name)) {
            Some(i) => routes.get(i + 1).map(|r| r.name.as_str()),
            None => routes.first().map(|r| r.name.as_str()),
        };
        self.session.store.save_active_route_name(tab, &type_key, next);
        self.message = Some(match next {
            Some(name) => format!("route: {}", name),
            None => "route: none".to_string(),
        });
        self.view.cursor = 0;
        self.redraw();
    }

    /// Insert a bank placeholder next to the selected route task.
    pub fn insert_bank(&mut self, after: bool) {
        let Some(RowKey::Task(task_id)) = self.selected() else {
            self.message = Some("select a task to place a bank next to".into());
            return;
        };
        let result = self.renderer.insert_placeholder(
            &mut self.session.store,
            task_id,
            PlaceholderKind::Bank,
            after,
        );
        if let Some(inserted) = self.report(result) {
            self.message = Some(match inserted {
                Some(p) => format!("added {} ({})", p.display_name(), p.id),
                None => "task is not in the active route".into(),
            });
        }
        self.clamp_cursor();
    }

    pub fn remove_selected_placeholder(&mut self) {
        let Some(RowKey::Placeholder(id)) = self.selected() else {
            return;
        };
        let result = self.renderer.remove_placeholder(&mut self.session.store, &id);
        if self.report(result) == Some(true) {
            self.message = Some(format!("removed {}", id));
        }
        self.clamp_cursor();
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.session.flush() {
            log::error!("could not save store: {}", e);
            self.message = Some(e.to_string());
        }
    }

    /// Flush the store and keep the view settings for the next session.
    pub fn save_on_exit(&mut self) {
        self.flush();
        if let Err(e) = self.session.save_view_settings(&self.settings) {
            log::error!("could not save view settings: {}", e);
        }
    }
}

/// Run the TUI application
pub fn run(dir: &Path, config: TrackerConfig, tab: Option<&str>) -> Result<(), Box<dyn Error>> {
    let session = Session::open(dir, config, tab)?;
    let mut app = App::new(session)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    app.save_on_exit();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let mut save_counter = 0u32;
    loop {
        // One job per frame keeps input responsive during population.
        let busy = app.step();

        terminal.draw(|frame| render::render(frame, app))?;

        let timeout = if busy {
            Duration::ZERO
        } else {
            Duration::from_millis(250)
        };
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced store save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                app.flush();
                save_counter = 0;
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
