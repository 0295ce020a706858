use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tui_input::{backend::crossterm::EventHandler, Input};

use super::chat_panel::{input_window, render_chat, ChatRenderContext};
use super::map_renderer::{inner_area, render_details, render_map, MapRenderContext};
use super::popups::{render_help, render_logs, render_settings, SettingsContext};
use super::state_coordinator::StateCoordinator;
use super::table_renderer::{render_table, row_at, HEADER_HEIGHT, ROW_HEIGHT};
use crate::assistant::{AssistantBridge, AssistantSession, GeminiClient, SubmitRejected};
use crate::config::{Config, ViewMode};
use crate::data::{Organization, OrganizationStore};
use crate::utils::app_paths::AppPaths;
use crate::utils::logging::{get_log_buffer, LogRingBuffer};
use crate::views::Viewport;

const TICK: Duration = Duration::from_millis(50);
const STATUS_TTL: Duration = Duration::from_secs(5);
const LOG_OVERLAY_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Search,
    Table,
    Map,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Popup {
    Help,
    Settings,
    Logs,
}

/// Screen areas from the last draw, for mouse hit testing
#[derive(Debug, Default, Clone, Copy)]
struct HitAreas {
    search: Option<Rect>,
    table: Option<Rect>,
    map: Option<Rect>,
    chat: Option<Rect>,
}

pub struct TuiApp {
    config: Config,
    coordinator: StateCoordinator,
    assistant: AssistantSession,
    search_input: Input,
    chat_input: Input,
    focus: Pane,
    view_mode: ViewMode,
    chat_open: bool,
    popup: Option<Popup>,
    status: Option<(String, Instant)>,
    table_state: TableState,
    areas: HitAreas,
    data_source: String,
    config_path: String,
    log_buffer: LogRingBuffer,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        config: Config,
        store: OrganizationStore,
        assistant: AssistantSession,
        data_source: String,
        log_buffer: LogRingBuffer,
    ) -> Self {
        let coordinator = StateCoordinator::new(store, &config);
        let config_path = Config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "-".to_string());
        let view_mode = config.display.default_view;

        Self {
            config,
            coordinator,
            assistant,
            search_input: Input::default(),
            chat_input: Input::default(),
            focus: Pane::Search,
            view_mode,
            chat_open: false,
            popup: None,
            status: None,
            table_state: TableState::default(),
            areas: HitAreas::default(),
            data_source,
            config_path,
            log_buffer,
            should_quit: false,
        }
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!(
            target: "tui",
            "Starting with {} organizations from {}",
            self.coordinator.store().len(),
            self.data_source
        );

        while !self.should_quit {
            self.coordinator.tick(Instant::now());
            if self.assistant.poll(self.coordinator.conversation_mut()) {
                debug!(target: "tui", "Assistant reply appended");
            }

            terminal.draw(|f| self.ui(f))?;

            if event::poll(TICK)? {
                match event::read()? {
                    Event::Key(key) => {
                        // Release events arrive on Windows
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    // ========== KEYBOARD ==========

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('s') => {
                    self.export_transcript();
                    return;
                }
                _ => {}
            }
        }

        if self.popup.is_some() {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::F(1) | KeyCode::F(3) | KeyCode::F(12) | KeyCode::Char('q')
            ) {
                self.popup = None;
            }
            return;
        }

        match key.code {
            KeyCode::F(1) => self.popup = Some(Popup::Help),
            KeyCode::F(2) => self.cycle_view(),
            KeyCode::F(3) => self.popup = Some(Popup::Settings),
            KeyCode::F(4) => self.toggle_chat(),
            KeyCode::F(5) => self.reload_config(),
            KeyCode::F(12) => self.popup = Some(Popup::Logs),
            KeyCode::Tab => self.focus_next(),
            KeyCode::Esc => {
                if self.chat_open && self.focus == Pane::Chat {
                    self.toggle_chat();
                } else {
                    self.should_quit = true;
                }
            }
            _ => match self.focus {
                Pane::Search => self.handle_search_key(key),
                Pane::Table => self.handle_table_key(key),
                Pane::Map => self.handle_map_key(key),
                Pane::Chat => self.handle_chat_key(key),
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Enter => {
                self.focus = if self.view_mode.shows_table() {
                    Pane::Table
                } else {
                    Pane::Map
                };
            }
            _ => {
                let before = self.search_input.value().to_string();
                self.search_input.handle_event(&Event::Key(key));
                if self.search_input.value() != before {
                    let query = self.search_input.value().to_string();
                    self.coordinator.set_query(&query);
                }
            }
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        let page = self.table_page_size();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.coordinator.table_down(),
            KeyCode::Up | KeyCode::Char('k') => self.coordinator.table_up(),
            KeyCode::PageDown => self.coordinator.table_page_down(page),
            KeyCode::PageUp => self.coordinator.table_page_up(page),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.coordinator.activate_table_row() {
                    debug!(target: "tui", "Row activated: {}", id);
                }
            }
            KeyCode::Delete | KeyCode::Backspace => self.coordinator.clear_selection(),
            KeyCode::Char('/') => self.focus = Pane::Search,
            _ => {}
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => {
                self.coordinator.cycle_marker(true);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.coordinator.cycle_marker(false);
            }
            KeyCode::Delete | KeyCode::Backspace => self.coordinator.clear_selection(),
            KeyCode::Char('/') => self.focus = Pane::Search,
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_question(),
            _ => {
                self.chat_input.handle_event(&Event::Key(key));
            }
        }
    }

    fn submit_question(&mut self) {
        // The context must match what the search box shows
        self.coordinator.flush_filter();
        let question = self.chat_input.value().to_string();
        let context: Vec<Organization> = self
            .coordinator
            .visible()
            .into_iter()
            .cloned()
            .collect();

        match self
            .assistant
            .submit(&question, context, self.coordinator.conversation_mut())
        {
            Ok(()) => self.chat_input.reset(),
            Err(SubmitRejected::Busy) => {
                self.set_status("Зачекайте на відповідь на попереднє запитання");
            }
            Err(SubmitRejected::EmptyQuestion) => {}
        }
    }

    /// Re-read the config file. New map defaults re-aim the camera.
    fn reload_config(&mut self) {
        match Config::load() {
            Ok(config) => {
                info!(target: "config", "Config reloaded from {}", self.config_path);
                self.coordinator.set_map_defaults(config.map.defaults());
                self.config = config;
                self.set_status("Конфігурацію перечитано");
            }
            Err(e) => {
                error!(target: "config", "Config reload failed: {:#}", e);
                self.set_status(format!("Помилка конфігурації: {}", e));
            }
        }
    }

    fn export_transcript(&mut self) {
        let dir = AppPaths::transcript_dir(self.config.behavior.transcript_dir.as_ref());
        match self.coordinator.conversation().export_transcript(&dir) {
            Ok(Some(path)) => self.set_status(format!("Транскрипт збережено: {}", path.display())),
            Ok(None) => self.set_status("Немає повідомлень для збереження"),
            Err(e) => {
                error!(target: "tui", "Transcript export failed: {:#}", e);
                self.set_status(format!("Не вдалося зберегти транскрипт: {}", e));
            }
        }
    }

    // ========== FOCUS AND LAYOUT ==========

    fn panes(&self) -> Vec<Pane> {
        let mut panes = vec![Pane::Search];
        if self.view_mode.shows_table() {
            panes.push(Pane::Table);
        }
        if self.view_mode.shows_map() {
            panes.push(Pane::Map);
        }
        if self.chat_open {
            panes.push(Pane::Chat);
        }
        panes
    }

    fn focus_next(&mut self) {
        let panes = self.panes();
        let pos = panes.iter().position(|p| *p == self.focus).unwrap_or(0);
        self.focus = panes[(pos + 1) % panes.len()];
    }

    fn cycle_view(&mut self) {
        self.view_mode = self.view_mode.next();
        if !self.panes().contains(&self.focus) {
            self.focus = Pane::Search;
        }
        self.set_status(format!("Вигляд: {}", self.view_mode.label()));
    }

    fn toggle_chat(&mut self) {
        self.chat_open = !self.chat_open;
        if self.chat_open {
            self.focus = Pane::Chat;
        } else if self.focus == Pane::Chat {
            self.focus = Pane::Search;
        }
    }

    fn table_page_size(&self) -> usize {
        self.areas
            .table
            .map(|area| (area.height.saturating_sub(2 + HEADER_HEIGHT) / ROW_HEIGHT) as usize)
            .unwrap_or(1)
            .max(1)
    }

    // ========== MOUSE ==========

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.popup.is_some() {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(area) = self.areas.table.filter(|a| a.contains(pos)) {
                    self.focus = Pane::Table;
                    let count = self.coordinator.visible().len();
                    if let Some(row) = row_at(area, mouse.row, self.table_state.offset(), count) {
                        self.coordinator.click_table_row(row);
                    }
                } else if let Some(area) = self.areas.map.filter(|a| a.contains(pos)) {
                    self.focus = Pane::Map;
                    let inner = inner_area(area);
                    if inner.contains(pos) {
                        self.coordinator.click_map_cell(
                            mouse.column - inner.x,
                            mouse.row - inner.y,
                            inner.width,
                            inner.height,
                        );
                    }
                } else if self.areas.chat.is_some_and(|a| a.contains(pos)) {
                    self.focus = Pane::Chat;
                } else if self.areas.search.is_some_and(|a| a.contains(pos)) {
                    self.focus = Pane::Search;
                }
            }
            MouseEventKind::ScrollDown if self.areas.table.is_some_and(|a| a.contains(pos)) => {
                self.coordinator.table_down();
            }
            MouseEventKind::ScrollUp if self.areas.table.is_some_and(|a| a.contains(pos)) => {
                self.coordinator.table_up();
            }
            _ => {}
        }
    }

    // ========== RENDERING ==========

    fn ui(&mut self, f: &mut Frame) {
        self.areas = HitAreas::default();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_search(f, chunks[0]);

        let main = if self.chat_open {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(chunks[1]);
            self.render_chat_panel(f, halves[1]);
            halves[0]
        } else {
            chunks[1]
        };

        match self.view_mode {
            ViewMode::Table => {
                let parts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(6), Constraint::Length(10)])
                    .split(main);
                self.render_table_panel(f, parts[0]);
                self.render_details_panel(f, parts[1]);
            }
            ViewMode::Split => {
                let parts = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(main);
                let right = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(8), Constraint::Length(10)])
                    .split(parts[1]);
                self.render_table_panel(f, parts[0]);
                self.render_map_panel(f, right[0]);
                self.render_details_panel(f, right[1]);
            }
            ViewMode::Map => {
                let parts = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .split(main);
                self.render_map_panel(f, parts[0]);
                self.render_details_panel(f, parts[1]);
            }
        }

        self.render_status_line(f, chunks[2]);

        match self.popup {
            Some(Popup::Help) => render_help(f),
            Some(Popup::Settings) => {
                let ctx = SettingsContext {
                    data_source: &self.data_source,
                    organization_count: self.coordinator.store().len(),
                    config_path: &self.config_path,
                    tile_url: &self.config.map.tile_url,
                };
                render_settings(f, &ctx);
            }
            Some(Popup::Logs) => render_logs(f, &self.log_buffer.get_recent(LOG_OVERLAY_LINES)),
            None => {}
        }
    }

    fn render_search(&mut self, f: &mut Frame, area: Rect) {
        self.areas.search = Some(area);
        let focused = self.focus == Pane::Search;

        let title = if self.coordinator.is_filter_pending() {
            "Пошук за назвою, категорією або адресою (…)"
        } else {
            "Пошук за назвою, категорією або адресою"
        };
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let (scroll, cursor) = input_window(&self.search_input, area.width.saturating_sub(2) as usize);

        let input = Paragraph::new(self.search_input.value())
            .style(Style::default().fg(Color::Yellow))
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            );
        f.render_widget(input, area);

        if focused {
            f.set_cursor_position((area.x + 1 + cursor as u16, area.y + 1));
        }
    }

    fn render_table_panel(&mut self, f: &mut Frame, area: Rect) {
        self.areas.table = Some(area);
        let rows = self.coordinator.table_rows();
        if rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(self.coordinator.table().cursor()));
        }
        render_table(
            f,
            area,
            &rows,
            &mut self.table_state,
            self.focus == Pane::Table,
            self.config.display.show_status_badges,
        );
    }

    fn render_map_panel(&mut self, f: &mut Frame, area: Rect) {
        self.areas.map = Some(area);
        let inner = inner_area(area);
        let markers = self.coordinator.markers();
        let selected_name = self
            .coordinator
            .selected_organization()
            .filter(|_| markers.iter().any(|m| m.selected))
            .map(|org| org.name.as_str());

        let ctx = MapRenderContext {
            viewport: Viewport::new(self.coordinator.map().camera(), inner.width, inner.height),
            markers: &markers,
            selected_name,
            attribution: &self.config.map.attribution,
            use_glyphs: self.config.display.use_glyphs,
            focused: self.focus == Pane::Map,
            animating: self.coordinator.map().is_animating(),
        };
        render_map(f, area, &ctx);
    }

    fn render_details_panel(&self, f: &mut Frame, area: Rect) {
        let selected = self.coordinator.selected_organization();
        let visible = selected.is_some_and(|org| {
            self.coordinator
                .visible()
                .iter()
                .any(|v| v.id == org.id)
        });
        render_details(f, area, selected, visible);
    }

    fn render_chat_panel(&mut self, f: &mut Frame, area: Rect) {
        self.areas.chat = Some(area);
        let ctx = ChatRenderContext {
            log: self.coordinator.conversation(),
            input: &self.chat_input,
            waiting: self.assistant.slot().elapsed(),
            context_size: self.coordinator.visible().len(),
            focused: self.focus == Pane::Chat,
        };
        render_chat(f, area, &ctx);
    }

    fn render_status_line(&mut self, f: &mut Frame, area: Rect) {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > STATUS_TTL)
        {
            self.status = None;
        }

        let left = match &self.status {
            Some((message, _)) => Span::styled(message.clone(), Style::default().fg(Color::Yellow)),
            None => Span::styled(
                "F1 довідка  F2 вигляд  F3 інтеграція  F4 чат  Tab панель  Esc вихід",
                Style::default().fg(Color::DarkGray),
            ),
        };

        let selection = self
            .coordinator
            .selected_organization()
            .map(|org| format!(" · {}", org.name))
            .unwrap_or_default();
        let right = format!(
            "{} з {} · {}{} ",
            self.coordinator.visible().len(),
            self.coordinator.store().len(),
            self.view_mode.label(),
            selection
        );

        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(right.chars().count() as u16)])
            .split(area);

        f.render_widget(Paragraph::new(Line::from(left)), parts[0]);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                right,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))),
            parts[1],
        );
    }
}

/// Run the interactive map and table browser until the user quits
pub fn run_tui(config: Config, store: OrganizationStore, data_source: String) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let session = {
        let _guard = runtime.enter();
        let client = GeminiClient::new(&config.assistant)?;
        let bridge = AssistantBridge::new(Arc::new(client), config.assistant.temperature);
        AssistantSession::new(bridge, runtime.handle().clone())
    };
    let log_buffer = get_log_buffer().unwrap_or_else(LogRingBuffer::new);
    let mut app = TuiApp::new(config, store, session, data_source, log_buffer);

    if let Err(e) = enable_raw_mode() {
        return Err(anyhow::anyhow!("Failed to enable raw mode: {}. Try --list instead.", e));
    }

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
        }
    };

    let res = app.run_app(&mut terminal);

    // Always restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    // Do not wait for a reply nobody will read
    runtime.shutdown_background();

    res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
}
