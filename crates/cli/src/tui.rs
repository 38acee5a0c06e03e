use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use robobat_core::battery::parse_threshold;
use robobat_core::config::SimCfg;
use robobat_core::io::input::{self as commands, CommandSender};
use robobat_core::io::output::NotificationReceiver;
use robobat_core::runtime::DashboardStatus;
use robobat_core::types::Notification;
use robobat_logs::source::{LogEntry, LogError, LogSource};

use crate::event::AppEvent;
use crate::widgets;

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);
/// Toasts beyond this are dropped oldest first.
const MAX_TOASTS: usize = 4;

/// Sidebar pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Logs,
    System,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Logs, Page::System];

    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Logs => "Logs (API)",
            Self::System => "System",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Dashboard => Self::Logs,
            Self::Logs => Self::System,
            Self::System => Self::Dashboard,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Dashboard => Self::System,
            Self::Logs => Self::Dashboard,
            Self::System => Self::Logs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Logs page content. A failed fetch leaves it loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LogsView {
    Loading,
    Loaded(Vec<LogEntry>),
}

/// A notification with the moment it appeared.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

impl Toast {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// Result of a background log fetch, tagged with the visit that started it.
type LogsResult = (u64, Result<Vec<LogEntry>, LogError>);

/// TUI application state.
pub struct App {
    pub page: Page,
    pub theme: Theme,
    pub status: DashboardStatus,
    pub logs: LogsView,
    /// Bumped on every visit to the Logs page; stale fetches are ignored.
    logs_visit: u64,
    /// Threshold field on the System page.
    pub input: String,
    pub cursor: usize,
    pub toasts: Vec<Toast>,
    pub config_entries: Vec<(&'static str, String, &'static str)>,
    pub should_exit: bool,
}

impl App {
    fn new(cfg: &SimCfg, status: DashboardStatus) -> Self {
        let input = status.threshold.to_string();
        Self {
            page: Page::Dashboard,
            theme: Theme::Dark,
            cursor: input.len(),
            input,
            status,
            logs: LogsView::Loading,
            logs_visit: 0,
            toasts: Vec::new(),
            config_entries: cfg.to_entries(),
            should_exit: false,
        }
    }

    /// Switch page. Returns the visit id when a log fetch should start.
    fn navigate(&mut self, page: Page) -> Option<u64> {
        if page == self.page {
            return None;
        }
        self.page = page;
        match page {
            Page::Logs => {
                self.logs = LogsView::Loading;
                self.logs_visit += 1;
                Some(self.logs_visit)
            }
            Page::System => {
                // field starts from the committed value, like a freshly mounted form
                self.input = self.status.threshold.to_string();
                self.cursor = self.input.len();
                None
            }
            Page::Dashboard => None,
        }
    }

    fn on_logs(&mut self, visit: u64, result: Result<Vec<LogEntry>, LogError>) {
        match result {
            Ok(entries) if visit == self.logs_visit => {
                self.logs = LogsView::Loaded(entries);
            }
            Ok(_) => {
                tracing::debug!(visit, current = self.logs_visit, "stale log fetch discarded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "log fetch failed");
            }
        }
    }

    fn push_toast(&mut self, notification: Notification) {
        self.toasts.push(Toast { notification, shown_at: Instant::now() });
        if self.toasts.len() > MAX_TOASTS {
            let excess = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..excess);
        }
    }

    fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }

    /// Drop the newest dismissible toast.
    fn dismiss_toast(&mut self) {
        if let Some(pos) = self.toasts.iter().rposition(|t| t.notification.is_dismissible()) {
            self.toasts.remove(pos);
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = ?self.theme, "theme toggled");
    }

    /// Parse the threshold field. Errors become a local toast.
    fn take_threshold(&mut self) -> Option<f64> {
        match parse_threshold(&self.input) {
            Ok(v) => Some(v),
            Err(e) => {
                self.push_toast(Notification::error(format!("Invalid threshold: {e}")));
                None
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn move_cursor_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor >= self.input.len() {
            return;
        }
        self.cursor = self.input[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.input.len());
    }
}

/// Run the TUI event loop. Blocks until the user exits (Ctrl+C / q).
pub async fn run_app(
    cfg: Arc<SimCfg>,
    command_tx: CommandSender,
    mut note_rx: NotificationReceiver,
    mut status_rx: watch::Receiver<DashboardStatus>,
    log_source: Arc<dyn LogSource>,
    token: CancellationToken,
) -> anyhow::Result<()> {
    // Enter raw mode + alternate screen
    terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut event_rx = crate::event::spawn(stop.clone());
    let (logs_tx, mut logs_rx) = mpsc::unbounded_channel::<LogsResult>();

    let initial = status_rx.borrow_and_update().clone();
    let mut app = App::new(&cfg, initial);
    let mut toast_interval = tokio::time::interval(Duration::from_millis(250));
    toast_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Initial draw
    terminal.draw(|f| widgets::draw(f, &app))?;

    loop {
        if app.should_exit {
            break;
        }
        tokio::select! {
            _ = token.cancelled() => {
                break;
            }
            evt = event_rx.recv() => {
                let Some(evt) = evt else { break };
                match evt {
                    AppEvent::Key(key) => {
                        if let Some(visit) = handle_key(&mut app, key, &command_tx).await {
                            spawn_log_fetch(Arc::clone(&log_source), visit, logs_tx.clone());
                        }
                    }
                    AppEvent::Resize => {}
                }
            }
            Some(note) = note_rx.recv() => {
                app.push_toast(note);
            }
            Ok(()) = status_rx.changed() => {
                app.status = status_rx.borrow_and_update().clone();
            }
            Some((visit, result)) = logs_rx.recv() => {
                app.on_logs(visit, result);
            }
            _ = toast_interval.tick() => {
                app.expire_toasts(Instant::now());
            }
        }
        terminal.draw(|f| widgets::draw(f, &app))?;
    }

    // Cleanup
    stop.store(true, Ordering::Relaxed);
    terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Fetch on a background task so a slow API never blocks the UI.
fn spawn_log_fetch(source: Arc<dyn LogSource>, visit: u64, tx: mpsc::UnboundedSender<LogsResult>) {
    tokio::spawn(async move {
        tracing::debug!(source = source.name(), visit, "fetching logs");
        let result = source.fetch().await;
        let _ = tx.send((visit, result));
    });
}

/// Handle a key press. Returns a visit id when a log fetch should start.
async fn handle_key(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    command_tx: &CommandSender,
) -> Option<u64> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_exit = true;
            return None;
        }
        KeyCode::Char('r') if ctrl => {
            recharge(command_tx).await;
            return None;
        }
        KeyCode::Char('t') if ctrl => {
            app.toggle_theme();
            return None;
        }
        KeyCode::Tab => return app.navigate(app.page.next()),
        KeyCode::BackTab => return app.navigate(app.page.prev()),
        KeyCode::Esc => {
            app.dismiss_toast();
            return None;
        }
        _ => {}
    }

    if app.page == Page::System {
        handle_form_key(app, key.code, command_tx).await;
        return None;
    }

    match key.code {
        KeyCode::Char('q') => app.should_exit = true,
        KeyCode::Char('1') => return app.navigate(Page::Dashboard),
        KeyCode::Char('2') => return app.navigate(Page::Logs),
        KeyCode::Char('3') => return app.navigate(Page::System),
        KeyCode::Char('r') => recharge(command_tx).await,
        KeyCode::Char('t') => app.toggle_theme(),
        _ => {}
    }
    None
}

/// Keys on the System page edit the threshold field.
async fn handle_form_key(app: &mut App, code: KeyCode, command_tx: &CommandSender) {
    match code {
        KeyCode::Enter => {
            if let Some(threshold) = app.take_threshold()
                && let Err(e) = commands::submit_threshold(command_tx, threshold).await
            {
                tracing::warn!(error = %e, "runtime gone, threshold not saved");
            }
        }
        KeyCode::Backspace => app.delete_char_before_cursor(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.input.len(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

async fn recharge(command_tx: &CommandSender) {
    if let Err(e) = commands::submit_recharge(command_tx).await {
        tracing::warn!(error = %e, "runtime gone, recharge ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robobat_core::types::Severity;
    use robobat_logs::source::{LogStatus, MockSource};

    fn app() -> App {
        let cfg = SimCfg::default();
        let status = DashboardStatus { threshold: cfg.threshold, ..DashboardStatus::default() };
        App::new(&cfg, status)
    }

    fn entry() -> LogEntry {
        LogEntry {
            time: "12:00".into(),
            event: "Module diagnostics Apt. 556".into(),
            operator: "Bret".into(),
            status: LogStatus::Ok,
        }
    }

    #[test]
    fn entering_logs_starts_a_fetch() {
        let mut a = app();
        assert_eq!(a.navigate(Page::Logs), Some(1));
        assert_eq!(a.logs, LogsView::Loading);
        assert_eq!(a.navigate(Page::Logs), None);
        a.navigate(Page::Dashboard);
        assert_eq!(a.navigate(Page::Logs), Some(2));
    }

    #[test]
    fn stale_or_failed_fetch_keeps_loading() {
        let mut a = app();
        a.navigate(Page::Logs);
        a.navigate(Page::Dashboard);
        a.navigate(Page::Logs);
        a.on_logs(1, Ok(vec![entry()]));
        assert_eq!(a.logs, LogsView::Loading);
        a.on_logs(2, Err(LogError::Status(500)));
        assert_eq!(a.logs, LogsView::Loading);
        a.on_logs(2, Ok(vec![entry()]));
        assert_eq!(a.logs, LogsView::Loaded(vec![entry()]));
    }

    #[test]
    fn toasts_expire_and_dismiss() {
        let mut a = app();
        a.push_toast(Notification::warning("low"));
        a.push_toast(Notification::error("dead"));
        a.dismiss_toast();
        assert_eq!(a.toasts.len(), 1);
        assert_eq!(a.toasts[0].notification.severity, Severity::Error);
        // errors are not dismissible
        a.dismiss_toast();
        assert_eq!(a.toasts.len(), 1);
        a.expire_toasts(Instant::now() + TOAST_DURATION);
        assert!(a.toasts.is_empty());
    }

    #[test]
    fn toast_stack_is_bounded() {
        let mut a = app();
        for i in 0..10 {
            a.push_toast(Notification::success(format!("n{i}")));
        }
        assert_eq!(a.toasts.len(), MAX_TOASTS);
        assert_eq!(a.toasts[0].notification.message, "n6");
    }

    #[test]
    fn system_page_resets_field_to_committed_threshold() {
        let mut a = app();
        a.navigate(Page::System);
        assert_eq!(a.input, "20");
        a.insert_char('5');
        assert_eq!(a.input, "205");
        a.navigate(Page::Dashboard);
        a.navigate(Page::System);
        assert_eq!(a.input, "20");
    }

    #[test]
    fn bad_threshold_raises_error_toast() {
        let mut a = app();
        a.input = "abc".into();
        assert_eq!(a.take_threshold(), None);
        assert_eq!(a.toasts[0].notification.severity, Severity::Error);
        a.input = "35".into();
        assert_eq!(a.take_threshold(), Some(35.0));
    }

    #[test]
    fn cursor_editing() {
        let mut a = app();
        a.input.clear();
        a.cursor = 0;
        a.insert_char('1');
        a.insert_char('5');
        a.move_cursor_left();
        a.insert_char('2');
        assert_eq!(a.input, "125");
        a.move_cursor_right();
        a.delete_char_before_cursor();
        assert_eq!(a.input, "12");
    }

    #[test]
    fn theme_toggles() {
        let mut a = app();
        a.toggle_theme();
        assert_eq!(a.theme, Theme::Light);
        a.toggle_theme();
        assert_eq!(a.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn background_fetch_feeds_logs_page() {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogsResult>();
        let mut a = app();
        let visit = a.navigate(Page::Logs).unwrap();

        spawn_log_fetch(Arc::new(MockSource::failing()), visit, tx.clone());
        let (v, result) = rx.recv().await.unwrap();
        assert!(result.is_err());
        a.on_logs(v, result);
        assert_eq!(a.logs, LogsView::Loading);

        spawn_log_fetch(Arc::new(MockSource::new(vec![entry()])), visit, tx);
        let (v, result) = rx.recv().await.unwrap();
        a.on_logs(v, result);
        assert_eq!(a.logs, LogsView::Loaded(vec![entry()]));
    }

    #[tokio::test]
    async fn enter_on_system_page_sends_threshold() {
        let (tx, mut rx) = commands::channel(4);
        let mut a = app();
        a.navigate(Page::System);
        a.input = "42.5".into();
        handle_form_key(&mut a, KeyCode::Enter, &tx).await;
        assert_eq!(rx.recv().await, Some(commands::Command::SetThreshold(42.5)));
    }
}
