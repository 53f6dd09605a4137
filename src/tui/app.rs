//! Main TUI application state and logic

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::VibesApi;
use crate::core::sequence;
use crate::core::session::{now_millis, RevealStage, VibeSession};
use crate::error::{Result, VibesError};
use crate::tui::event::{is_force_quit_key, is_quit_key, typed_char, AppEvent, EventHandler};
use crate::tui::ui;

/// How long quitting waits for session saves still in flight
const PERSIST_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Network request the app is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Load,
    Fortune,
    Clarity,
}

/// Message type for async operation results
#[derive(Debug)]
pub enum AsyncMessage {
    /// Session fetched from `get_initial_vibe`
    SessionLoaded(Box<VibeSession>),
    /// Fortune fetched from `get_fortune`
    FortuneReceived(String),
    /// Answer fetched from `clarify_vibes`
    AnswerReceived(String),
    /// Request failed and was logged; the update is dropped
    RequestAbandoned(Request),
}

/// Main TUI application
pub struct App {
    /// Whether the app is running
    pub running: bool,
    /// Local copy of the server's session
    pub session: VibeSession,
    /// Whether the initial fetch has succeeded; nothing is drawn before
    pub state_gathered: bool,
    /// Request in flight, for the spinner
    pub pending: Option<Request>,
    /// Whether to show the help overlay
    pub show_help: bool,
    /// Tick count for the spinner
    pub tick_counter: u64,
    /// Shown in the header
    pub api_label: String,

    api: Arc<dyn VibesApi>,
    tick_rate: Duration,
    /// `update_state` calls not yet known to be finished
    persist_tasks: Vec<JoinHandle<()>>,

    /// Sender for async messages (cloned into tasks)
    pub async_tx: mpsc::Sender<AsyncMessage>,
    /// Receiver for async messages
    pub async_rx: mpsc::Receiver<AsyncMessage>,
}

impl App {
    /// Create a new app instance
    pub fn new(api: Arc<dyn VibesApi>, tick_rate: Duration) -> Self {
        let (async_tx, async_rx) = mpsc::channel(32);

        Self {
            running: true,
            session: VibeSession::default(),
            state_gathered: false,
            pending: None,
            show_help: false,
            tick_counter: 0,
            api_label: String::new(),
            api,
            tick_rate,
            persist_tasks: Vec::new(),
            async_tx,
            async_rx,
        }
    }

    /// Label the header with the API the app talks to
    pub fn with_api_label(mut self, label: impl Into<String>) -> Self {
        self.api_label = label.into();
        self
    }

    /// Leading component of the session
    pub fn stage(&self) -> RevealStage {
        self.session.stage()
    }

    /// The question input is open whenever the fortune view is shown
    pub fn is_typing(&self) -> bool {
        self.state_gathered && self.session.is_fortune_shown
    }

    /// Setup terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| VibesError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| VibesError::Terminal(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| VibesError::Terminal(e.to_string()))?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| VibesError::Terminal(e.to_string()))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| VibesError::Terminal(e.to_string()))?;
        terminal
            .show_cursor()
            .map_err(|e| VibesError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let mut events = EventHandler::new(self.tick_rate);

        // Fetch on mount
        self.load_session();

        let result = self.event_loop(&mut terminal, &mut events).await;

        let restored = Self::restore_terminal(&mut terminal);
        self.flush_persists(PERSIST_FLUSH_TIMEOUT).await;
        restored?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        events: &mut EventHandler,
    ) -> Result<()> {
        while self.running {
            terminal
                .draw(|frame| ui::render(frame, self))
                .map_err(|e| VibesError::Terminal(e.to_string()))?;

            // Check for async messages (non-blocking)
            while let Ok(msg) = self.async_rx.try_recv() {
                self.handle_async_message(msg);
            }

            match events.next().await {
                Some(AppEvent::Key(key)) => self.handle_key_event(key),
                Some(AppEvent::Resize(_, _)) => {
                    // Terminal resize is handled automatically by ratatui
                }
                Some(AppEvent::Tick) => {
                    self.tick_counter = self.tick_counter.wrapping_add(1);
                    self.persist_tasks.retain(|task| !task.is_finished());
                }
                None => self.quit(),
            }
        }
        Ok(())
    }

    /// Handle async message from background tasks
    pub fn handle_async_message(&mut self, msg: AsyncMessage) {
        match msg {
            AsyncMessage::SessionLoaded(_)
                if matches!(self.pending, Some(Request::Fortune | Request::Clarity)) =>
            {
                // Older than the local copy; the pending request persists over it
                tracing::debug!("dropping stale session load");
            }
            AsyncMessage::SessionLoaded(session) => {
                self.session = *session;
                self.state_gathered = true;
                self.finish(Request::Load);
            }
            AsyncMessage::FortuneReceived(fortune) => {
                // The persisted record starts with an empty question; keep
                // whatever was typed while the fortune was on its way.
                let typed = std::mem::take(&mut self.session.question);
                self.session.complete_reveal(fortune);
                self.persist();
                self.session.question = typed;
                self.finish(Request::Fortune);
            }
            AsyncMessage::AnswerReceived(answer) => {
                self.session.complete_clarify(answer);
                self.persist();
                self.finish(Request::Clarity);
            }
            AsyncMessage::RequestAbandoned(request) => self.finish(request),
        }
    }

    fn persist(&mut self) {
        let task = sequence::persist_detached(self.api.clone(), self.session.clone());
        self.persist_tasks.push(task);
    }

    /// Wait for outstanding session saves, giving up after `limit`
    pub async fn flush_persists(&mut self, limit: Duration) {
        let tasks = std::mem::take(&mut self.persist_tasks);
        if tasks.is_empty() {
            return;
        }

        let count = tasks.len();
        if tokio::time::timeout(limit, futures::future::join_all(tasks))
            .await
            .is_err()
        {
            tracing::warn!(count, "gave up waiting for session saves");
        }
    }

    /// Number of session saves not yet seen to finish
    pub fn unsaved_count(&self) -> usize {
        self.persist_tasks.len()
    }

    fn finish(&mut self, request: Request) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // If help is shown, any key dismisses it
        if self.show_help {
            self.show_help = false;
            return;
        }

        if is_force_quit_key(&key) {
            self.quit();
            return;
        }

        if self.is_typing() {
            self.handle_question_key(key);
            return;
        }

        if is_quit_key(&key) {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.load_session(),
            KeyCode::Enter | KeyCode::Char(' ')
                if self.state_gathered
                    && self.session.is_button_shown
                    && self.pending != Some(Request::Load) =>
            {
                self.reveal();
            }
            _ => {}
        }
    }

    /// Keys while the question input is open
    fn handle_question_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_question(),
            KeyCode::Backspace => {
                self.session.question.pop();
            }
            KeyCode::Esc => self.session.question.clear(),
            _ => {
                if let Some(c) = typed_char(&key) {
                    self.session.question.push(c);
                }
            }
        }
    }

    /// Spawn a task to fetch the session from the server
    pub fn load_session(&mut self) {
        // A reload would race the in-flight request and its save
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(Request::Load);

        let api = self.api.clone();
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            match sequence::load_initial(api.as_ref()).await {
                Ok(session) => {
                    let _ = tx.send(AsyncMessage::SessionLoaded(Box::new(session))).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error fetching initial vibe");
                    let _ = tx.send(AsyncMessage::RequestAbandoned(Request::Load)).await;
                }
            }
        });
    }

    /// Press the reveal button
    pub fn reveal(&mut self) {
        let deadline = self.session.begin_reveal(now_millis());
        tracing::info!(deadline, "reveal pressed");
        self.pending = Some(Request::Fortune);

        let api = self.api.clone();
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            match api.get_fortune().await {
                Ok(fortune) => {
                    let _ = tx.send(AsyncMessage::FortuneReceived(fortune)).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error getting fortune");
                    let _ = tx
                        .send(AsyncMessage::RequestAbandoned(Request::Fortune))
                        .await;
                }
            }
        });
    }

    /// Submit the typed question for clarity
    pub fn submit_question(&mut self) {
        let question = self.session.question.clone();
        self.session.begin_clarify(question.clone());
        tracing::info!("clarity submitted");
        self.pending = Some(Request::Clarity);

        let fortune = self.session.fortune.clone();
        let api = self.api.clone();
        let tx = self.async_tx.clone();

        tokio::spawn(async move {
            match api.clarify_vibes(&question, &fortune).await {
                Ok(answer) => {
                    let _ = tx.send(AsyncMessage::AnswerReceived(answer)).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error gaining clarity");
                    let _ = tx
                        .send(AsyncMessage::RequestAbandoned(Request::Clarity))
                        .await;
                }
            }
        });
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::MockVibesApi;
    use crate::core::session::NEXT_ORACLE_DELAY_MS;
    use crossterm::event::KeyModifiers;
    use tokio::time::timeout;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    async fn next_message(app: &mut App) -> AsyncMessage {
        timeout(Duration::from_secs(5), app.async_rx.recv())
            .await
            .expect("message in time")
            .expect("channel open")
    }

    fn gathered(api: MockVibesApi, session: VibeSession) -> App {
        let mut app = App::new(Arc::new(api), Duration::from_millis(250));
        app.handle_async_message(AsyncMessage::SessionLoaded(Box::new(session)));
        app
    }

    #[tokio::test]
    async fn test_initial_load_mirrors_payload() {
        let payload = VibeSession {
            fortune: "Wait.".into(),
            is_button_shown: false,
            is_fortune_shown: false,
            is_clarity_shown: true,
            time_to_next_oracle: Some(7),
            ..VibeSession::default()
        };
        let returned = payload.clone();

        let mut api = MockVibesApi::new();
        api.expect_get_initial_vibe()
            .times(1)
            .returning(move || Ok(returned.clone()));

        let mut app = App::new(Arc::new(api), Duration::from_millis(250));
        assert!(!app.state_gathered);

        app.load_session();
        assert_eq!(app.pending, Some(Request::Load));

        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);

        assert!(app.state_gathered);
        assert_eq!(app.session, payload);
        assert_eq!(app.pending, None);
    }

    #[tokio::test]
    async fn test_failed_load_shows_nothing() {
        let mut api = MockVibesApi::new();
        api.expect_get_initial_vibe().returning(|| {
            Err(VibesError::Api {
                endpoint: "/api/get_initial_vibe".into(),
                status: 502,
                body: String::new(),
            })
        });

        let mut app = App::new(Arc::new(api), Duration::from_millis(250));
        app.load_session();
        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);

        assert!(!app.state_gathered);
        assert_eq!(app.pending, None);
    }

    #[tokio::test]
    async fn test_reveal_then_persist() {
        let (persisted_tx, mut persisted_rx) = mpsc::unbounded_channel();

        let mut api = MockVibesApi::new();
        api.expect_get_fortune()
            .times(1)
            .returning(|| Ok("The lamp is lit.".to_string()));
        api.expect_update_state().returning(move |s| {
            let _ = persisted_tx.send(s.clone());
            Ok(serde_json::json!({}))
        });

        let mut app = gathered(api, VibeSession::default());

        let before = now_millis();
        press(&mut app, KeyCode::Enter);
        let after = now_millis();

        assert!(!app.session.is_button_shown);
        assert!(app.session.is_fortune_shown);
        let deadline = app.session.time_to_next_oracle.unwrap();
        assert!(deadline >= before + NEXT_ORACLE_DELAY_MS);
        assert!(deadline <= after + NEXT_ORACLE_DELAY_MS);
        assert_eq!(app.pending, Some(Request::Fortune));

        // Typing before the fortune arrives is kept locally
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('h'));

        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);
        assert_eq!(app.session.fortune, "The lamp is lit.");
        assert_eq!(app.session.question, "wh");
        assert_eq!(app.pending, None);

        let persisted = timeout(Duration::from_secs(5), persisted_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persisted.fortune, "The lamp is lit.");
        assert_eq!(persisted.question, "");
        assert_eq!(persisted.time_to_next_oracle, Some(deadline));
    }

    #[tokio::test]
    async fn test_question_input_and_clarity() {
        let (persisted_tx, mut persisted_rx) = mpsc::unbounded_channel();

        let mut api = MockVibesApi::new();
        api.expect_clarify_vibes()
            .withf(|question, fortune| question == "why?" && fortune == "Rain.")
            .times(1)
            .returning(|_, _| Ok("Growth.".to_string()));
        api.expect_update_state().returning(move |s| {
            let _ = persisted_tx.send(s.clone());
            Ok(serde_json::json!({}))
        });

        let mut app = gathered(
            api,
            VibeSession {
                fortune: "Rain.".into(),
                is_button_shown: false,
                is_fortune_shown: true,
                time_to_next_oracle: Some(1),
                ..VibeSession::default()
            },
        );
        assert!(app.is_typing());

        // 'q' is text here, not quit
        for c in "whq".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char('?'));
        assert!(app.running);
        assert!(!app.show_help);
        assert_eq!(app.session.question, "why?");

        press(&mut app, KeyCode::Enter);
        assert!(!app.session.is_fortune_shown);
        assert!(app.session.is_clarity_shown);
        assert_eq!(app.pending, Some(Request::Clarity));

        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);
        assert_eq!(app.session.answer, "Growth.");

        let persisted = timeout(Duration::from_secs(5), persisted_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persisted.question, "why?");
        assert!(persisted.is_clarity_shown);
        assert_eq!(persisted.answer, "Growth.");
    }

    #[tokio::test]
    async fn test_failed_fortune_keeps_optimistic_flags() {
        let mut api = MockVibesApi::new();
        api.expect_get_fortune().returning(|| {
            Err(VibesError::Api {
                endpoint: "/api/get_fortune".into(),
                status: 500,
                body: String::new(),
            })
        });
        api.expect_update_state().never();

        let mut app = gathered(api, VibeSession::default());
        press(&mut app, KeyCode::Enter);

        let msg = next_message(&mut app).await;
        assert!(matches!(msg, AsyncMessage::RequestAbandoned(Request::Fortune)));
        app.handle_async_message(msg);

        assert_eq!(app.pending, None);
        assert!(app.session.is_fortune_shown);
        assert!(!app.session.is_button_shown);
        assert_eq!(app.session.fortune, "");
    }

    #[tokio::test]
    async fn test_quit_and_help_keys() {
        let mut app = gathered(
            MockVibesApi::new(),
            VibeSession {
                is_button_shown: false,
                is_clarity_shown: true,
                ..VibeSession::default()
            },
        );

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.show_help);

        // Enter does nothing outside the button stage
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.pending, None);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_while_typing() {
        let mut app = gathered(
            MockVibesApi::new(),
            VibeSession {
                is_button_shown: false,
                is_fortune_shown: true,
                ..VibeSession::default()
            },
        );

        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
        assert_eq!(app.session.question, "");
    }

    #[tokio::test]
    async fn test_reload_ignored_while_clarity_in_flight() {
        let (persisted_tx, mut persisted_rx) = mpsc::unbounded_channel();

        let mut api = MockVibesApi::new();
        api.expect_get_initial_vibe().never();
        api.expect_clarify_vibes()
            .times(1)
            .returning(|_, _| Ok("Growth.".to_string()));
        api.expect_update_state().returning(move |s| {
            let _ = persisted_tx.send(s.clone());
            Ok(serde_json::json!({}))
        });

        let fortune_stage = VibeSession {
            fortune: "Rain.".into(),
            is_button_shown: false,
            is_fortune_shown: true,
            time_to_next_oracle: Some(9),
            ..VibeSession::default()
        };
        let mut app = gathered(api, fortune_stage.clone());

        for c in "why".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.pending, Some(Request::Clarity));

        // A load that was already on its way must not roll the stage back
        app.handle_async_message(AsyncMessage::SessionLoaded(Box::new(fortune_stage)));
        assert!(app.session.is_clarity_shown);
        assert_eq!(app.session.question, "why");

        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);
        app.flush_persists(Duration::from_secs(5)).await;

        let persisted = persisted_rx.try_recv().expect("answer persisted");
        assert_eq!(persisted.question, "why");
        assert_eq!(persisted.answer, "Growth.");
        assert!(!persisted.is_button_shown);
        assert!(!persisted.is_fortune_shown);
        assert!(persisted.is_clarity_shown);
        assert_eq!(persisted.time_to_next_oracle, Some(9));
    }

    #[tokio::test]
    async fn test_reveal_waits_for_pending_reload() {
        let mut api = MockVibesApi::new();
        api.expect_get_initial_vibe()
            .returning(|| Ok(VibeSession::default()));
        api.expect_get_fortune().never();

        let mut app = gathered(api, VibeSession::default());
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.pending, Some(Request::Load));

        press(&mut app, KeyCode::Enter);
        assert!(app.session.is_button_shown);
        assert_eq!(app.pending, Some(Request::Load));

        let msg = next_message(&mut app).await;
        app.handle_async_message(msg);
        assert_eq!(app.pending, None);
    }

    #[tokio::test]
    async fn test_answer_saved_before_quit_returns() {
        let (persisted_tx, mut persisted_rx) = mpsc::unbounded_channel();

        let mut api = MockVibesApi::new();
        api.expect_update_state().times(1).returning(move |s| {
            let _ = persisted_tx.send(s.clone());
            Ok(serde_json::json!({}))
        });

        let mut app = gathered(
            api,
            VibeSession {
                fortune: "Rain.".into(),
                question: "why?".into(),
                is_button_shown: false,
                is_clarity_shown: true,
                ..VibeSession::default()
            },
        );

        app.handle_async_message(AsyncMessage::AnswerReceived("Growth.".into()));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
        assert_eq!(app.unsaved_count(), 1);

        // The single-threaded test runtime has not polled the save yet
        assert!(persisted_rx.try_recv().is_err());

        app.flush_persists(Duration::from_secs(5)).await;
        assert_eq!(app.unsaved_count(), 0);
        let persisted = persisted_rx.try_recv().expect("answer persisted");
        assert_eq!(persisted.answer, "Growth.");
    }
}
