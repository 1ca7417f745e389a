//! Application state for the TUI.

use codemesh_core::reply::{interpret, ReplyOutcome};
use codemesh_core::types::{AgentKind, AnalysisRequest};
use codemesh_core::{DashboardState, MeshClient};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

/// One resolved analysis round trip, delivered back to the select loop by the
/// per-submission task.
#[derive(Debug)]
pub struct ReplyEvent {
    /// Sequence the request was dispatched under
    pub seq: u64,
    /// Persona the request was addressed to
    pub agent: AgentKind,
    /// Raw reply text, or a display-ready transport error message
    pub result: Result<String, String>,
}

/// Main application state.
pub struct App {
    /// Shared dashboard state both flows write into
    pub dashboard: DashboardState,
    /// Prompt input buffer
    pub prompt: String,
    /// Currently selected persona
    pub agent: AgentKind,
    /// Scroll offset for the response panel
    pub scroll_offset: u16,
    /// Set to exit the main loop
    pub should_quit: bool,
    /// HTTP client, cloned into each submission task
    client: MeshClient,
    /// Repository path sent with every request
    repo_path: String,
    /// Channel the submission tasks resolve into
    reply_tx: mpsc::Sender<ReplyEvent>,
}

impl App {
    pub fn new(client: MeshClient, repo_path: String, reply_tx: mpsc::Sender<ReplyEvent>) -> Self {
        Self {
            dashboard: DashboardState::new(),
            prompt: String::new(),
            agent: AgentKind::default(),
            scroll_offset: 0,
            should_quit: false,
            client,
            repo_path,
            reply_tx,
        }
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.agent = self.agent.next(),
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::Char(c) => self.prompt.push(c),
            _ => {}
        }
    }

    /// Dispatch the current prompt as an analysis request. An empty prompt is
    /// a no-op. Overlapping submissions are allowed; the dashboard keeps only
    /// the result of the freshest one.
    fn submit_prompt(&mut self) {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return;
        }
        self.prompt.clear();
        self.scroll_offset = 0;

        let seq = self.dashboard.begin_analysis();
        let agent = self.agent;
        let request = AnalysisRequest {
            repo_path: self.repo_path.clone(),
            prompt,
            agent,
        };
        tracing::info!(seq, agent = %agent, "Submitting analysis request");

        let client = self.client.clone();
        let reply_tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let result = client
                .analyze(&request)
                .await
                .map_err(|e| format!("Error contacting analysis service: {e}"));
            // Receiver gone means the app is shutting down
            let _ = reply_tx.send(ReplyEvent { seq, agent, result }).await;
        });
    }

    /// Apply a resolved analysis round trip: interpret the raw reply (or show
    /// the transport error as narrative) and let the dashboard decide whether
    /// the result is still the freshest.
    pub fn apply_reply(&mut self, event: ReplyEvent) {
        let outcome = match event.result {
            Ok(raw) => interpret(event.agent, &raw),
            Err(message) => {
                tracing::warn!(seq = event.seq, "Analysis request failed: {message}");
                ReplyOutcome::Narrative(message)
            }
        };
        if self.dashboard.finish_analysis(event.seq, outcome) {
            self.scroll_offset = 0;
        }
    }
}
