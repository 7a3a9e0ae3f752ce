use askaway_core::{BotReply, ChatError, ChatSession, Exchange, PendingSend, TransportError};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// A backend call running on its own task
struct InFlight {
    pending: PendingSend,
    task: JoinHandle<Result<BotReply, TransportError>>,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input box
    pub input: String,
    pub cursor: usize, // in chars, not bytes

    // Chat state
    pub session: ChatSession,
    in_flight: Option<InFlight>,
    pub chat_scroll: u16,
    pub follow_chat: bool,

    // History drawer
    pub show_history: bool,
    pub history_state: ListState,

    pub animation_frame: u8, // 0-2 for ellipsis animation
    pub backend_label: String,
    pub status: Option<String>,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(session: ChatSession, backend_label: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input: String::new(),
            cursor: 0,
            session,
            in_flight: None,
            chat_scroll: 0,
            follow_chat: true,
            show_history: false,
            history_state: ListState::default(),
            animation_frame: 0,
            backend_label: backend_label.into(),
            status: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_loading()
    }

    /// Send the input box contents. The input is kept while a reply is
    /// outstanding so nothing typed is lost.
    pub fn submit_input(&mut self) {
        match self.session.begin_send(&self.input) {
            Ok(pending) => {
                let backend = self.session.backend();
                let request = pending.request().clone();
                let task = tokio::spawn(async move { backend.send(&request).await });
                self.in_flight = Some(InFlight { pending, task });

                self.input.clear();
                self.cursor = 0;
                self.status = None;
                self.follow_chat = true;
            }
            Err(ChatError::EmptyMessage) => {}
            Err(ChatError::Busy) => {
                self.status = Some("Still waiting for the previous reply".to_string());
            }
        }
    }

    /// Resolve the outstanding request if its task has finished
    pub async fn poll_reply(&mut self) {
        if !self.in_flight.as_ref().is_some_and(|f| f.task.is_finished()) {
            return;
        }
        let Some(InFlight { pending, task }) = self.in_flight.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(TransportError::Network(format!("request task failed: {}", e))),
        };
        let history_len = self.session.history().len();
        self.session.finish_send(pending, result);
        self.follow_chat = true;

        // A successful reply is prepended to history; keep the drawer on the same entry
        if self.session.history().len() > history_len {
            if let Some(i) = self.history_state.selected() {
                self.history_state.select(Some(i + 1));
            }
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Chat scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_chat = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_chat = true;
    }

    /// Clamp the scroll offset to the rendered content, pinning to the
    /// bottom while following. Called by the renderer once it knows sizes.
    pub fn clamp_scroll(&mut self, total_lines: u16, visible_height: u16) {
        let max_scroll = total_lines.saturating_sub(visible_height);
        if self.follow_chat || self.chat_scroll >= max_scroll {
            self.chat_scroll = max_scroll;
            self.follow_chat = true;
        }
    }

    // History drawer
    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
        if self.show_history && self.history_state.selected().is_none() && !self.session.history().is_empty() {
            self.history_state.select(Some(0));
        }
    }

    pub fn history_nav_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        let i = self.history_state.selected().unwrap_or(0);
        self.history_state.select(Some(i.saturating_sub(1)));
    }

    pub fn open_selected_history(&mut self) {
        let Some(entry) = self
            .history_state
            .selected()
            .and_then(|i| self.session.history().get(i))
            .cloned()
        else {
            return;
        };

        match self.session.select_history_entry(&entry) {
            Ok(()) => {
                self.show_history = false;
                self.chat_scroll = 0;
                self.follow_chat = true;
                self.status = None;
            }
            Err(_) => {
                self.status = Some("Wait for the current reply before opening history".to_string());
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.session.clear_history();
        self.history_state.select(None);
        self.status = Some("History cleared".to_string());
    }

    pub fn new_chat(&mut self) {
        match self.session.new_chat() {
            Ok(()) => {
                self.chat_scroll = 0;
                self.follow_chat = true;
                self.status = None;
            }
            Err(_) => {
                self.status = Some("Wait for the current reply before starting over".to_string());
            }
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        self.session.exchanges()
    }
}
