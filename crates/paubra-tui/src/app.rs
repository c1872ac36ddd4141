use std::path::PathBuf;
use std::sync::Arc;

use paubra_core::{ChatSession, CompletionClient, CompletionOutcome, Config, SendRejected, Theme};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::tui::AppEvent;

pub struct App {
    pub should_quit: bool,

    // Conversation
    pub session: ChatSession,
    pub client: Arc<CompletionClient>,

    // Input box
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Message list
    pub chat_scroll: u16,
    pub chat_height: u16,      // inner height, updated during render
    pub chat_total_lines: u16, // wrapped line count, updated during render
    pub follow_tail: bool,
    pub chat_area: Option<Rect>,

    // Typing indicator
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub show_reset_confirm: bool,

    pub config: Config,
    config_path: Option<PathBuf>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        session: ChatSession,
        client: Arc<CompletionClient>,
        config: Config,
        config_path: Option<PathBuf>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            session,
            client,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_total_lines: 0,
            follow_tail: true,
            chat_area: None,
            animation_frame: 0,
            show_reset_confirm: false,
            config,
            config_path,
            events,
        }
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn is_sending(&self) -> bool {
        self.session.is_sending()
    }

    /// Submit the input box. The completion runs on its own task and comes back as
    /// [`AppEvent::Reply`].
    pub fn submit(&mut self) {
        let pending = match self.session.begin_send(&self.input) {
            Ok(pending) => pending,
            Err(SendRejected::Empty) => return,
            Err(SendRejected::Busy) => {
                debug!("ignoring submit while a reply is pending");
                return;
            }
        };

        self.input.clear();
        self.input_cursor = 0;
        self.animation_frame = 0;
        self.follow_tail = true;

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = pending.run(&client).await;
            if events.send(AppEvent::Reply(outcome)).is_err() {
                warn!("reply arrived after the UI shut down");
            }
        });
    }

    pub fn on_reply(&mut self, outcome: CompletionOutcome) {
        self.session.finish_send(outcome);
        self.follow_tail = true;
    }

    pub fn tick(&mut self) {
        if self.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Reset flow
    pub fn request_reset(&mut self) {
        self.show_reset_confirm = true;
    }

    pub fn cancel_reset(&mut self) {
        self.show_reset_confirm = false;
    }

    pub fn confirm_reset(&mut self) {
        self.session.reset();
        self.input.clear();
        self.input_cursor = 0;
        self.chat_scroll = 0;
        self.follow_tail = true;
        self.show_reset_confirm = false;
    }

    pub fn toggle_theme(&mut self) {
        self.config.theme = self.config.theme.toggled();
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "failed to save theme");
            }
        }
    }

    // Scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_total_lines.saturating_sub(visible_height)
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}


#[cfg(test)]
mod tests {
    use super::testing::test_app;
    use super::*;
    use paubra_core::ChatRole;

    #[test]
    fn test_utf8_editing() {
        let (mut app, _rx) = test_app("ok");
        for c in "mabuhây".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.delete_before_cursor();
        assert_eq!(app.input, "mabuhy");
        app.move_cursor_home();
        app.delete_at_cursor();
        assert_eq!(app.input, "abuhy");
        app.move_cursor_end();
        assert_eq!(app.input_cursor, 5);
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (mut app, mut rx) = test_app("Salamat!");
        app.input = "hello".to_string();
        app.input_cursor = 5;

        app.submit();
        assert!(app.is_sending());
        assert!(app.input.is_empty());
        assert_eq!(app.session.turns().last().unwrap().role, ChatRole::User);

        let Some(AppEvent::Reply(outcome)) = rx.recv().await else {
            panic!("expected a reply event");
        };
        app.on_reply(outcome);
        assert!(!app.is_sending());
        assert_eq!(app.session.turns().last().unwrap().text, "Salamat!");
    }

    #[test]
    fn test_blank_submit_keeps_input() {
        let (mut app, _rx) = test_app("ok");
        app.input = "   ".to_string();
        app.submit();
        assert_eq!(app.input, "   ");
        assert_eq!(app.session.turns().len(), 1);
        assert!(!app.is_sending());
    }

    #[test]
    fn test_tick_only_animates_while_sending() {
        let (mut app, _rx) = test_app("ok");
        app.tick();
        assert_eq!(app.animation_frame, 0);
    }

    #[test]
    fn test_reset_flow() {
        let (mut app, _rx) = test_app("ok");
        app.session.begin_send("hi").unwrap();
        app.on_reply(CompletionOutcome::Reply("hello".to_string()));
        app.input = "draft".to_string();

        app.request_reset();
        assert!(app.show_reset_confirm);
        app.cancel_reset();
        assert_eq!(app.session.turns().len(), 3);

        app.request_reset();
        app.confirm_reset();
        assert!(!app.show_reset_confirm);
        assert_eq!(app.session.turns().len(), 1);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_toggle_theme_saves_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let (mut app, _rx) = test_app("ok");
        app.config_path = Some(path.clone());

        app.toggle_theme();
        assert_eq!(app.theme(), Theme::Dark);
        assert_eq!(Config::load_from(&path).unwrap().theme, Theme::Dark);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (mut app, _rx) = test_app("ok");
        app.chat_height = 2;
        app.chat_total_lines = 37;

        app.scroll_down(1000);
        let bottom = app.chat_scroll;
        assert_eq!(bottom, 35);
        assert!(app.follow_tail);

        app.scroll_up(3);
        assert_eq!(app.chat_scroll, bottom - 3);
        assert!(!app.follow_tail);

        app.scroll_to_bottom();
        assert_eq!(app.chat_scroll, bottom);
    }
}
