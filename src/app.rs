use anyhow::anyhow;
use tokio::task::JoinHandle;

use crate::api::MentorApi;
use crate::store::ConversationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state
    pub store: ConversationStore,
    pub reply_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Composer state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat viewport state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub api: MentorApi,
    seen_revision: u64,
}

impl App {
    pub fn new(api: MentorApi) -> Self {
        Self {
            should_quit: false,
            // Chat-first UI: start ready to type.
            input_mode: InputMode::Editing,

            store: ConversationStore::new(),
            reply_task: None,

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            api,
            seen_revision: 0,
        }
    }

    /// Submits the composer text. The store decides whether the submission
    /// is accepted (non-blank, nothing in flight); an accepted one clears
    /// the composer and spawns the proxy call in the background.
    pub fn submit(&mut self) {
        if let Some(text) = self.store.submit(&self.input) {
            self.input.clear();
            self.cursor = 0;

            let api = self.api.clone();
            self.reply_task = Some(tokio::spawn(async move { api.chat(&text).await }));
        }
    }

    /// Checks whether the in-flight proxy call finished and feeds its
    /// outcome to the store. Called every loop iteration; cheap when
    /// nothing is in flight.
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.reply_task.take() {
            let outcome = match task.await {
                Ok(result) => result,
                Err(err) => Err(anyhow!("reply task failed: {err}")),
            };
            self.store.resolve(outcome);
        }
    }

    /// Scrolls to the latest message whenever the conversation has grown
    /// since the last render.
    pub fn follow_conversation(&mut self) {
        if self.store.revision() != self.seen_revision {
            self.seen_revision = self.store.revision();
            self.scroll_chat_to_bottom();
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_chat_scroll());
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.chat_height / 2;
        self.chat_scroll = (self.chat_scroll + half_page).min(self.max_chat_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.chat_height / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half_page);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.store.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_line_total().saturating_sub(visible_height)
    }

    /// Total rendered chat lines, accounting for wrapping, role headers and
    /// blank separators. Mirrors how `ui::render` lays the messages out.
    fn chat_line_total(&self) -> u16 {
        // Default to a sane wrap width before the first render.
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.store.messages() {
            total_lines += 1; // Role line ("You:" or "Mentor:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.store.is_pending() {
            total_lines += 2; // "Mentor:" + "Thinking..."
        }

        total_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(MentorApi::new("http://127.0.0.1:0"))
    }

    #[test]
    fn test_follow_conversation_scrolls_on_append() {
        let mut app = test_app();
        app.chat_height = 2;
        app.chat_width = 40;

        for i in 0..5 {
            app.store.submit(&format!("message {i}")).unwrap();
            app.store.resolve(Ok("a reply that takes a line".to_string()));
        }

        app.follow_conversation();
        assert!(app.chat_scroll > 0);

        // No further movement when nothing new arrived.
        let scrolled = app.chat_scroll;
        app.scroll_up();
        app.follow_conversation();
        assert_eq!(app.chat_scroll, scrolled - 1);
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut app = test_app();
        app.chat_height = 50;
        app.store.submit("hi").unwrap();

        app.scroll_down();
        assert_eq!(app.chat_scroll, 0);
        app.scroll_up();
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_animation_only_ticks_while_pending() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.store.submit("hi").unwrap();
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }
}
