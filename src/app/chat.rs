use std::time::Duration;

use eframe::egui::{self, Align, Color32, Frame, Layout, RichText, Ui};
use rand::Rng;

use crate::util::{format_clock, wall_secs};

pub const HISTORY_LOAD_SECS: f64 = 2.0;
pub const REPLY_DELAY_SECS: f64 = 1.5;
pub const ASSISTANT_PLACEHOLDER: &str =
    "This is a placeholder response. Implement actual AI response here.";
const HISTORY_LOAD_ERROR: &str = "Failed to load chat history. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct ChatEntry {
    pub role: Role,
    pub text: String,
    pub timestamp: u64,
}

enum HistoryState {
    Idle,
    Loading { started_at: f64 },
    Failed(String),
    Ready,
}

/// Append-only transcript with a simulated assistant. The reply timer and
/// the history-load timer are plain deadlines against the UI clock, so they
/// die with the panel.
pub struct ChatPanel {
    failure_rate: f32,
    history: HistoryState,
    transcript: Vec<ChatEntry>,
    draft: String,
    reply_due: Option<f64>,
}

impl ChatPanel {
    pub fn new(failure_rate: f32) -> Self {
        Self {
            failure_rate,
            history: HistoryState::Idle,
            transcript: Vec::new(),
            draft: String::new(),
            reply_due: None,
        }
    }

    /// Starts the history load the first time the panel is shown, so the
    /// loading delay runs from the moment the tab is opened.
    pub fn open(&mut self, now: f64) {
        if matches!(self.history, HistoryState::Idle) {
            self.history = HistoryState::Loading { started_at: now };
        }
    }

    pub fn is_typing(&self) -> bool {
        self.reply_due.is_some()
    }

    /// Appends the user entry immediately and schedules the assistant reply.
    /// Blank input and sends while a reply is pending are ignored.
    pub fn send(&mut self, text: &str, now: f64) {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.is_typing() {
            return;
        }

        self.transcript.push(ChatEntry {
            role: Role::User,
            text: trimmed.to_owned(),
            timestamp: wall_secs(),
        });
        self.reply_due = Some(now + REPLY_DELAY_SECS);
    }

    /// Advances the panel's timers: history load completion (with injected
    /// failure) and the pending assistant reply.
    pub fn poll(&mut self, now: f64) {
        if let HistoryState::Loading { started_at } = self.history
            && now - started_at >= HISTORY_LOAD_SECS
        {
            if rand::rng().random::<f32>() < self.failure_rate {
                log::warn!("chat history load failed (injected)");
                self.history = HistoryState::Failed(HISTORY_LOAD_ERROR.to_owned());
            } else {
                self.history = HistoryState::Ready;
            }
        }

        if let Some(due) = self.reply_due
            && now >= due
        {
            self.transcript.push(ChatEntry {
                role: Role::Assistant,
                text: ASSISTANT_PLACEHOLDER.to_owned(),
                timestamp: wall_secs(),
            });
            self.reply_due = None;
        }
    }

    pub fn retry_history(&mut self, now: f64) {
        self.history = HistoryState::Loading { started_at: now };
    }

    pub fn show(&mut self, ui: &mut Ui, now: f64) {
        self.open(now);
        self.poll(now);

        match &self.history {
            HistoryState::Idle | HistoryState::Loading { .. } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading chat history...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
                ui.ctx().request_repaint_after(Duration::from_millis(100));
                return;
            }
            HistoryState::Failed(message) => {
                let message = message.clone();
                ui.add_space(24.0);
                ui.colored_label(Color32::from_rgb(229, 72, 77), message);
                ui.add_space(10.0);
                if ui.button("Retry").clicked() {
                    self.retry_history(now);
                }
                return;
            }
            HistoryState::Ready => {}
        }

        let input_height = 40.0;
        let transcript_height = (ui.available_height() - input_height).max(0.0);

        egui::ScrollArea::vertical()
            .id_salt("chat_transcript")
            .max_height(transcript_height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in &self.transcript {
                    Self::draw_entry(ui, entry);
                }

                if self.is_typing() {
                    ui.label(RichText::new("AI is typing...").italics().weak());
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.draft)
                    .hint_text("Ask a question...")
                    .desired_width(ui.available_width() - 70.0),
            );
            let submitted = response.lost_focus()
                && ui.input(|input| input.key_pressed(egui::Key::Enter));
            let send_clicked = ui
                .add_enabled(!self.is_typing(), egui::Button::new("Send"))
                .clicked();

            if (submitted || send_clicked) && !self.is_typing() {
                let draft = std::mem::take(&mut self.draft);
                self.send(&draft, now);
                response.request_focus();
            }
        });

        if self.is_typing() {
            ui.ctx().request_repaint();
        }
    }

    fn draw_entry(ui: &mut Ui, entry: &ChatEntry) {
        let (layout, fill) = match entry.role {
            Role::User => (
                Layout::top_down(Align::Max),
                Color32::from_rgb(38, 79, 120),
            ),
            Role::Assistant => (Layout::top_down(Align::Min), Color32::from_gray(45)),
        };

        ui.with_layout(layout, |ui| {
            Frame::new()
                .fill(fill)
                .corner_radius(8.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.8);
                    ui.label(&entry.text);
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format_clock(entry.timestamp)).small().weak(),
                        );
                        if entry.role == Role::Assistant && ui.small_button("Copy").clicked() {
                            ui.ctx().copy_text(entry.text.clone());
                        }
                    });
                });
        });
        ui.add_space(6.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_panel() -> ChatPanel {
        let mut panel = ChatPanel::new(0.0);
        panel.open(0.0);
        panel.poll(HISTORY_LOAD_SECS);
        assert!(matches!(panel.history, HistoryState::Ready));
        panel
    }

    #[test]
    fn send_appends_user_entry_then_assistant_reply() {
        let mut panel = ready_panel();
        panel.send("What is chapter 3 about?", 10.0);

        assert_eq!(panel.transcript.len(), 1);
        assert_eq!(panel.transcript[0].role, Role::User);
        assert_eq!(panel.transcript[0].text, "What is chapter 3 about?");
        assert!(panel.is_typing());

        panel.poll(10.0 + REPLY_DELAY_SECS - 0.1);
        assert_eq!(panel.transcript.len(), 1, "reply not due yet");
        assert!(panel.is_typing());

        panel.poll(10.0 + REPLY_DELAY_SECS);
        assert_eq!(panel.transcript.len(), 2);
        assert_eq!(panel.transcript[1].role, Role::Assistant);
        assert_eq!(panel.transcript[1].text, ASSISTANT_PLACEHOLDER);
        assert!(!panel.is_typing(), "indicator gone once the reply lands");
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut panel = ready_panel();
        panel.send("   ", 1.0);
        assert!(panel.transcript.is_empty());
        assert!(!panel.is_typing());
    }

    #[test]
    fn sends_are_ignored_while_typing() {
        let mut panel = ready_panel();
        panel.send("first", 1.0);
        panel.send("second", 1.1);

        assert_eq!(panel.transcript.len(), 1);
        panel.poll(1.0 + REPLY_DELAY_SECS);
        assert_eq!(panel.transcript.len(), 2, "only one reply scheduled");
    }

    #[test]
    fn history_load_failure_is_injected_and_retryable() {
        let mut panel = ChatPanel::new(1.0);
        panel.open(0.0);
        panel.poll(HISTORY_LOAD_SECS);
        match &panel.history {
            HistoryState::Failed(message) => assert_eq!(message, HISTORY_LOAD_ERROR),
            _ => panic!("full failure rate must fail the load"),
        }

        panel.failure_rate = 0.0;
        panel.retry_history(5.0);
        assert!(matches!(panel.history, HistoryState::Loading { .. }));
        panel.poll(5.0 + HISTORY_LOAD_SECS);
        assert!(matches!(panel.history, HistoryState::Ready));
    }

    #[test]
    fn history_load_waits_for_its_delay() {
        let mut panel = ChatPanel::new(0.0);
        panel.open(100.0);
        panel.poll(100.0 + HISTORY_LOAD_SECS - 0.2);
        assert!(matches!(panel.history, HistoryState::Loading { .. }));
    }

    #[test]
    fn history_load_starts_on_first_open() {
        let mut panel = ChatPanel::new(0.0);
        panel.poll(1_000.0);
        assert!(matches!(panel.history, HistoryState::Idle));

        panel.open(1_000.0);
        panel.poll(1_000.0 + HISTORY_LOAD_SECS - 0.1);
        assert!(
            matches!(panel.history, HistoryState::Loading { .. }),
            "delay runs from the first open, not panel construction"
        );
        panel.poll(1_000.0 + HISTORY_LOAD_SECS);
        assert!(matches!(panel.history, HistoryState::Ready));

        // Reopening an already loaded panel must not reset it.
        panel.open(2_000.0);
        assert!(matches!(panel.history, HistoryState::Ready));
    }
}
