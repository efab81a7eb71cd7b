use eframe::egui::{self, Align, Color32, Context, Layout, RichText};

const SCROLL_THRESHOLD: f32 = 10.0;

/// Fixed top bar whose fill reacts to the main scroll offset, recorded
/// explicitly each frame instead of observed through an ambient listener.
pub struct Header {
    scroll_offset: f32,
}

impl Header {
    pub fn new() -> Self {
        Self { scroll_offset: 0.0 }
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset;
    }

    fn is_scrolled(&self) -> bool {
        self.scroll_offset > SCROLL_THRESHOLD
    }

    pub fn show(&self, ctx: &Context) {
        let fill = if self.is_scrolled() {
            Color32::from_rgb(26, 29, 36)
        } else {
            Color32::from_rgb(19, 23, 29)
        };

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(fill)
                    .inner_margin(egui::Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("KnowledgeGraph AI").strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(
                            RichText::new("Visualize and chat with your books").weak(),
                        );
                    });
                });
            });
    }
}
