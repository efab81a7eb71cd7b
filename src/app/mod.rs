use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use eframe::egui::{self, Context};

use crate::data::FetchConfig;

mod chat;
mod graph;
mod header;
mod physics;
mod render_utils;
mod upload;

use chat::ChatPanel;
use graph::GraphView;
use header::Header;
use upload::UploadPanel;

pub const PROCESSING_SECS: f64 = 3.0;

pub struct BookGraphApp {
    config: FetchConfig,
    header: Header,
    stage: Stage,
    crash: Option<String>,
}

/// Page-level flow: Upload -> Processing -> Content. There is no path back
/// to Upload; restarting the app is the only way to re-upload.
enum Stage {
    Upload(UploadPanel),
    Processing { started_at: f64 },
    Content(Box<ContentStage>),
}

struct ContentStage {
    tab: ContentTab,
    graph: GraphView,
    chat: ChatPanel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContentTab {
    Graph,
    Chat,
}

impl ContentStage {
    fn new(config: FetchConfig) -> Self {
        Self {
            tab: ContentTab::Graph,
            graph: GraphView::new(config),
            chat: ChatPanel::new(config.failure_rate),
        }
    }
}

impl BookGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: FetchConfig) -> Self {
        Self::with_config(config)
    }

    fn with_config(config: FetchConfig) -> Self {
        Self {
            config,
            header: Header::new(),
            stage: Stage::Upload(UploadPanel::new()),
            crash: None,
        }
    }

    fn begin_processing(&mut self, now: f64) {
        log::info!("upload accepted, entering processing stage");
        self.stage = Stage::Processing { started_at: now };
    }

    fn try_finish_processing(&mut self, now: f64) {
        if let Stage::Processing { started_at } = &self.stage
            && now - *started_at >= PROCESSING_SECS
        {
            log::info!("processing finished, entering content stage");
            self.stage = Stage::Content(Box::new(ContentStage::new(self.config)));
        }
    }

    fn draw_stage(&mut self, ctx: &Context) {
        let now = ctx.input(|input| input.time);

        self.header.show(ctx);
        Self::draw_footer(ctx);

        let mut upload_completed = false;
        let mut page_scroll = 0.0_f32;

        match &mut self.stage {
            Stage::Upload(panel) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    let output = egui::ScrollArea::vertical()
                        .id_salt("page_scroll")
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            upload_completed = panel.show(ui, now);
                        });
                    page_scroll = output.state.offset.y;
                });
            }
            Stage::Processing { .. } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Processing your PDF...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            Stage::Content(content) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut content.tab, ContentTab::Graph, "Knowledge Graph");
                        ui.selectable_value(&mut content.tab, ContentTab::Chat, "Chat Engine");
                    });
                    ui.separator();

                    match content.tab {
                        ContentTab::Graph => content.graph.show(ui),
                        ContentTab::Chat => content.chat.show(ui, now),
                    }
                });
            }
        }

        self.header.set_scroll_offset(page_scroll);
        if upload_completed {
            self.begin_processing(now);
        }
        self.try_finish_processing(now);
    }

    fn draw_footer(ctx: &Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("KnowledgeGraph AI. All processing is simulated locally.")
                        .small()
                        .weak(),
                );
            });
        });
    }

    fn draw_crash_screen(ctx: &Context, report: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Oops! Something went wrong.");
                ui.add_space(6.0);
                ui.label(
                    "An error occurred while rendering this page. \
                     Please restart the application or report the problem if it persists.",
                );
            });

            if cfg!(debug_assertions) {
                ui.add_space(16.0);
                ui.collapsing("Error details", |ui| {
                    ui.monospace(report);
                });
            }
        });
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

impl eframe::App for BookGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(report) = self.crash.clone() {
            Self::draw_crash_screen(ctx, &report);
            return;
        }

        // Supervisor boundary: a panic while drawing swaps the whole UI for
        // the fallback screen. Worker/timer failures never panic; they travel
        // as Err values over their channels and surface inline instead.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.draw_stage(ctx))) {
            let report = panic_message(payload);
            log::error!("stage rendering panicked: {report}");
            self.crash = Some(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FetchConfig {
        FetchConfig {
            seed: Some(1),
            failure_rate: 0.0,
            delay_ms: 0,
        }
    }

    #[test]
    fn upload_success_drives_processing_then_content() {
        let mut app = BookGraphApp::with_config(test_config());
        assert!(matches!(app.stage, Stage::Upload(_)));

        app.begin_processing(50.0);
        assert!(matches!(app.stage, Stage::Processing { .. }));

        app.try_finish_processing(50.0 + PROCESSING_SECS - 0.5);
        assert!(
            matches!(app.stage, Stage::Processing { .. }),
            "fixed delay has not elapsed yet"
        );

        app.try_finish_processing(50.0 + PROCESSING_SECS);
        match &app.stage {
            Stage::Content(content) => assert_eq!(content.tab, ContentTab::Graph),
            _ => panic!("expected content stage with the graph tab selected"),
        }
    }

    #[test]
    fn processing_cannot_finish_from_other_stages() {
        let mut app = BookGraphApp::with_config(test_config());
        app.try_finish_processing(1e9);
        assert!(matches!(app.stage, Stage::Upload(_)));
    }

    #[test]
    fn panic_message_extracts_common_payloads() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("boom".to_owned())), "boom");
        assert_eq!(panic_message(Box::new(42_u32)), "unknown panic payload");
    }
}
