use std::fmt;
use std::fs;
use std::path::Path;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Stroke, StrokeKind, Ui};

use crate::util::format_bytes;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const UPLOAD_SECS: f64 = 2.0;

/// Local-only rejection reasons; nothing is ever sent anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadError {
    TooLarge,
    NotPdf,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge => write!(f, "File size exceeds 10MB limit"),
            Self::NotPdf => write!(f, "Only PDF files are allowed"),
        }
    }
}

#[derive(Clone, Debug)]
struct PendingFile {
    name: String,
    size: u64,
}

/// Drag-or-click PDF selection with local validation and a fixed-delay
/// simulated transfer that always succeeds.
pub struct UploadPanel {
    file: Option<PendingFile>,
    error: Option<UploadError>,
    uploading_since: Option<f64>,
}

impl UploadPanel {
    pub fn new() -> Self {
        Self {
            file: None,
            error: None,
            uploading_since: None,
        }
    }

    fn validate(name: &str, mime: &str, size: u64) -> Result<(), UploadError> {
        if size > MAX_FILE_SIZE {
            return Err(UploadError::TooLarge);
        }

        let pdf_mime = mime.eq_ignore_ascii_case("application/pdf");
        let pdf_extension = Path::new(name)
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"));
        if !pdf_mime && !pdf_extension {
            return Err(UploadError::NotPdf);
        }

        Ok(())
    }

    /// Validates a candidate file; a rejection surfaces its message and
    /// leaves any previously accepted file untouched.
    pub fn offer_file(&mut self, name: String, mime: &str, size: u64) {
        match Self::validate(&name, mime, size) {
            Ok(()) => {
                self.error = None;
                self.file = Some(PendingFile { name, size });
            }
            Err(error) => {
                log::warn!("upload candidate {name} rejected: {error}");
                self.error = Some(error);
            }
        }
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading_since.is_some()
    }

    pub fn begin_upload(&mut self, now: f64) {
        if self.file.is_some() && self.uploading_since.is_none() {
            self.error = None;
            self.uploading_since = Some(now);
        }
    }

    /// True exactly once, when the simulated transfer delay has elapsed.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.uploading_since {
            Some(started_at) if now - started_at >= UPLOAD_SECS => {
                self.uploading_since = None;
                true
            }
            _ => false,
        }
    }

    fn offer_dropped(&mut self, file: &egui::DroppedFile) {
        let size = file
            .bytes
            .as_ref()
            .map(|bytes| bytes.len() as u64)
            .or_else(|| {
                let path = file.path.as_ref()?;
                Some(fs::metadata(path).ok()?.len())
            })
            .unwrap_or(0);

        let name = if file.name.is_empty() {
            file.path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            file.name.clone()
        };

        self.offer_file(name, &file.mime, size);
    }

    fn browse(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF documents", &["pdf"])
            .pick_file()
        else {
            return;
        };

        let size = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.offer_file(name, "", size);
    }

    /// Returns true when the simulated upload completes this frame.
    pub fn show(&mut self, ui: &mut Ui, now: f64) -> bool {
        let dropped = ui.ctx().input(|input| input.raw.dropped_files.clone());
        if let Some(file) = dropped.first() {
            self.offer_dropped(file);
        }
        let drop_hovering = ui
            .ctx()
            .input(|input| !input.raw.hovered_files.is_empty());

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Upload Your Book PDF");
            ui.add_space(12.0);

            if let Some(error) = self.error {
                ui.colored_label(Color32::from_rgb(229, 72, 77), error.to_string());
                ui.add_space(8.0);
            }

            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(420.0, 140.0), Sense::click());
            let border = if drop_hovering {
                Color32::from_rgb(103, 196, 255)
            } else {
                Color32::from_gray(110)
            };
            ui.painter()
                .rect_stroke(rect, 8.0, Stroke::new(1.5, border), StrokeKind::Inside);
            let prompt = if drop_hovering {
                "Drop the PDF file here..."
            } else {
                "Drag & drop a PDF file here, or click to select one"
            };
            ui.painter().text(
                rect.center() - egui::vec2(0.0, 10.0),
                Align2::CENTER_CENTER,
                prompt,
                FontId::proportional(14.0),
                ui.visuals().text_color(),
            );
            ui.painter().text(
                rect.center() + egui::vec2(0.0, 14.0),
                Align2::CENTER_CENTER,
                "Max file size: 10MB",
                FontId::proportional(11.0),
                ui.visuals().weak_text_color(),
            );
            if response.clicked() && !self.is_uploading() {
                self.browse();
            }

            if let Some(file) = &self.file {
                ui.add_space(10.0);
                ui.label(
                    RichText::new(format!("{} ({})", file.name, format_bytes(file.size)))
                        .monospace(),
                );
            }

            ui.add_space(12.0);
            let label = if self.is_uploading() {
                "Uploading..."
            } else {
                "Upload and Process"
            };
            let button = ui.add_enabled(
                self.has_file() && !self.is_uploading(),
                egui::Button::new(label).min_size(egui::vec2(200.0, 32.0)),
            );
            if button.clicked() {
                self.begin_upload(now);
            }
        });

        if self.is_uploading() {
            ui.ctx().request_repaint();
        }
        self.poll(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_pdf_is_rejected_and_never_completes() {
        let mut panel = UploadPanel::new();
        panel.offer_file("book.pdf".to_owned(), "application/pdf", 12 * 1024 * 1024);

        assert_eq!(panel.error, Some(UploadError::TooLarge));
        assert_eq!(
            UploadError::TooLarge.to_string(),
            "File size exceeds 10MB limit"
        );
        assert!(!panel.has_file());

        // With nothing accepted, the upload can never start or complete.
        panel.begin_upload(0.0);
        assert!(!panel.is_uploading());
        assert!(!panel.poll(100.0));
    }

    #[test]
    fn non_pdf_is_rejected() {
        let mut panel = UploadPanel::new();
        panel.offer_file("notes.txt".to_owned(), "text/plain", 1024);

        assert_eq!(panel.error, Some(UploadError::NotPdf));
        assert_eq!(UploadError::NotPdf.to_string(), "Only PDF files are allowed");
        assert!(!panel.has_file());
    }

    #[test]
    fn pdf_mime_is_enough_without_extension() {
        let mut panel = UploadPanel::new();
        panel.offer_file("book".to_owned(), "application/pdf", 1024);
        assert!(panel.has_file());
        assert!(panel.error.is_none());
    }

    #[test]
    fn rejection_keeps_previously_accepted_file() {
        let mut panel = UploadPanel::new();
        panel.offer_file("book.pdf".to_owned(), "", 5 * 1024 * 1024);
        assert!(panel.has_file());

        panel.offer_file("huge.pdf".to_owned(), "", 12 * 1024 * 1024);
        assert!(panel.has_file(), "old selection survives a rejection");
        assert!(panel.error.is_some());
    }

    #[test]
    fn upload_completes_after_fixed_delay() {
        let mut panel = UploadPanel::new();
        panel.offer_file("book.pdf".to_owned(), "", 1024);
        panel.begin_upload(10.0);

        assert!(panel.is_uploading());
        assert!(!panel.poll(10.5), "still inside the simulated transfer");
        assert!(panel.poll(10.0 + UPLOAD_SECS));
        assert!(!panel.is_uploading());
        assert!(!panel.poll(20.0), "completion fires exactly once");
    }

    #[test]
    fn exactly_ten_megabytes_is_allowed() {
        let mut panel = UploadPanel::new();
        panel.offer_file("edge.pdf".to_owned(), "", MAX_FILE_SIZE);
        assert!(panel.has_file());
    }
}
