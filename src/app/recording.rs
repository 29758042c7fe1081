use std::path::Path;

use egui::{Context, Window};
use log::error;

use crate::export;

const EXPORT_PREFIX: &str = "export";

impl super::PlotterApp {
    /// Writes the current buffers to `{export_dir}/export_{timestamp}.csv`.
    pub(super) fn export(&mut self) {
        let dir = Path::new(&self.settings.export_dir);
        match export::export_columns(dir, EXPORT_PREFIX, self.model.buffers()) {
            Ok(path) => {
                self.message = Some(format!("Export file name: \"{}\"", path.display()));
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.message = Some(format!("Export failed: {}", e));
            }
        }
    }

    pub(super) fn show_message(&mut self, ctx: &Context) {
        let Some(message) = &self.message else {
            return;
        };
        let mut close = false;
        Window::new("Export")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        if close {
            self.message = None;
        }
    }
}
