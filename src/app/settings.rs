use egui::{Context, DragValue, TextEdit, Window};
use serde::{Deserialize, Serialize};

/// Display preferences, persisted between runs through eframe storage.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub export_dir: String,
    pub auto_y: bool, // Autoscale the Y axis instead of the fixed range below
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: "./exports".to_owned(),
            auto_y: false,
            y_min: 0.0,
            y_max: 100.0,
        }
    }
}

impl super::PlotterApp {
    pub(super) fn show_settings(&mut self, ctx: &Context) {
        if !self.settings_open {
            return;
        }
        Window::new("Settings")
            .auto_sized()
            .interactable(true)
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.heading("Settings");
                    ui.label("Export directory:");
                    ui.add(
                        TextEdit::singleline(&mut self.settings.export_dir)
                            .desired_width(300.0)
                            .hint_text("Directory for exported CSV files"),
                    );
                    ui.checkbox(&mut self.settings.auto_y, "Autoscale Y axis");
                    ui.add_enabled_ui(!self.settings.auto_y, |ui| {
                        ui.horizontal(|ui| {
                            ui.label("Y range:");
                            ui.add(DragValue::new(&mut self.settings.y_min).speed(1.0));
                            ui.label("to");
                            ui.add(DragValue::new(&mut self.settings.y_max).speed(1.0));
                        });
                    });
                    if self.settings.y_min >= self.settings.y_max {
                        ui.colored_label(
                            egui::Color32::RED,
                            "Lower bound must be below upper bound",
                        );
                    }
                    ui.separator();
                    ui.label(format!(
                        "{} @ {} baud, {} columns, polling every {:?}",
                        self.config.port,
                        self.config.baud_rate,
                        self.config.columns,
                        self.config.poll_interval
                    ));
                    if ui.button("Close").clicked() {
                        self.settings_open = false;
                    }
                });
            });
    }
}
