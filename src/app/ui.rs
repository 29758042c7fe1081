use egui::{CentralPanel, Context, RichText, TopBottomPanel};
use log::{info, warn};

use super::graph;

impl super::PlotterApp {
    /// Called each time the UI needs repainting, either from user input or
    /// because the reader delivered a batch.
    pub(super) fn update_ui(&mut self, ctx: &Context) {
        self.drain_batches();
        self.check_reader(ctx);

        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                let running = self.is_reading();
                if ui.button(if running { "Stop" } else { "Start" }).clicked() {
                    if running {
                        match self.stop_reader() {
                            Ok(()) => info!("Reading stopped by user"),
                            Err(e) => {
                                warn!("Serial reader stopped with error: {}", e);
                                self.status = Some(e.to_string());
                            }
                        }
                    } else {
                        self.restart_reader(ctx);
                    }
                }
                if ui.button("Export").clicked() {
                    self.export();
                }
                if ui.button("Clear").clicked() {
                    self.model.clear();
                    info!("Data cleared by user");
                }
                if ui.button("Settings").clicked() {
                    self.settings_open = !self.settings_open;
                }

                ui.separator();

                // One toggle per plotted series, coloured like its line
                for series in 0..self.model.series_count() {
                    let mut visible = !self.model.is_hidden(series);
                    let text = RichText::new(graph::series_name(series))
                        .color(graph::series_color(series));
                    if ui.checkbox(&mut visible, text).changed() {
                        self.model.set_hidden(series, !visible);
                    }
                }
            });

            ui.horizontal(|ui| {
                let state = if self.is_reading() { "Reading" } else { "Stopped" };
                ui.label(format!(
                    "{} {} @ {} baud | {} samples",
                    state,
                    self.config.port,
                    self.config.baud_rate,
                    self.model.buffers().len()
                ));
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::RED, status);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("v{}", super::VERSION));
                });
            });
        });

        CentralPanel::default().show(ctx, |ui| {
            graph::show_plot(ui, &self.model, &self.settings);
        });

        self.show_settings(ctx);
        self.show_message(ctx);
    }
}
