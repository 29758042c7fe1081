use egui::{ecolor::Hsva, Color32};
use egui_plot::{Line, Plot, PlotPoints};

use crate::plot::PlotModel;

use super::Settings;

pub fn series_name(series: usize) -> String {
    format!("Column {}", series + 1)
}

// Golden-ratio hue steps
pub fn series_color(series: usize) -> Color32 {
    let hue = (series as f32 * 0.618_034).fract();
    Hsva::new(hue, 0.85, 0.9, 1.0).into()
}

/// Borrows the series' curve, so drawing a frame does not copy its history.
fn series_points(model: &PlotModel, series: usize) -> PlotPoints<'_> {
    PlotPoints::Borrowed(model.curve(series))
}

pub fn show_plot(ui: &mut egui::Ui, model: &PlotModel, settings: &Settings) {
    let mut plot = Plot::new("data_plot")
        .x_axis_label("Time")
        .show_axes(true)
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true);
    if !settings.auto_y && settings.y_min < settings.y_max {
        plot = plot.default_y_bounds(settings.y_min, settings.y_max);
    }

    plot.show(ui, |plot_ui| {
        for series in 0..model.series_count() {
            let points = series_points(model, series);
            if points.points().is_empty() {
                continue;
            }
            let line = Line::new(series_name(series), points)
                .color(series_color(series))
                .width(1.5);
            plot_ui.line(line);
        }
    });
}
