use std::{
    io::Read,
    sync::{Arc, Mutex},
};

use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::Error;
use crate::plot::PlotModel;
use crate::reader::SerialReader;
use crate::record::Batch;

// Submodules for split impl blocks
mod graph;
mod recording;
mod serial;
mod settings;
mod ui;

pub use settings::Settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The live plotter window. Owns the plot state and the reader feeding it.
pub struct PlotterApp {
    config: Config,
    settings: Settings, // Persistent, see `save`
    model: PlotModel,
    reader: Option<SerialReader>,
    batch_rx: Option<mpsc::UnboundedReceiver<Batch>>,
    status: Option<String>,  // Last connection problem, shown in the top bar
    message: Option<String>, // Modal message, e.g. the exported file name
    settings_open: bool,
    fault: Arc<Mutex<Option<Error>>>, // Fatal reader error handed back to `main`
}

impl PlotterApp {
    /// Called once before the first frame, with the port already open.
    pub fn new<P>(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        port: P,
        fault: Arc<Mutex<Option<Error>>>,
    ) -> Result<Self, Error>
    where
        P: Read + Send + 'static,
    {
        // Load previous settings (if any).
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut app = Self {
            model: PlotModel::new(config.columns),
            config,
            settings,
            reader: None,
            batch_rx: None,
            status: None,
            message: None,
            settings_open: false,
            fault,
        };
        app.start_reader(cc.egui_ctx.clone(), port)?;
        Ok(app)
    }
}

impl eframe::App for PlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}
