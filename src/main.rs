#![warn(clippy::all, rust_2018_idioms)]

use std::{
    process::ExitCode,
    sync::{Arc, Mutex},
};

use log::{error, info};
use serial_plotter::{config::Config, prompt, Error, PlotterApp};

fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let config = {
        let ports = prompt::list_ports()?;
        let mut prompter = prompt::Prompter::stdio();
        let (port, baud_rate) = prompter.configure_serial(&ports)?;
        let (columns, interval) = prompter.configure_plot()?;
        Config::new(port, baud_rate, columns, interval)?
    };

    // Failing to open the port ends the program before any window shows up.
    let port = config.open_port()?;

    let fault = Arc::new(Mutex::new(None));
    let app_fault = fault.clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Serial Plotter"),
        ..Default::default()
    };

    info!(
        "Plotting {} columns from {} at {} baud",
        config.columns, config.port, config.baud_rate
    );
    // The reader thread is stopped when the app is dropped, on every exit path.
    let result = eframe::run_native(
        "Serial Plotter",
        native_options,
        Box::new(move |cc| {
            let app = PlotterApp::new(cc, config, port, app_fault)?;
            Ok(Box::new(app))
        }),
    );

    if let Some(e) = fault.lock().ok().and_then(|mut fault| fault.take()) {
        return Err(e);
    }
    result.map_err(|e| Error::Gui(e.to_string()))
}
