//! Headless recorder: collects records until Ctrl+C, then writes them to a CSV file.

#![warn(clippy::all, rust_2018_idioms)]

use std::{io, path::Path, process::ExitCode, thread};

use log::{error, info, warn};
use serial_plotter::{
    config::{self, DEFAULT_POLL_INTERVAL},
    export, prompt,
    reader::SerialReader,
    record::{RecordDecoder, RecordWidth},
    recorder, Error,
};
use tokio::sync::{mpsc, oneshot};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let ports = prompt::list_ports()?;
    let (port_name, baud_rate) = prompt::Prompter::stdio().configure_serial(&ports)?;
    let port = config::open_port(&port_name, baud_rate)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let decoder = RecordDecoder::new(RecordWidth::Any);
    let reader = SerialReader::start_flushing(port, decoder, DEFAULT_POLL_INTERVAL, tx, || {})?;

    println!("Press Ctrl+C to stop recording");
    let recording = recorder::record_until(reader, rx, tokio::signal::ctrl_c()).await;

    if recording.result.is_err() && recording.rows.is_empty() {
        return recording.result;
    }
    if recording.result.is_err() {
        println!("Recording stopped by an error, saving what was received");
    }

    let Some(prefix) = ask_file_name().await? else {
        warn!("Discarding {} recorded rows", recording.rows.len());
        return Err(Error::Aborted);
    };
    let path = export::export_rows(Path::new("."), &prefix, &recording.rows)?;
    println!("Done: {}", path.display());
    recording.result
}

/// Asks for the export prefix. `None` if Ctrl+C is pressed again meanwhile.
///
/// The Ctrl+C handler stays installed for the rest of the process, so the
/// blocking prompt runs on its own thread and races a fresh signal future.
async fn ask_file_name() -> Result<Option<String>, Error> {
    let (answer_tx, answer_rx) = oneshot::channel();
    thread::spawn(move || {
        let answer = prompt::Prompter::stdio().ask("Enter file name: ");
        let _ = answer_tx.send(answer);
    });

    tokio::select! {
        answer = answer_rx => {
            let answer = answer.map_err(|_| io::Error::other("prompt thread exited"))?;
            answer.map(Some)
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted at the file name prompt");
            Ok(None)
        }
    }
}
