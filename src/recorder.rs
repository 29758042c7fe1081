//! Headless recording: gathers every delivered record until told to stop.

use std::{future::Future, io};

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::reader::SerialReader;
use crate::record::{Batch, Record};

/// Outcome of a recording session. `rows` holds everything received, also
/// when `result` says the session ended with an error.
#[derive(Debug)]
pub struct Recording {
    pub rows: Vec<Record>,
    pub result: Result<(), Error>,
}

/// Collects batches until `shutdown` resolves or the reader exits by itself,
/// then stops the reader and picks up whatever it delivered while stopping.
pub async fn record_until<F>(
    mut reader: SerialReader,
    mut rx: mpsc::UnboundedReceiver<Batch>,
    shutdown: F,
) -> Recording
where
    F: Future<Output = io::Result<()>>,
{
    let mut rows: Vec<Record> = Vec::new();
    tokio::pin!(shutdown);

    let interrupted = loop {
        tokio::select! {
            batch = rx.recv() => match batch {
                Some(batch) => {
                    debug!("Received {} records", batch.len());
                    rows.extend(batch);
                }
                // Sender dropped: the reader exited, stop() below reports why
                None => break Ok(()),
            },
            signal = &mut shutdown => break signal,
        }
    };

    info!("Stopping");
    let stopped = reader.stop();
    while let Ok(batch) = rx.try_recv() {
        rows.extend(batch);
    }
    info!("Recorded {} rows", rows.len());

    let result = interrupted.map_err(Error::from).and(stopped);
    if let Err(e) = &result {
        warn!("Recording ended early: {}", e);
    }
    Recording { rows, result }
}
