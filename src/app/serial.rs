use std::io::Read;

use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::reader::SerialReader;
use crate::record::{RecordDecoder, RecordWidth};

impl super::PlotterApp {
    pub(super) fn is_reading(&self) -> bool {
        self.reader.is_some()
    }

    pub(super) fn start_reader<P>(&mut self, ctx: egui::Context, port: P) -> Result<(), Error>
    where
        P: Read + Send + 'static,
    {
        if self.is_reading() {
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let decoder = RecordDecoder::new(RecordWidth::Fixed(self.config.columns));
        let reader = SerialReader::start(port, decoder, self.config.poll_interval, tx, move || {
            ctx.request_repaint()
        })?;

        self.reader = Some(reader);
        self.batch_rx = Some(rx);
        self.status = None;
        Ok(())
    }

    /// Reopens the configured port and starts reading again.
    pub(super) fn restart_reader(&mut self, ctx: &egui::Context) {
        let port = match self.config.open_port() {
            Ok(port) => port,
            Err(e) => {
                warn!("Could not reopen {}: {}", self.config.port, e);
                self.status = Some(e.to_string());
                return;
            }
        };
        if let Err(e) = self.start_reader(ctx.clone(), port) {
            warn!("Could not start serial reader: {}", e);
            self.status = Some(e.to_string());
        }
    }

    /// Joins the reader, then applies whatever it sent before it stopped.
    pub(super) fn stop_reader(&mut self) -> Result<(), Error> {
        let result = match self.reader.take() {
            Some(mut reader) => reader.stop(),
            None => Ok(()),
        };
        self.drain_batches();
        self.batch_rx = None;
        result
    }

    /// Applies every queued batch, in the order the reader produced them.
    pub(super) fn drain_batches(&mut self) {
        let Some(rx) = self.batch_rx.as_mut() else {
            return;
        };
        while let Ok(batch) = rx.try_recv() {
            self.model.apply_batch(&batch);
        }
    }

    /// A reader that exits on its own has hit an I/O error. That is fatal:
    /// the error goes back to `main` and the window closes.
    pub(super) fn check_reader(&mut self, ctx: &egui::Context) {
        if !self.reader.as_ref().is_some_and(SerialReader::is_finished) {
            return;
        }
        match self.stop_reader() {
            Ok(()) => info!("Serial reader exited"),
            Err(e) => {
                error!("Serial connection failed: {}", e);
                self.status = Some(e.to_string());
                if let Ok(mut fault) = self.fault.lock() {
                    *fault = Some(e);
                }
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}
