use std::{
    io::{self, Read},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error, info, trace};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::record::{Batch, RecordDecoder};

const READ_CHUNK: usize = 1024;

/// Reads everything the port has buffered right now and appends it to `out`.
///
/// Stops at `WouldBlock`, `TimedOut` or a zero-length read. Any other error is
/// returned as is.
pub fn drain_available<R: Read + ?Sized>(port: &mut R, out: &mut Vec<u8>) -> io::Result<usize> {
    let mut readbuf = [0u8; READ_CHUNK];
    let start = out.len();
    loop {
        match port.read(&mut readbuf) {
            Ok(0) => break,
            Ok(count) => out.extend_from_slice(&readbuf[..count]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out.len() - start)
}

/// Background task turning serial bytes into batches of records.
///
/// The thread owns the port. Batches go out in production order through an
/// unbounded channel, and `wake` is called after every delivery so the consumer
/// can schedule itself (the GUI passes `Context::request_repaint`).
pub struct SerialReader {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl SerialReader {
    /// Starts reading. A last line still missing its terminator when the
    /// reader stops is dropped.
    pub fn start<P, W>(
        port: P,
        decoder: RecordDecoder,
        interval: Duration,
        tx: mpsc::UnboundedSender<Batch>,
        wake: W,
    ) -> Result<Self, Error>
    where
        P: Read + Send + 'static,
        W: Fn() + Send + 'static,
    {
        Self::spawn(port, decoder, interval, tx, wake, false)
    }

    /// Like `start`, but when stopped the reader hands over the unterminated
    /// last line as a final batch, if it forms a valid record.
    pub fn start_flushing<P, W>(
        port: P,
        decoder: RecordDecoder,
        interval: Duration,
        tx: mpsc::UnboundedSender<Batch>,
        wake: W,
    ) -> Result<Self, Error>
    where
        P: Read + Send + 'static,
        W: Fn() + Send + 'static,
    {
        Self::spawn(port, decoder, interval, tx, wake, true)
    }

    fn spawn<P, W>(
        port: P,
        decoder: RecordDecoder,
        interval: Duration,
        tx: mpsc::UnboundedSender<Batch>,
        wake: W,
        flush_tail: bool,
    ) -> Result<Self, Error>
    where
        P: Read + Send + 'static,
        W: Fn() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_task = running.clone();

        let handle = thread::Builder::new()
            .name("serial-reader".to_owned())
            .spawn(move || {
                info!("Serial reader started, polling every {:?}", interval);
                let mut decoder = decoder;
                let result = read_loop(port, &mut decoder, interval, &running_task, &tx, &wake);
                running_task.store(false, Ordering::Release);
                if flush_tail && result.is_ok() {
                    if let Some(record) = decoder.finish() {
                        debug!("Flushing unterminated last line");
                        if tx.send(vec![record]).is_ok() {
                            wake();
                        }
                    }
                }
                match &result {
                    Ok(()) => info!("Serial reader stopped"),
                    Err(e) => error!("Serial reader failed: {}", e),
                }
                result
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// True until `stop` is called or the thread exits by itself.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The thread has exited without being asked to, e.g. after an I/O error.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_finished())
    }

    /// Clears the running flag and waits for the thread. Once this returns no
    /// further batch is sent. Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        debug!("Waiting for serial reader to finish");
        match handle.join() {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::ReaderPanicked),
        }
    }
}

impl Drop for SerialReader {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Error while stopping serial reader: {}", e);
        }
    }
}

fn read_loop<P: Read>(
    mut port: P,
    decoder: &mut RecordDecoder,
    interval: Duration,
    running: &AtomicBool,
    tx: &mpsc::UnboundedSender<Batch>,
    wake: &dyn Fn(),
) -> io::Result<()> {
    let mut raw = Vec::with_capacity(READ_CHUNK);

    while running.load(Ordering::Acquire) {
        thread::sleep(interval);

        raw.clear();
        let count = drain_available(&mut port, &mut raw)?;
        if count > 0 {
            trace!("Received {} bytes: {:?}", count, String::from_utf8_lossy(&raw));
        }

        let batch = decoder.decode(&raw);
        if batch.is_empty() {
            continue;
        }

        debug!("Sending batch of {} records", batch.len());
        if tx.send(batch).is_err() {
            debug!("Batch receiver dropped, stopping serial reader");
            break;
        }
        wake();
    }

    Ok(())
}
