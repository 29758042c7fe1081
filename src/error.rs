use std::io;
use thiserror::Error;

/// Everything that can go wrong outside of per-line decoding, which is never an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No serial ports found")]
    NoPorts,

    #[error("Invalid input {input:?}: expected {expected}")]
    InvalidInput { input: String, expected: &'static str },

    #[error("Serial error: {0}")]
    Serial(#[from] mio_serial::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serial reader thread panicked")]
    ReaderPanicked,

    #[error("Interrupted before the recording was saved")]
    Aborted,

    #[error("GUI error: {0}")]
    Gui(String),
}
