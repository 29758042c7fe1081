use std::time::Duration;

use log::info;
use mio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::Error;

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pipeline configuration, collected once at startup and handed to whoever needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: String,
    pub baud_rate: u32,
    pub columns: usize, // Field count every accepted record must have, time column included
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(
        port: impl Into<String>,
        baud_rate: u32,
        columns: usize,
        poll_interval_secs: f64,
    ) -> Result<Self, Error> {
        if columns == 0 {
            return Err(Error::InvalidInput {
                input: columns.to_string(),
                expected: "a positive column count",
            });
        }
        let poll_interval = poll_interval_from_secs(poll_interval_secs)?;
        Ok(Self {
            port: port.into(),
            baud_rate,
            columns,
            poll_interval,
        })
    }

    pub fn open_port(&self) -> Result<SerialStream, Error> {
        open_port(&self.port, self.baud_rate)
    }
}

pub fn poll_interval_from_secs(secs: f64) -> Result<Duration, Error> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(Error::InvalidInput {
            input: secs.to_string(),
            expected: "a positive number of seconds",
        });
    }
    Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidInput {
        input: secs.to_string(),
        expected: "a positive number of seconds",
    })
}

/// Opens the port in non-blocking mode, so a read returns `WouldBlock` once the
/// driver buffer is empty.
pub fn open_port(port: &str, baud_rate: u32) -> Result<SerialStream, Error> {
    info!("Opening {} at {} baud", port, baud_rate);
    let stream = mio_serial::new(port, baud_rate).open_native_async()?;
    Ok(stream)
}
