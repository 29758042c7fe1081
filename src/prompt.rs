//! Interactive console configuration, run once before the pipeline starts.

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use crate::config::{DEFAULT_BAUD_RATE, DEFAULT_POLL_INTERVAL};
use crate::error::Error;

/// Names of the serial ports present on this machine. Having none is fatal.
pub fn list_ports() -> Result<Vec<String>, Error> {
    let ports: Vec<String> = mio_serial::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect();
    if ports.is_empty() {
        return Err(Error::NoPorts);
    }
    Ok(ports)
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and returns the trimmed answer. End of input reads as empty.
    pub fn ask(&mut self, question: &str) -> Result<String, Error> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }

    /// Parses the answer, falling back to `default` when it is empty.
    pub fn ask_parsed<T: FromStr>(
        &mut self,
        question: &str,
        default: Option<T>,
        expected: &'static str,
    ) -> Result<T, Error> {
        let answer = self.ask(question)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default),
            _ => answer
                .parse()
                .map_err(|_| Error::InvalidInput { input: answer, expected }),
        }
    }

    /// Lists the ports and asks for one, unless there is only one to pick.
    pub fn choose_port(&mut self, ports: &[String]) -> Result<String, Error> {
        if ports.is_empty() {
            return Err(Error::NoPorts);
        }
        for (i, port) in ports.iter().enumerate() {
            writeln!(self.output, "{}: {}", i, port)?;
        }
        if ports.len() == 1 {
            return Ok(ports[0].clone());
        }
        let index: usize = self.ask_parsed("Which port to use (number)? ", None, "a port number")?;
        ports.get(index).cloned().ok_or(Error::InvalidInput {
            input: index.to_string(),
            expected: "a listed port number",
        })
    }

    /// Port and baud rate.
    pub fn configure_serial(&mut self, ports: &[String]) -> Result<(String, u32), Error> {
        let port = self.choose_port(ports)?;
        let baud_rate = self.ask_parsed(
            &format!("Baud rate ({} by default): ", DEFAULT_BAUD_RATE),
            Some(DEFAULT_BAUD_RATE),
            "a baud rate",
        )?;
        Ok((port, baud_rate))
    }

    /// Column count and polling interval in seconds.
    pub fn configure_plot(&mut self) -> Result<(usize, f64), Error> {
        let columns = self.ask_parsed("Number of columns: ", None, "a column count")?;
        let default_interval = DEFAULT_POLL_INTERVAL.as_secs_f64();
        let interval = self.ask_parsed(
            &format!(
                "Update period in seconds ({} by default): ",
                default_interval
            ),
            Some(default_interval),
            "a number of seconds",
        )?;
        Ok((columns, interval))
    }
}
