#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod plot;
pub mod prompt;
pub mod reader;
pub mod record;
pub mod recorder;

pub use app::PlotterApp;
pub use error::Error;
