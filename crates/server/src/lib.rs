//! Process wiring for the fanout worker.

pub mod app;
pub mod telemetry;

pub use app::{App, Infrastructure, Workers};
