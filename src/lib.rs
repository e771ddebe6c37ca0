// The binary in main.rs drives the terminal UI. Integration tests and the
// criterion benches go through this library target.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod feedback;
pub mod generator;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
