// The binary in main.rs drives the terminal; everything it renders and
// persists lives here so integration tests and benchmarks can reach it.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod generator;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
