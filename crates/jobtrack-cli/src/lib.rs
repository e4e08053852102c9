//! Library side of the `jobtrack` CLI: logging setup, settings files, CSV
//! input, resolution files and the JSON record store.

pub mod config;
pub mod input;
pub mod logging;
pub mod resolutions;
pub mod store;
