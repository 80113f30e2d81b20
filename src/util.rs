pub mod error;
pub mod config;
pub mod logging;
