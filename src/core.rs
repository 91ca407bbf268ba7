pub(crate) mod config;
pub mod state;
pub(crate) mod telemetry;
pub mod time;
