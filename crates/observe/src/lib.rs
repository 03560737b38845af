//! Initialization logic for logging shared by the binaries of this workspace
//! as well as logging helper functions.
mod config;
pub mod panic_hook;
pub mod tracing;

pub use config::Config;
