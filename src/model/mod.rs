pub mod config;
pub mod scan;

pub use config::{CommandConfig, Config, EngineConfig};
pub use scan::*;
