pub mod config;
pub mod error;
pub mod types;

pub use config::{config, set_config, ShellConfig};
pub use error::{Result, ShellError};
