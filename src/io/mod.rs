pub mod config_io;
pub mod data_io;

pub use config_io::{Config, ConfigError, read_config};
pub use data_io::{FileKv, JsonStore, atomic_write};
