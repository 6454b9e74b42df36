mod config_file;
mod main_config;

pub use main_config::{Config, NewEntry};
