pub mod cli;
pub mod credentials;
pub mod files;
pub mod load_config;
pub mod presenter;
pub mod upload;

pub use cli::{run, Cli, Commands};
