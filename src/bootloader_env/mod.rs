
pub mod config;
pub mod error;
pub mod runner;
mod uboot_env;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use runner::{Child, ProcessRunner, Runner};
pub use uboot_env::{BootEnvVars, UbootEnv};
