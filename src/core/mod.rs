pub mod config;
pub mod error;

pub use config::DispatchConfig;
pub use error::{DispatchError, Result};
