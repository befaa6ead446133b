//! Command dispatch pipeline
//!
//! session check -> registry render -> child process -> ExecutionResult

pub mod process;
pub mod service;

pub use service::{Dispatcher, ExecutionResult, Stage};
