//! Kube Dispatch - natural-language Kubernetes inspection
//!
//! A fixed registry of `kubectl` inspections, a dispatch service that runs
//! them as isolated child processes, and the translator/caller pair that
//! turns free text into registry instructions.

pub mod agent;
pub mod core;
pub mod dispatch;
pub mod llm;
pub mod registry;
pub mod server;
