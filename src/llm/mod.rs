//! Natural-language translation via a hosted language model

pub mod client;
pub mod translator;

pub use client::LlmClient;
pub use translator::{parse_response, translate, TranslatedInstruction};
