use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("session_id is required")]
    MissingSession,

    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("Invalid parameters for instruction: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    CommandFailed(String),

    #[error("Command timed out after {timeout_ms}ms: {command}")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Failed to translate request: {0}")]
    TranslationFailed(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Dispatch server rejected request ({code}): {detail}")]
    DispatchRejected { code: String, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl DispatchError {
    /// Stable wire code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::MissingSession => "missing_session",
            DispatchError::UnknownInstruction(_) => "unknown_instruction",
            DispatchError::InvalidParameters(_) => "invalid_parameters",
            DispatchError::CommandFailed(_) => "command_failed",
            DispatchError::Timeout { .. } => "command_timeout",
            DispatchError::TranslationFailed(_) => "translation_failed",
            DispatchError::LlmError(_) => "llm_error",
            DispatchError::DispatchRejected { .. } => "dispatch_rejected",
            DispatchError::Config(_) => "config_error",
            DispatchError::IoError(_) => "io_error",
            DispatchError::SerdeError(_) => "serialization_error",
        }
    }

    /// Whether the caller is at fault (bad session, instruction or parameters)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DispatchError::MissingSession
                | DispatchError::UnknownInstruction(_)
                | DispatchError::InvalidParameters(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_dispatch_kinds() {
        let errors = [
            DispatchError::MissingSession,
            DispatchError::UnknownInstruction("x".into()),
            DispatchError::InvalidParameters("x".into()),
            DispatchError::CommandFailed("x".into()),
            DispatchError::Timeout {
                command: "x".into(),
                timeout_ms: 1,
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(DispatchError::MissingSession.is_client_error());
        assert!(DispatchError::InvalidParameters("x".into()).is_client_error());
        assert!(!DispatchError::CommandFailed("boom".into()).is_client_error());
    }

    #[test]
    fn test_unknown_instruction_message() {
        let err = DispatchError::UnknownInstruction("restart_pod".into());
        assert_eq!(err.to_string(), "Unknown instruction: restart_pod");
    }
}
