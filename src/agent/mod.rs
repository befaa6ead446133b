//! Caller side of the dispatch endpoint

use crate::core::error::{DispatchError, Result};
use crate::dispatch::ExecutionResult;
use crate::llm::TranslatedInstruction;
use crate::server::ErrorBody;
use reqwest::Client;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// HTTP client for `POST /mcp/execute`
pub struct DispatchClient {
    client: Client,
    endpoint: String,
    session_id: String,
}

impl DispatchClient {
    pub fn new(server_url: &str, session_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/mcp/execute", server_url.trim_end_matches('/')),
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send one instruction; non-2xx answers become `DispatchRejected`
    pub async fn execute(&self, instruction: &TranslatedInstruction) -> Result<ExecutionResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("session_id", self.session_id.as_str())])
            .json(instruction)
            .send()
            .await
            .map_err(|e| DispatchError::DispatchRejected {
                code: "unreachable".into(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let rejected = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => DispatchError::DispatchRejected {
                    code: err.code,
                    detail: err.detail,
                },
                Err(_) => DispatchError::DispatchRejected {
                    code: status.as_u16().to_string(),
                    detail: body,
                },
            };
            return Err(rejected);
        }

        Ok(serde_json::from_str(&body)?)
    }
}
