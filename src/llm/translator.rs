//! Translate natural-language requests into registry instructions
//!
//! The model only chooses an instruction and its parameters. Whatever it
//! returns is still validated by the dispatch service before anything runs.

use crate::core::error::{DispatchError, Result};
use crate::llm::client::LlmClient;
use crate::registry::{Instruction, ParameterSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An `{instruction, params}` pair ready to send to the dispatch endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedInstruction {
    pub instruction: String,
    #[serde(default)]
    pub params: ParameterSet,
}

#[derive(Deserialize)]
struct RawTranslation {
    instruction: String,
    #[serde(default)]
    params: Option<serde_json::Map<String, Value>>,
}

/// Ask the model to turn `utterance` into a registry instruction
pub async fn translate(client: &LlmClient, utterance: &str) -> Result<TranslatedInstruction> {
    let utterance = utterance.trim();
    if utterance.is_empty() {
        return Err(DispatchError::TranslationFailed("empty request".into()));
    }

    let user_prompt = format!("User message: \"{}\"", utterance);
    let response = client
        .complete(&system_prompt(), &user_prompt)
        .await
        .map_err(|e| DispatchError::TranslationFailed(e.to_string()))?;

    parse_response(&response)
}

/// Parse the model's reply, tolerating fenced code blocks and chatter
pub fn parse_response(response: &str) -> Result<TranslatedInstruction> {
    let unfenced = strip_code_fences(response);
    let json_str = extract_json(&unfenced)?;

    let raw: RawTranslation = serde_json::from_str(json_str).map_err(|e| {
        DispatchError::TranslationFailed(format!(
            "Failed to parse instruction: {} - Response: {}",
            e, response
        ))
    })?;

    if raw.instruction.parse::<Instruction>().is_err() {
        return Err(DispatchError::TranslationFailed(format!(
            "model chose unsupported instruction '{}'",
            raw.instruction
        )));
    }

    let mut params = ParameterSet::new();
    for (key, value) in raw.params.unwrap_or_default() {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(DispatchError::TranslationFailed(format!(
                    "parameter '{}' is not a scalar value",
                    key
                )))
            }
        };
        params.insert(key, value);
    }

    Ok(TranslatedInstruction {
        instruction: raw.instruction,
        params,
    })
}

/// Drop ``` fence lines that models like to wrap JSON in
fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract JSON object from LLM response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response.find('{').ok_or_else(|| {
        DispatchError::TranslationFailed("No JSON found in response".into())
    })?;
    let end = response.rfind('}').ok_or_else(|| {
        DispatchError::TranslationFailed("No closing brace found in response".into())
    })?;
    if end < start {
        return Err(DispatchError::TranslationFailed(
            "Malformed JSON in response".into(),
        ));
    }
    Ok(&response[start..=end])
}

/// System prompt listing every instruction and the parameters it takes
pub fn system_prompt() -> String {
    let mut catalog = String::new();
    for instruction in Instruction::ALL {
        let schema = instruction.schema();
        let mut fields: Vec<String> = schema.required.iter().map(|k| k.to_string()).collect();
        fields.extend(
            schema
                .optional
                .iter()
                .map(|(k, default)| match *default {
                    "" => format!("{} (optional)", k),
                    d => format!("{} (optional, default \"{}\")", k, d),
                }),
        );
        catalog.push_str(&format!("- {}: {}\n", instruction.name(), fields.join(", ")));
    }

    format!(
        r#"You're a command parser for Kubernetes.

Given a user message, convert it to a JSON object with:
- `instruction`: one of the instructions below
- `params`: object mapping parameter names to string values; only use the
  parameters listed for the chosen instruction

INSTRUCTIONS:
{}
Return **only the JSON**.

Examples:
"show me pod nginx-1" -> {{"instruction": "get_pod", "params": {{"pod_name": "nginx-1"}}}}
"logs for the app container of nginx-1 in prod" -> {{"instruction": "get_pod_logs", "params": {{"pod_name": "nginx-1", "namespace": "prod", "container": "app"}}}}
"list deployments in kube-system" -> {{"instruction": "k8s_resource_status", "params": {{"resource_type": "deployments", "namespace": "kube-system"}}}}
"#,
        catalog
    )
}
