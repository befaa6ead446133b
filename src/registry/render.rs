//! Render an instruction and its parameters into a command line
//!
//! Rendering is pure: it validates the parameter set against the
//! instruction's schema and assembles an argument vector. Nothing here
//! touches the network, the filesystem, or a process.

use crate::core::error::{DispatchError, Result};
use crate::registry::instruction::{Instruction, InstructionSchema};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Program every rendered command starts with
pub const KUBECTL: &str = "kubectl";

/// Caller-supplied parameters, keyed by parameter name
pub type ParameterSet = BTreeMap<String, String>;

/// A fully rendered command, kept as a discrete argument vector
///
/// Arguments are never re-parsed by a shell; `Display` joins them with
/// single spaces for reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderedCommand {
    fn kubectl<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: KUBECTL.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Parameters that passed the instruction's schema check
///
/// Produced only by [`validate`]; rendering from it cannot fail.
#[derive(Debug)]
pub struct ValidatedParams<'a> {
    instruction: Instruction,
    params: &'a ParameterSet,
    schema: &'static InstructionSchema,
}

/// Check `params` against the schema of `instruction`
pub fn validate(instruction: Instruction, params: &ParameterSet) -> Result<ValidatedParams<'_>> {
    ValidatedParams::bind(instruction, params)
}

impl<'a> ValidatedParams<'a> {
    fn bind(instruction: Instruction, params: &'a ParameterSet) -> Result<Self> {
        let schema = instruction.schema();

        let unexpected: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.declares(key))
            .collect();
        if !unexpected.is_empty() {
            return Err(DispatchError::InvalidParameters(format!(
                "{} got unexpected parameter(s): {}",
                instruction,
                unexpected.join(", ")
            )));
        }

        let missing: Vec<&str> = schema
            .required
            .iter()
            .copied()
            .filter(|key| params.get(*key).map_or(true, |v| v.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(DispatchError::InvalidParameters(format!(
                "{} missing required parameter(s): {}",
                instruction,
                missing.join(", ")
            )));
        }

        Ok(Self {
            instruction,
            params,
            schema,
        })
    }

    /// Value for a declared key; empty optional values fall back to the default
    fn get(&self, key: &str) -> &str {
        match self.params.get(key).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => value,
            _ => self.schema.default_for(key).unwrap_or(""),
        }
    }
}

/// Resolve an instruction by name and render it
pub fn render(instruction: &str, params: &ParameterSet) -> Result<RenderedCommand> {
    let instruction: Instruction = instruction.parse()?;
    render_instruction(instruction, params)
}

/// Render an already-resolved instruction
pub fn render_instruction(
    instruction: Instruction,
    params: &ParameterSet,
) -> Result<RenderedCommand> {
    Ok(validate(instruction, params)?.render())
}

impl ValidatedParams<'_> {
    pub fn instruction(&self) -> Instruction {
        self.instruction
    }

    /// Assemble the argument vector from the instruction's template
    pub fn render(&self) -> RenderedCommand {
        match self.instruction {
            Instruction::K8sResourceStatus => RenderedCommand::kubectl([
                "get",
                self.get("resource_type"),
                "-n",
                self.get("namespace"),
            ]),
            Instruction::DescribePod => RenderedCommand::kubectl([
                "describe",
                "pod",
                self.get("pod_name"),
                "-n",
                self.get("namespace"),
            ]),
            Instruction::GetPodLogs => {
                let mut command = RenderedCommand::kubectl([
                    "logs",
                    self.get("pod_name"),
                    "-n",
                    self.get("namespace"),
                ]);
                let container = self.get("container");
                if !container.is_empty() {
                    command.args.push("-c".into());
                    command.args.push(container.into());
                }
                command
            }
            Instruction::GetPod => RenderedCommand::kubectl([
                "get",
                "pod",
                self.get("pod_name"),
                "-n",
                self.get("namespace"),
            ]),
        }
    }
}
