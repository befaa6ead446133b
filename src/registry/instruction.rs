//! The closed set of inspection instructions and their parameter schemas

use crate::core::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace used when the caller does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// An inspection the dispatch service knows how to render and run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// List resources of a given type in a namespace
    K8sResourceStatus,
    /// Describe a single pod
    DescribePod,
    /// Fetch logs of a pod, optionally for one container
    GetPodLogs,
    /// Get a single pod
    GetPod,
}

/// Parameter names an instruction accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionSchema {
    /// Keys that must be present with a non-empty value
    pub required: &'static [&'static str],
    /// Keys that may be present, paired with the value used when they are not
    pub optional: &'static [(&'static str, &'static str)],
}

impl InstructionSchema {
    /// Whether `key` is declared by this schema
    pub fn declares(&self, key: &str) -> bool {
        self.required.contains(&key) || self.optional.iter().any(|(name, _)| *name == key)
    }

    /// Default for an optional key
    pub fn default_for(&self, key: &str) -> Option<&'static str> {
        self.optional
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, default)| *default)
    }

    /// All declared keys, required first
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required
            .iter()
            .copied()
            .chain(self.optional.iter().map(|(name, _)| *name))
    }
}

const RESOURCE_STATUS_SCHEMA: InstructionSchema = InstructionSchema {
    required: &["resource_type"],
    optional: &[("namespace", DEFAULT_NAMESPACE)],
};

const POD_SCHEMA: InstructionSchema = InstructionSchema {
    required: &["pod_name"],
    optional: &[("namespace", DEFAULT_NAMESPACE)],
};

const POD_LOGS_SCHEMA: InstructionSchema = InstructionSchema {
    required: &["pod_name"],
    optional: &[("namespace", DEFAULT_NAMESPACE), ("container", "")],
};

impl Instruction {
    /// Every registered instruction, in a stable order
    pub const ALL: [Instruction; 4] = [
        Instruction::K8sResourceStatus,
        Instruction::DescribePod,
        Instruction::GetPodLogs,
        Instruction::GetPod,
    ];

    /// Wire name of the instruction
    pub fn name(self) -> &'static str {
        match self {
            Instruction::K8sResourceStatus => "k8s_resource_status",
            Instruction::DescribePod => "describe_pod",
            Instruction::GetPodLogs => "get_pod_logs",
            Instruction::GetPod => "get_pod",
        }
    }

    pub fn schema(self) -> &'static InstructionSchema {
        match self {
            Instruction::K8sResourceStatus => &RESOURCE_STATUS_SCHEMA,
            Instruction::DescribePod | Instruction::GetPod => &POD_SCHEMA,
            Instruction::GetPodLogs => &POD_LOGS_SCHEMA,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instruction {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instruction::ALL
            .into_iter()
            .find(|instruction| instruction.name() == s)
            .ok_or_else(|| DispatchError::UnknownInstruction(s.to_string()))
    }
}
