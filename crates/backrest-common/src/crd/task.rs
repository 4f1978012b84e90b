//! Pgtask Custom Resource Definition
//!
//! A Pgtask is the durable intent handed to the task executor. Its name is
//! its identity: at most one Pgtask per name exists at any time.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of work a Pgtask asks the executor to perform
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum TaskType {
    /// pgbackrest backup of a running cluster
    #[default]
    #[serde(rename = "backrest")]
    Backup,
    /// pgbackrest restore into a fresh volume
    #[serde(rename = "backrestrestore")]
    Restore,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backup => write!(f, "Backup"),
            Self::Restore => write!(f, "Restore"),
        }
    }
}

/// Status reported by the executor
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct PgtaskStatus {
    /// Executor-defined processing state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Specification for a Pgtask
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "crunchydata.com",
    version = "v1",
    kind = "Pgtask",
    plural = "pgtasks",
    namespaced,
    status = "PgtaskStatus",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.tasktype"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct PgtaskSpec {
    /// Task identity, equal to the object name
    pub name: String,

    /// Kind of work requested
    #[serde(rename = "tasktype")]
    pub task_type: TaskType,

    /// Everything the executor needs, keyed by the stable parameter labels
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}
