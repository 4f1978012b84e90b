//! Pgcluster Custom Resource Definition
//!
//! Owned by the cluster operator. This crate only reads it to find cluster
//! names and the user labels that gate pgbackrest.

use std::collections::BTreeMap;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::labels::{LABEL_BACKREST, LABEL_TRUE};

/// Specification for a Pgcluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "crunchydata.com",
    version = "v1",
    kind = "Pgcluster",
    plural = "pgclusters",
    namespaced,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct PgclusterSpec {
    /// Cluster name used in pod, deployment and job labels
    #[serde(default)]
    pub name: String,

    /// User-defined labels, including the `pgo-backrest` flag
    #[serde(default, rename = "userlabels")]
    pub user_labels: BTreeMap<String, String>,
}

impl PgclusterSpec {
    /// Whether the `pgo-backrest` user label is exactly `"true"`
    pub fn backrest_enabled(&self) -> bool {
        self.user_labels.get(LABEL_BACKREST).map(String::as_str) == Some(LABEL_TRUE)
    }
}

impl Pgcluster {
    /// Name used for label queries: `spec.name`, falling back to the object name
    pub fn cluster_name(&self) -> String {
        if self.spec.name.is_empty() {
            self.name_any()
        } else {
            self.spec.name.clone()
        }
    }
}
