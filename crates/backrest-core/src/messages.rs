//! Request and response shapes
//!
//! Field names are PascalCase on the wire so existing `pgo` clients can talk
//! to this server unchanged.

use serde::{Deserialize, Serialize};

use backrest_common::Error;

/// Outcome class of a request
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    /// Every requested item was handled
    #[default]
    Ok,
    /// Processing stopped at a failing item
    Error,
}

/// Status block carried by every response
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    /// Outcome class
    pub code: StatusCode,
    /// Failure text; empty on success
    #[serde(default)]
    pub msg: String,
}

impl Status {
    /// Successful status with no message
    pub fn ok() -> Self {
        Self::default()
    }

    /// Error status carrying `msg`
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Error,
            msg: msg.into(),
        }
    }

    /// True unless the code is [`StatusCode::Error`]
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }
}

impl From<&Error> for Status {
    fn from(err: &Error) -> Self {
        Self::error(err.to_string())
    }
}

/// Backup request: either explicit cluster names or a selector
///
/// A non-empty `selector` takes precedence over `args`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateBackrestBackupRequest {
    /// Cluster names to back up
    pub args: Vec<String>,
    /// Label selector over clusters
    pub selector: String,
    /// Extra pgbackrest backup options passed through verbatim
    pub backup_opts: String,
}

/// Backup response: one result line per issued task
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBackrestBackupResponse {
    /// Outcome of the batch
    pub status: Status,
    /// Result lines in target order
    #[serde(default)]
    pub results: Vec<String>,
}

/// Restore request
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct RestoreRequest {
    /// Cluster whose backups are restored
    pub from_cluster: String,
    /// Destination volume claim
    #[serde(rename = "ToPVC")]
    pub to_pvc: String,
    /// Extra pgbackrest restore options passed through verbatim
    pub restore_opts: String,
}

/// Restore response
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RestoreResponse {
    /// Outcome of the restore
    pub status: Status,
    /// Single result line on success
    #[serde(default)]
    pub results: Vec<String>,
}

/// pgbackrest info for one cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ShowBackrestDetail {
    /// Cluster name
    pub name: String,
    /// Raw `pgbackrest info` output, or the failure text for this cluster
    pub info: String,
}

/// Show response: one item per addressed cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ShowBackrestResponse {
    /// Outcome of the query
    pub status: Status,
    /// Per-cluster info in listing order
    #[serde(default)]
    pub items: Vec<ShowBackrestDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(Status::error("db1 was not found, verify cluster name")).unwrap(),
            json!({"Code": "error", "Msg": "db1 was not found, verify cluster name"})
        );
        assert_eq!(
            serde_json::to_value(Status::ok()).unwrap(),
            json!({"Code": "ok", "Msg": ""})
        );
    }

    #[test]
    fn test_restore_request_uses_pvc_casing() {
        let req: RestoreRequest = serde_json::from_value(json!({
            "FromCluster": "src",
            "ToPVC": "newvol"
        }))
        .unwrap();
        assert_eq!(req.from_cluster, "src");
        assert_eq!(req.to_pvc, "newvol");
        assert_eq!(req.restore_opts, "");
    }

    #[test]
    fn test_backup_request_defaults_missing_fields() {
        let req: CreateBackrestBackupRequest =
            serde_json::from_value(json!({"Selector": "env=prod"})).unwrap();
        assert!(req.args.is_empty());
        assert_eq!(req.selector, "env=prod");
        assert_eq!(req.backup_opts, "");
    }

    #[test]
    fn test_show_response_shape() {
        let resp = ShowBackrestResponse {
            status: Status::ok(),
            items: vec![ShowBackrestDetail {
                name: "db1".to_string(),
                info: "stanza: db".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(resp).unwrap(),
            json!({
                "Status": {"Code": "ok", "Msg": ""},
                "Items": [{"Name": "db1", "Info": "stanza: db"}]
            })
        );
    }
}
