//! Label and task-parameter keys
//!
//! These keys are a contract with the task executor and with the pods and
//! jobs created by the cluster operator. Renaming any of them breaks
//! compatibility with running clusters.

use crate::selector::LabelSelector;

/// Cluster membership of pods, deployments and jobs
pub const LABEL_PG_CLUSTER: &str = "pg-cluster";
/// Marks the read/write primary instance
pub const LABEL_PRIMARY: &str = "primary";
/// Marks connection-pooler pods, which share cluster membership
pub const LABEL_PGPOOL: &str = "crunchy-pgpool";
/// User label gating backup and restore for a cluster
pub const LABEL_BACKREST: &str = "pgo-backrest";
/// Cluster name label used by the show path's default selector
pub const LABEL_NAME: &str = "name";
/// Deployment fronting the primary, recorded on backup tasks
pub const LABEL_DEPLOYMENT_NAME: &str = "deployment-name";

/// Task parameter: target pod
pub const LABEL_POD_NAME: &str = "podname";
/// Task parameter: container inside the target pod
pub const LABEL_CONTAINER_NAME: &str = "containername";
/// Task parameter: pgbackrest command to run
pub const LABEL_BACKREST_COMMAND: &str = "backrest-command";
/// Task parameter: free-form pgbackrest backup options
pub const LABEL_BACKREST_OPTS: &str = "backrest-opts";
/// Task parameter: cluster whose repository a restore reads
pub const LABEL_BACKREST_RESTORE_FROM_CLUSTER: &str = "backrest-restore-from-cluster";
/// Task parameter: destination volume of a restore
pub const LABEL_BACKREST_RESTORE_TO_PVC: &str = "backrest-restore-to-pvc";
/// Task parameter: free-form pgbackrest restore options
pub const LABEL_BACKREST_RESTORE_OPTS: &str = "backrest-restore-opts";
/// Task parameter: pgbackrest stanza
pub const LABEL_PGBACKREST_STANZA: &str = "pgbackrest-stanza";
/// Task parameter: data directory the restore writes to
pub const LABEL_PGBACKREST_DB_PATH: &str = "pgbackrest-db-path";
/// Task parameter: repository the restore reads from
pub const LABEL_PGBACKREST_REPO_PATH: &str = "pgbackrest-repo-path";

/// Literal value for boolean labels
pub const LABEL_TRUE: &str = "true";

/// Selector for the non-pooler primary pods and deployments of a cluster
///
/// Renders as `crunchy-pgpool!=true,pg-cluster=<cluster>,primary=true`.
pub fn primary_selector(cluster: &str) -> LabelSelector {
    LabelSelector::new()
        .ne(LABEL_PGPOOL, LABEL_TRUE)
        .eq(LABEL_PG_CLUSTER, cluster)
        .eq(LABEL_PRIMARY, LABEL_TRUE)
}

/// Selector for backup jobs left behind by a previous backup task
pub fn backup_job_selector(cluster: &str) -> LabelSelector {
    LabelSelector::new()
        .eq(LABEL_PG_CLUSTER, cluster)
        .eq(LABEL_BACKREST, LABEL_TRUE)
}

/// Selector matching a single cluster by its `name` label
pub fn cluster_name_selector(name: &str) -> LabelSelector {
    LabelSelector::new().eq(LABEL_NAME, name)
}
