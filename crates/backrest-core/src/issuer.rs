//! Task descriptor construction and upsert
//!
//! Task names are derived deterministically from the request, so issuing the
//! same request twice replaces the earlier descriptor instead of adding a
//! second one.

use std::collections::BTreeMap;

use kube::api::ObjectMeta;
use tracing::{debug, info, instrument};

use backrest_common::crd::{Pgtask, PgtaskSpec, TaskType};
use backrest_common::labels::{
    LABEL_BACKREST_COMMAND, LABEL_BACKREST_OPTS, LABEL_BACKREST_RESTORE_FROM_CLUSTER,
    LABEL_BACKREST_RESTORE_OPTS, LABEL_BACKREST_RESTORE_TO_PVC, LABEL_CONTAINER_NAME,
    LABEL_DEPLOYMENT_NAME, LABEL_PGBACKREST_DB_PATH, LABEL_PGBACKREST_REPO_PATH,
    LABEL_PGBACKREST_STANZA, LABEL_PG_CLUSTER, LABEL_POD_NAME,
};
use backrest_common::{
    ApiContext, Error, BACKREST_BACKUP_COMMAND, BACKREST_STANZA, DATABASE_CONTAINER,
};

/// Root of the volume a restore writes its data directory under
pub const PGDATA_ROOT: &str = "/pgdata";
/// Root of the pgbackrest repositories
pub const BACKREST_REPO_ROOT: &str = "/backrestrepo";

/// Where a backup should run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupTarget {
    /// Cluster being backed up
    pub cluster: String,
    /// Ready primary pod the backup command runs in
    pub pod: String,
    /// Deployment fronting that pod
    pub deployment: String,
}

/// Name of the backup task for a cluster
pub fn backup_task_name(cluster: &str) -> String {
    format!("{}-backrest-backup", cluster)
}

/// Name of the restore task copying `from` into `to`
pub fn restore_task_name(from: &str, to: &str) -> String {
    format!("backrest-restore-{}-to-{}", from, to)
}

/// Data directory a restore into `to` writes
pub fn restore_db_path(to: &str) -> String {
    format!("{}/{}", PGDATA_ROOT, to)
}

/// Repository a restore from `from` reads
pub fn restore_repo_path(from: &str) -> String {
    format!("{}/{}-backups", BACKREST_REPO_ROOT, from)
}

/// Build the backup descriptor for `target`
pub fn build_backup_task(target: &BackupTarget, opts: &str) -> Pgtask {
    let name = backup_task_name(&target.cluster);
    let parameters = BTreeMap::from([
        (LABEL_PG_CLUSTER.to_string(), target.cluster.clone()),
        (LABEL_POD_NAME.to_string(), target.pod.clone()),
        (LABEL_CONTAINER_NAME.to_string(), DATABASE_CONTAINER.to_string()),
        (LABEL_BACKREST_COMMAND.to_string(), BACKREST_BACKUP_COMMAND.to_string()),
        (LABEL_BACKREST_OPTS.to_string(), opts.to_string()),
    ]);
    let labels = BTreeMap::from([
        (LABEL_PG_CLUSTER.to_string(), target.cluster.clone()),
        (LABEL_DEPLOYMENT_NAME.to_string(), target.deployment.clone()),
    ]);

    Pgtask {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: PgtaskSpec {
            name,
            task_type: TaskType::Backup,
            parameters,
        },
        status: None,
    }
}

/// Build the restore descriptor copying backups of `from` into volume `to`
pub fn build_restore_task(from: &str, to: &str, opts: &str) -> Pgtask {
    let name = restore_task_name(from, to);
    let parameters = BTreeMap::from([
        (LABEL_BACKREST_RESTORE_FROM_CLUSTER.to_string(), from.to_string()),
        (LABEL_BACKREST_RESTORE_TO_PVC.to_string(), to.to_string()),
        (LABEL_BACKREST_RESTORE_OPTS.to_string(), opts.to_string()),
        (LABEL_PGBACKREST_STANZA.to_string(), BACKREST_STANZA.to_string()),
        (LABEL_PGBACKREST_DB_PATH.to_string(), restore_db_path(to)),
        (LABEL_PGBACKREST_REPO_PATH.to_string(), restore_repo_path(from)),
    ]);

    Pgtask {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            ..Default::default()
        },
        spec: PgtaskSpec {
            name,
            task_type: TaskType::Restore,
            parameters,
        },
        status: None,
    }
}

/// Create `task`, replacing any descriptor with the same name
///
/// Not atomic: a concurrent issuer may race between the delete and create,
/// in which case the create fails with a conflict that is returned as-is.
#[instrument(skip(ctx, task), fields(task = %task.spec.name, task_type = %task.spec.task_type))]
pub async fn upsert_task(ctx: &ApiContext, task: &Pgtask) -> Result<(), Error> {
    let name = &task.spec.name;
    if ctx.api.get_task(name).await?.is_some() {
        debug!("replacing existing task");
        ctx.api.delete_task(name).await?;
    }
    ctx.api.create_task(task).await?;
    info!("created task");
    Ok(())
}

/// Issue the backup task for `target`, returning the task name
pub async fn issue_backup(
    ctx: &ApiContext,
    target: &BackupTarget,
    opts: &str,
) -> Result<String, Error> {
    let task = build_backup_task(target, opts);
    upsert_task(ctx, &task).await?;
    Ok(task.spec.name)
}

/// Issue the restore task from `from` into `to`, returning the task name
pub async fn issue_restore(
    ctx: &ApiContext,
    from: &str,
    to: &str,
    opts: &str,
) -> Result<String, Error> {
    let task = build_restore_task(from, to, opts);
    upsert_task(ctx, &task).await?;
    Ok(task.spec.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, MockClusterApi, MockPodExecutor};
    use kube::ResourceExt;
    use mockall::Sequence;

    fn target() -> BackupTarget {
        BackupTarget {
            cluster: "db1".to_string(),
            pod: "db1-7f9c-x2".to_string(),
            deployment: "db1".to_string(),
        }
    }

    #[test]
    fn test_task_names() {
        assert_eq!(backup_task_name("db1"), "db1-backrest-backup");
        assert_eq!(restore_task_name("src", "newvol"), "backrest-restore-src-to-newvol");
    }

    #[test]
    fn test_backup_task_parameters() {
        let task = build_backup_task(&target(), "--type=full");
        let p = &task.spec.parameters;

        assert_eq!(task.name_any(), "db1-backrest-backup");
        assert_eq!(task.spec.name, "db1-backrest-backup");
        assert_eq!(task.spec.task_type, TaskType::Backup);
        assert_eq!(p[LABEL_PG_CLUSTER], "db1");
        assert_eq!(p[LABEL_POD_NAME], "db1-7f9c-x2");
        assert_eq!(p[LABEL_CONTAINER_NAME], "database");
        assert_eq!(p[LABEL_BACKREST_COMMAND], "backup");
        assert_eq!(p[LABEL_BACKREST_OPTS], "--type=full");
        assert_eq!(task.labels()[LABEL_DEPLOYMENT_NAME], "db1");
    }

    #[test]
    fn test_restore_task_parameters() {
        let task = build_restore_task("src", "newvol", "");
        let p = &task.spec.parameters;

        assert_eq!(task.name_any(), "backrest-restore-src-to-newvol");
        assert_eq!(task.spec.task_type, TaskType::Restore);
        assert_eq!(p[LABEL_BACKREST_RESTORE_FROM_CLUSTER], "src");
        assert_eq!(p[LABEL_BACKREST_RESTORE_TO_PVC], "newvol");
        assert_eq!(p[LABEL_BACKREST_RESTORE_OPTS], "");
        assert_eq!(p[LABEL_PGBACKREST_STANZA], "db");
        assert_eq!(p[LABEL_PGBACKREST_DB_PATH], "/pgdata/newvol");
        assert_eq!(p[LABEL_PGBACKREST_REPO_PATH], "/backrestrepo/src-backups");
    }

    #[tokio::test]
    async fn test_upsert_creates_when_absent() {
        let mut api = MockClusterApi::new();
        api.expect_get_task().returning(|_| Ok(None));
        api.expect_delete_task().never();
        api.expect_create_task()
            .withf(|t| t.spec.name == "db1-backrest-backup")
            .times(1)
            .returning(|_| Ok(()));
        let ctx = context(api, MockPodExecutor::new());

        let name = issue_backup(&ctx, &target(), "").await.unwrap();
        assert_eq!(name, "db1-backrest-backup");
    }

    #[tokio::test]
    async fn test_upsert_deletes_before_create() {
        let mut seq = Sequence::new();
        let mut api = MockClusterApi::new();
        api.expect_get_task()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|name| Ok(Some(build_restore_task("src", "newvol", name))));
        api.expect_delete_task()
            .withf(|name| name == "backrest-restore-src-to-newvol")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        api.expect_create_task()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let ctx = context(api, MockPodExecutor::new());

        let name = issue_restore(&ctx, "src", "newvol", "").await.unwrap();
        assert_eq!(name, "backrest-restore-src-to-newvol");
    }

    #[tokio::test]
    async fn test_create_failure_is_returned() {
        let mut api = MockClusterApi::new();
        api.expect_get_task().returning(|_| Ok(None));
        api.expect_create_task()
            .returning(|_| Err(Error::backend("create_task", "admission denied")));
        let ctx = context(api, MockPodExecutor::new());

        let err = issue_restore(&ctx, "src", "newvol", "").await.unwrap_err();
        assert_eq!(err.to_string(), "admission denied");
    }
}
