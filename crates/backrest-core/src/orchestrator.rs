//! Request orchestration
//!
//! Each entry point resolves its targets, then runs every target through
//! eligibility, reclaim, topology and issuance. Results are accumulated into
//! the response in target order. Failures never escape as `Err`: they are
//! folded into the response according to the operation's [`BatchPolicy`].

use kube::ResourceExt;
use tracing::{error, info, instrument, warn};

use backrest_common::crd::Pgcluster;
use backrest_common::labels::{backup_job_selector, cluster_name_selector};
use backrest_common::{
    ApiContext, Error, LabelSelector, BACKREST_BINARY, BACKREST_INFO_COMMAND,
    DATABASE_CONTAINER,
};

use crate::eligibility::{ensure_backup_enabled, ensure_restore_source_enabled};
use crate::issuer::{self, backup_task_name, restore_task_name, BackupTarget};
use crate::messages::{
    CreateBackrestBackupRequest, CreateBackrestBackupResponse, RestoreRequest, RestoreResponse,
    ShowBackrestDetail, ShowBackrestResponse, Status,
};
use crate::reclaim::reclaim_prior_work;
use crate::topology;

/// Result line when a selector matches no clusters
pub const NO_CLUSTERS_FOUND: &str = "no clusters found with that selector";
/// Cluster name that, without a selector, addresses every cluster
pub const ALL_CLUSTERS: &str = "all";

/// How a multi-target request reacts to a failing target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first failure and set an error status; later targets are
    /// not attempted
    FailFast,
    /// Record the failure text against its target and keep going; the
    /// response status stays ok
    ContinueOnError,
}

/// Backup, restore and show entry points over one [`ApiContext`]
#[derive(Clone)]
pub struct BackrestService {
    ctx: ApiContext,
    backup_policy: BatchPolicy,
    show_policy: BatchPolicy,
}

impl BackrestService {
    /// Service with the default policies: backups fail fast, show continues
    pub fn new(ctx: ApiContext) -> Self {
        Self {
            ctx,
            backup_policy: BatchPolicy::FailFast,
            show_policy: BatchPolicy::ContinueOnError,
        }
    }

    /// Replace the policy applied to backup batches
    pub fn with_backup_policy(mut self, policy: BatchPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    /// Replace the policy applied to show batches
    pub fn with_show_policy(mut self, policy: BatchPolicy) -> Self {
        self.show_policy = policy;
        self
    }

    /// Context every operation runs against
    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    /// Issue backup tasks for every requested cluster
    #[instrument(skip(self, request), fields(selector = %request.selector, args = ?request.args))]
    pub async fn create_backup(
        &self,
        request: &CreateBackrestBackupRequest,
    ) -> CreateBackrestBackupResponse {
        let mut resp = CreateBackrestBackupResponse::default();

        let targets = match self.backup_targets(request).await {
            Ok(targets) => targets,
            Err(e) => {
                error!(error = %e, "failed to resolve backup targets");
                resp.status = Status::from(&e);
                return resp;
            }
        };
        if targets.is_empty() && !request.selector.is_empty() {
            resp.results.push(NO_CLUSTERS_FOUND.to_string());
            return resp;
        }

        for cluster in targets {
            match self.backup_one(&cluster, &request.backup_opts).await {
                Ok(task) => resp.results.push(format!("created Pgtask {}", task)),
                Err(e) => {
                    error!(cluster = %cluster, error = %e, "backup not issued");
                    if self.backup_policy == BatchPolicy::FailFast {
                        resp.status = Status::from(&e);
                        return resp;
                    }
                    resp.results.push(format!("{}: {}", cluster, e));
                }
            }
        }
        resp
    }

    async fn backup_targets(
        &self,
        request: &CreateBackrestBackupRequest,
    ) -> Result<Vec<String>, Error> {
        if request.selector.is_empty() {
            return Ok(request.args.clone());
        }
        let selector = LabelSelector::parse(&request.selector)?;
        let clusters = self.ctx.api.list_clusters(&selector).await?;
        Ok(clusters.iter().map(Pgcluster::cluster_name).collect())
    }

    #[instrument(skip(self, opts))]
    async fn backup_one(&self, cluster: &str, opts: &str) -> Result<String, Error> {
        let ctx = &self.ctx;
        let found = ctx
            .api
            .get_cluster(cluster)
            .await?
            .ok_or_else(|| Error::cluster_not_found(cluster))?;
        ensure_backup_enabled(&found)?;

        let task = backup_task_name(cluster);
        reclaim_prior_work(ctx, &task, Some(&backup_job_selector(cluster))).await?;

        let resolved = topology::resolve(ctx, cluster).await?;
        let target = BackupTarget {
            cluster: cluster.to_string(),
            pod: resolved.pod,
            deployment: resolved.deployment,
        };
        issuer::issue_backup(ctx, &target, opts).await
    }

    /// Report `pgbackrest info` for the addressed clusters
    ///
    /// An empty `selector` with `name == "all"` addresses every cluster; an
    /// empty `selector` otherwise addresses the cluster labelled `name=<name>`.
    #[instrument(skip(self))]
    pub async fn show_backup_status(&self, name: &str, selector: &str) -> ShowBackrestResponse {
        let mut resp = ShowBackrestResponse::default();

        let clusters = match self.show_targets(name, selector).await {
            Ok(clusters) => clusters,
            Err(e) => {
                error!(error = %e, "failed to list clusters");
                resp.status = Status::from(&e);
                return resp;
            }
        };

        for cluster in clusters {
            let info = match self.backrest_info(&cluster).await {
                Ok(info) => info,
                Err(e) => {
                    warn!(cluster = %cluster.name_any(), error = %e, "pgbackrest info failed");
                    if self.show_policy == BatchPolicy::FailFast {
                        resp.status = Status::from(&e);
                        return resp;
                    }
                    e.to_string()
                }
            };
            resp.items.push(ShowBackrestDetail {
                name: cluster.name_any(),
                info,
            });
        }
        resp
    }

    async fn show_targets(&self, name: &str, selector: &str) -> Result<Vec<Pgcluster>, Error> {
        let selector = match (selector.is_empty(), name) {
            (true, ALL_CLUSTERS) => LabelSelector::new(),
            (true, _) => cluster_name_selector(name),
            (false, _) => LabelSelector::parse(selector)?,
        };
        self.ctx.api.list_clusters(&selector).await
    }

    async fn backrest_info(&self, cluster: &Pgcluster) -> Result<String, Error> {
        let pod = topology::resolve_primary_pod(&self.ctx, &cluster.cluster_name()).await?;
        let command = vec![
            BACKREST_BINARY.to_string(),
            BACKREST_INFO_COMMAND.to_string(),
        ];
        let output = self.ctx.exec.exec(&pod, DATABASE_CONTAINER, command).await?;
        Ok(output.stdout)
    }

    /// Issue a restore task copying backups of one cluster into a new volume
    #[instrument(skip(self, request), fields(from = %request.from_cluster, to = %request.to_pvc))]
    pub async fn restore(&self, request: &RestoreRequest) -> RestoreResponse {
        let mut resp = RestoreResponse::default();
        match self.restore_inner(request).await {
            Ok(task) => {
                info!(task = %task, "restore issued");
                resp.results.push(format!(
                    "restore performed on {} to {} opts={}",
                    request.from_cluster, request.to_pvc, request.restore_opts
                ));
            }
            Err(e) => {
                error!(error = %e, "restore not issued");
                resp.status = Status::from(&e);
            }
        }
        resp
    }

    async fn restore_inner(&self, request: &RestoreRequest) -> Result<String, Error> {
        let ctx = &self.ctx;
        let from = &request.from_cluster;
        let source = ctx
            .api
            .get_cluster(from)
            .await?
            .ok_or_else(|| Error::cluster_not_found(from.as_str()))?;
        ensure_restore_source_enabled(&source)?;

        let task = restore_task_name(from, &request.to_pvc);
        reclaim_prior_work(ctx, &task, None).await?;
        issuer::issue_restore(ctx, from, &request.to_pvc, &request.restore_opts).await
    }
}
