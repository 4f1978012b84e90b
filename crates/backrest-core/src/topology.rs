//! Live topology resolution
//!
//! Backups run against the cluster's current primary. The primary is looked
//! up through labels on every request; nothing about it is cached.

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::{debug, instrument};

use backrest_common::labels::{primary_selector, LABEL_PRIMARY, LABEL_TRUE};
use backrest_common::{ApiContext, Error};

/// Message returned when no ready primary pod exists
pub const PRIMARY_NOT_READY: &str = "primary pod is not ready";

/// The pod and deployment a backup task is pinned to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Ready primary pod name
    pub pod: String,
    /// Deployment fronting the primary
    pub deployment: String,
}

/// Whether the pod carries `primary=true`
pub fn is_primary(pod: &Pod) -> bool {
    pod.labels().get(LABEL_PRIMARY).map(String::as_str) == Some(LABEL_TRUE)
}

/// Whether every reported container of the pod is ready
pub fn is_ready(pod: &Pod) -> bool {
    let statuses = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default();
    let ready = statuses.iter().filter(|s| s.ready).count();
    ready == statuses.len()
}

/// Name of the single ready primary pod of `cluster`
///
/// Zero ready primaries is [`PRIMARY_NOT_READY`]; more than one is reported
/// as ambiguous rather than picking one.
#[instrument(skip(ctx))]
pub async fn resolve_primary_pod(ctx: &ApiContext, cluster: &str) -> Result<String, Error> {
    let pods = ctx.api.list_pods(&primary_selector(cluster)).await?;
    let ready: Vec<String> = pods
        .iter()
        .filter(|p| is_primary(p) && is_ready(p))
        .map(|p| p.name_any())
        .collect();

    match ready.as_slice() {
        [] => {
            debug!(candidates = pods.len(), "no ready primary pod");
            Err(Error::topology(cluster, PRIMARY_NOT_READY))
        }
        [pod] => Ok(pod.clone()),
        many => Err(Error::topology(
            cluster,
            format!(
                "multiple ready primary pods found for {}: {}",
                cluster,
                many.join(", ")
            ),
        )),
    }
}

/// Name of the single deployment fronting the primary of `cluster`
#[instrument(skip(ctx))]
pub async fn resolve_fronting_deployment(
    ctx: &ApiContext,
    cluster: &str,
) -> Result<String, Error> {
    let deployments = ctx.api.list_deployments(&primary_selector(cluster)).await?;
    match deployments.as_slice() {
        [deployment] => Ok(deployment.name_any()),
        _ => Err(Error::topology(
            cluster,
            format!("error: deployment count is wrong for backrest backup {}", cluster),
        )),
    }
}

/// Resolve both the primary pod and its fronting deployment
pub async fn resolve(ctx: &ApiContext, cluster: &str) -> Result<Topology, Error> {
    let pod = resolve_primary_pod(ctx, cluster).await?;
    let deployment = resolve_fronting_deployment(ctx, cluster).await?;
    Ok(Topology { pod, deployment })
}
