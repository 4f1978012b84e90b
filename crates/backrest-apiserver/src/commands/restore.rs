//! `pgo-backrest restore` - issue a restore task

use clap::Args;
use tracing::info;

use backrest_core::messages::RestoreRequest;

use super::{build_service, finish, KubeArgs};
use crate::Result;

/// Restore a cluster's pgbackrest backups into a new volume
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Cluster whose backups are restored
    pub from_cluster: String,

    /// Destination volume claim
    #[arg(long)]
    pub to_pvc: String,

    /// Extra options passed to pgbackrest restore
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub restore_opts: String,

    /// Cluster connection options
    #[command(flatten)]
    pub kube: KubeArgs,
}

/// Run the restore command.
pub async fn run(args: RestoreArgs) -> Result<()> {
    let request = RestoreRequest {
        from_cluster: args.from_cluster,
        to_pvc: args.to_pvc,
        restore_opts: args.restore_opts,
    };
    let service = build_service(&args.kube).await?;

    info!(from = %request.from_cluster, to = %request.to_pvc, "issuing restore");
    let response = service.restore(&request).await;
    finish(&response.status, &response.results)
}
