//! `pgo-backrest backup` - issue backup tasks

use clap::Args;
use tracing::info;

use backrest_core::messages::CreateBackrestBackupRequest;

use super::{build_service, finish, KubeArgs};
use crate::{Error, Result};

/// Issue pgbackrest backup tasks
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Clusters to back up
    pub clusters: Vec<String>,

    /// Label selector choosing clusters instead of names
    #[arg(long, short = 's', default_value = "")]
    pub selector: String,

    /// Extra options passed to pgbackrest backup
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub backup_opts: String,

    /// Cluster connection options
    #[command(flatten)]
    pub kube: KubeArgs,
}

impl BackupArgs {
    fn request(&self) -> Result<CreateBackrestBackupRequest> {
        if self.clusters.is_empty() && self.selector.is_empty() {
            return Err(Error::bad_request(
                "cluster names or a selector are required",
            ));
        }
        Ok(CreateBackrestBackupRequest {
            args: self.clusters.clone(),
            selector: self.selector.clone(),
            backup_opts: self.backup_opts.clone(),
        })
    }
}

/// Run the backup command.
pub async fn run(args: BackupArgs) -> Result<()> {
    let request = args.request()?;
    let service = build_service(&args.kube).await?;

    info!(clusters = ?request.args, selector = %request.selector, "issuing backups");
    let response = service.create_backup(&request).await;
    finish(&response.status, &response.results)
}
