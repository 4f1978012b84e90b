//! `pgo-backrest show` - print pgbackrest info per cluster

use clap::Args;

use backrest_core::messages::ShowBackrestResponse;
use backrest_core::orchestrator::ALL_CLUSTERS;

use super::{build_service, finish, KubeArgs};
use crate::Result;

/// Show pgbackrest info for clusters
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Cluster name, or "all"
    #[arg(default_value = ALL_CLUSTERS)]
    pub name: String,

    /// Label selector choosing clusters instead of the name
    #[arg(long, short = 's', default_value = "")]
    pub selector: String,

    /// Cluster connection options
    #[command(flatten)]
    pub kube: KubeArgs,
}

fn render(response: &ShowBackrestResponse) -> Vec<String> {
    response
        .items
        .iter()
        .map(|item| format!("cluster: {}\n{}", item.name, item.info.trim_end()))
        .collect()
}

/// Run the show command.
pub async fn run(args: ShowArgs) -> Result<()> {
    let service = build_service(&args.kube).await?;
    let response = service.show_backup_status(&args.name, &args.selector).await;
    finish(&response.status, &render(&response))
}
