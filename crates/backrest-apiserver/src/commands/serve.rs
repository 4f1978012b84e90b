//! `pgo-backrest serve` - run the HTTP API server

use std::net::SocketAddr;

use clap::Args;
use tracing::info;

use super::{build_service, KubeArgs};
use crate::server::{start_server, ServerConfig, DEFAULT_BIND_ADDR};
use crate::Result;

/// Run the HTTP API server
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "BACKREST_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Cluster connection options
    #[command(flatten)]
    pub kube: KubeArgs,
}

/// Run the serve command.
pub async fn run(args: ServeArgs) -> Result<()> {
    let service = build_service(&args.kube).await?;
    info!(namespace = %service.context().namespace, "serving backrest requests");
    start_server(ServerConfig { addr: args.bind }, service).await
}
