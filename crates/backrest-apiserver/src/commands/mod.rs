//! CLI commands

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use backrest_common::config::{self, EnvConfig, OsEnvConfig};
use backrest_common::kube_client::create_client;
use backrest_common::ApiContext;
use backrest_core::messages::Status;
use backrest_core::BackrestService;

use crate::{Error, Result};

pub mod backup;
pub mod crd;
pub mod restore;
pub mod serve;
pub mod show;

/// Connection options shared by every command that talks to the cluster
#[derive(Args, Debug, Clone, Default)]
pub struct KubeArgs {
    /// Namespace clusters and tasks live in (defaults to $NAMESPACE, then "default")
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Path to kubeconfig file (defaults to in-cluster config or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
}

impl KubeArgs {
    /// Namespace from the flag, falling back to the environment
    pub fn resolve_namespace(&self, env: &dyn EnvConfig) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => ns.clone(),
            _ => config::namespace(env),
        }
    }
}

/// Build the issuance service against the configured cluster
pub async fn build_service(args: &KubeArgs) -> Result<BackrestService> {
    let env = OsEnvConfig;
    let namespace = args.resolve_namespace(&env);
    let wait = config::wait_policy(&env);

    let client = create_client(args.kubeconfig.as_deref()).await?;
    debug!(namespace = %namespace, attempts = wait.max_attempts, "kube client ready");

    let ctx = ApiContext::builder(client, namespace)
        .wait_policy(wait)
        .build();
    Ok(BackrestService::new(ctx))
}

/// Print result lines and turn an error status into a failing exit
pub fn finish(status: &Status, lines: &[String]) -> Result<()> {
    for line in lines {
        println!("{}", line);
    }
    if status.is_ok() {
        Ok(())
    } else {
        Err(Error::CommandFailed(status.msg.clone()))
    }
}
