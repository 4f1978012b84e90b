//! Kubernetes API seam
//!
//! The issuance core talks to the cluster only through [`ClusterApi`] and
//! [`PodExecutor`], so tests can substitute mocks or an in-memory fake while
//! production uses the kube-rs implementations below.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, AttachParams, DeleteParams, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::crd::{Pgcluster, Pgtask};
use crate::selector::LabelSelector;
use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Read and mutation operations the issuance core needs from the cluster
///
/// All calls are scoped to a single namespace chosen at construction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List Pgclusters matching a selector
    async fn list_clusters(&self, selector: &LabelSelector) -> Result<Vec<Pgcluster>, Error>;

    /// Get a Pgcluster by name, `None` if it does not exist
    async fn get_cluster(&self, name: &str) -> Result<Option<Pgcluster>, Error>;

    /// Get a Pgtask by name, `None` if it does not exist
    async fn get_task(&self, name: &str) -> Result<Option<Pgtask>, Error>;

    /// Create a Pgtask
    async fn create_task(&self, task: &Pgtask) -> Result<(), Error>;

    /// Delete a Pgtask by name
    async fn delete_task(&self, name: &str) -> Result<(), Error>;

    /// List Jobs matching a selector
    async fn list_jobs(&self, selector: &LabelSelector) -> Result<Vec<Job>, Error>;

    /// Delete every Job matching a selector
    async fn delete_jobs(&self, selector: &LabelSelector) -> Result<(), Error>;

    /// List Pods matching a selector
    async fn list_pods(&self, selector: &LabelSelector) -> Result<Vec<Pod>, Error>;

    /// List Deployments matching a selector
    async fn list_deployments(&self, selector: &LabelSelector)
        -> Result<Vec<Deployment>, Error>;
}

/// Captured output of a command run inside a container
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Everything the command wrote to stdout
    pub stdout: String,
    /// Everything the command wrote to stderr
    pub stderr: String,
}

/// Runs commands inside pod containers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PodExecutor: Send + Sync {
    /// Run `command` in `container` of `pod` and wait for it to exit
    ///
    /// A non-zero exit is reported as an error carrying the API server's
    /// status message.
    async fn exec(
        &self,
        pod: &str,
        container: &str,
        command: Vec<String>,
    ) -> Result<ExecOutput, Error>;
}

fn list_params(selector: &LabelSelector) -> ListParams {
    if selector.is_empty() {
        ListParams::default()
    } else {
        ListParams::default().labels(&selector.to_string())
    }
}

/// Real Kubernetes client implementation of [`ClusterApi`]
pub struct KubeClusterApi {
    client: Client,
    namespace: String,
}

impl KubeClusterApi {
    /// Create a new KubeClusterApi scoped to `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_clusters(&self, selector: &LabelSelector) -> Result<Vec<Pgcluster>, Error> {
        let api: Api<Pgcluster> = self.api();
        Ok(api.list(&list_params(selector)).await?.items)
    }

    async fn get_cluster(&self, name: &str) -> Result<Option<Pgcluster>, Error> {
        let api: Api<Pgcluster> = self.api();
        Ok(api.get_opt(name).await?)
    }

    async fn get_task(&self, name: &str) -> Result<Option<Pgtask>, Error> {
        let api: Api<Pgtask> = self.api();
        Ok(api.get_opt(name).await?)
    }

    async fn create_task(&self, task: &Pgtask) -> Result<(), Error> {
        let api: Api<Pgtask> = self.api();
        api.create(&PostParams::default(), task).await?;
        Ok(())
    }

    async fn delete_task(&self, name: &str) -> Result<(), Error> {
        let api: Api<Pgtask> = self.api();
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn list_jobs(&self, selector: &LabelSelector) -> Result<Vec<Job>, Error> {
        let api: Api<Job> = self.api();
        Ok(api.list(&list_params(selector)).await?.items)
    }

    async fn delete_jobs(&self, selector: &LabelSelector) -> Result<(), Error> {
        let api: Api<Job> = self.api();
        api.delete_collection(&DeleteParams::background(), &list_params(selector))
            .await?;
        Ok(())
    }

    async fn list_pods(&self, selector: &LabelSelector) -> Result<Vec<Pod>, Error> {
        let api: Api<Pod> = self.api();
        Ok(api.list(&list_params(selector)).await?.items)
    }

    async fn list_deployments(
        &self,
        selector: &LabelSelector,
    ) -> Result<Vec<Deployment>, Error> {
        let api: Api<Deployment> = self.api();
        Ok(api.list(&list_params(selector)).await?.items)
    }
}

/// Real Kubernetes client implementation of [`PodExecutor`]
pub struct KubePodExecutor {
    client: Client,
    namespace: String,
}

impl KubePodExecutor {
    /// Create a new KubePodExecutor scoped to `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

async fn read_stream<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<String> {
    let mut buf = String::new();
    if let Some(mut reader) = reader {
        reader.read_to_string(&mut buf).await?;
    }
    Ok(buf)
}

#[async_trait]
impl PodExecutor for KubePodExecutor {
    async fn exec(
        &self,
        pod: &str,
        container: &str,
        command: Vec<String>,
    ) -> Result<ExecOutput, Error> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let params = AttachParams::default()
            .container(container)
            .stdin(false)
            .stdout(true)
            .stderr(true);

        debug!(pod = %pod, container = %container, command = ?command, "exec in pod");
        let mut attached = pods.exec(pod, command, &params).await?;

        let stdout = attached.stdout();
        let stderr = attached.stderr();
        let status = attached.take_status();

        let (stdout, stderr) = tokio::try_join!(read_stream(stdout), read_stream(stderr))
            .map_err(|e| Error::backend("exec", format!("failed to read exec output: {}", e)))?;

        if let Some(status) = status {
            if let Some(status) = status.await {
                if status.status.as_deref() == Some("Failure") {
                    return Err(Error::backend(
                        "exec",
                        status
                            .message
                            .unwrap_or_else(|| "command failed".to_string()),
                    ));
                }
            }
        }

        Ok(ExecOutput { stdout, stderr })
    }
}

/// Create a kube client from optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::backend("create_client", format!("failed to read kubeconfig: {}", e))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::backend("create_client", format!("failed to load kubeconfig: {}", e))
                })?
        }
        None => Config::infer().await.map_err(|e| {
            Error::backend("create_client", format!("failed to infer config: {}", e))
        })?,
    };
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
    Client::try_from(config)
        .map_err(|e| Error::backend("create_client", format!("failed to create client: {}", e)))
}
