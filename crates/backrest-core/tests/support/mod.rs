//! In-memory cluster for issuance tests
//!
//! Stores clusters, tasks, jobs, pods and deployments behind a mutex and
//! answers label queries with [`LabelSelector::matches`]. Deleted jobs can be
//! made to linger for a number of listings to mimic the API server's delayed
//! visibility of deletions.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use backrest_common::crd::{Pgcluster, PgclusterSpec, Pgtask};
use backrest_common::kube_client::{ClusterApi, ExecOutput, PodExecutor};
use backrest_common::labels::{
    LABEL_BACKREST, LABEL_NAME, LABEL_PG_CLUSTER, LABEL_PRIMARY, LABEL_TRUE,
};
use backrest_common::{ApiContext, Error, LabelSelector, WaitPolicy};

#[derive(Default)]
pub struct State {
    pub clusters: Vec<Pgcluster>,
    pub tasks: BTreeMap<String, Pgtask>,
    pub jobs: Vec<Job>,
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    /// Jobs deleted but still returned by listings
    pub deleted_jobs: Vec<Job>,
    /// How many more job listings still return deleted jobs
    pub linger: u32,
    /// Listings a job deletion stays visible for
    pub linger_after_delete: u32,
    /// Mutations in call order, e.g. `delete_task db1-backrest-backup`
    pub events: Vec<String>,
    /// Commands run through the executor as `pod/container: argv`
    pub execs: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state poisoned")
    }

    /// Context over this fake with a zero-interval wait policy
    pub fn context(&self) -> ApiContext {
        ApiContext::from_parts(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            "pgo",
            WaitPolicy::immediate(),
        )
    }

    /// Add a cluster with one ready primary pod `<name>-0` and deployment `<name>`
    pub fn with_healthy_cluster(self, name: &str, backrest: bool) -> Self {
        {
            let mut state = self.state();
            state.clusters.push(cluster(name, backrest));
            state.pods.push(primary_pod(name, &format!("{}-0", name), true));
            state.deployments.push(primary_deployment(name, name));
        }
        self
    }

    pub fn task_names(&self) -> Vec<String> {
        self.state().tasks.keys().cloned().collect()
    }

    pub fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }
}

fn select<T: ResourceExt + Clone>(items: &[T], selector: &LabelSelector) -> Vec<T> {
    items
        .iter()
        .filter(|item| selector.matches(item.labels()))
        .cloned()
        .collect()
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_clusters(&self, selector: &LabelSelector) -> Result<Vec<Pgcluster>, Error> {
        Ok(select(&self.state().clusters, selector))
    }

    async fn get_cluster(&self, name: &str) -> Result<Option<Pgcluster>, Error> {
        Ok(self
            .state()
            .clusters
            .iter()
            .find(|c| c.name_any() == name)
            .cloned())
    }

    async fn get_task(&self, name: &str) -> Result<Option<Pgtask>, Error> {
        Ok(self.state().tasks.get(name).cloned())
    }

    async fn create_task(&self, task: &Pgtask) -> Result<(), Error> {
        let mut state = self.state();
        let name = task.name_any();
        if state.tasks.contains_key(&name) {
            return Err(Error::backend(
                "create_task",
                format!("pgtasks \"{}\" already exists", name),
            ));
        }
        state.events.push(format!("create_task {}", name));
        state.tasks.insert(name, task.clone());
        Ok(())
    }

    async fn delete_task(&self, name: &str) -> Result<(), Error> {
        let mut state = self.state();
        if state.tasks.remove(name).is_none() {
            return Err(Error::backend(
                "delete_task",
                format!("pgtasks \"{}\" not found", name),
            ));
        }
        state.events.push(format!("delete_task {}", name));
        Ok(())
    }

    async fn list_jobs(&self, selector: &LabelSelector) -> Result<Vec<Job>, Error> {
        let mut state = self.state();
        let mut jobs = select(&state.jobs, selector);
        if state.linger > 0 {
            state.linger -= 1;
            jobs.extend(select(&state.deleted_jobs, selector));
        } else {
            state.deleted_jobs.clear();
        }
        Ok(jobs)
    }

    async fn delete_jobs(&self, selector: &LabelSelector) -> Result<(), Error> {
        let mut state = self.state();
        let (gone, kept): (Vec<Job>, Vec<Job>) = state
            .jobs
            .drain(..)
            .partition(|j| selector.matches(j.labels()));
        state.jobs = kept;
        state.events.push(format!("delete_jobs {}", selector));
        if !gone.is_empty() {
            state.deleted_jobs.extend(gone);
            state.linger = state.linger_after_delete;
        }
        Ok(())
    }

    async fn list_pods(&self, selector: &LabelSelector) -> Result<Vec<Pod>, Error> {
        Ok(select(&self.state().pods, selector))
    }

    async fn list_deployments(&self, selector: &LabelSelector) -> Result<Vec<Deployment>, Error> {
        Ok(select(&self.state().deployments, selector))
    }
}

#[async_trait]
impl PodExecutor for FakeCluster {
    async fn exec(
        &self,
        pod: &str,
        container: &str,
        command: Vec<String>,
    ) -> Result<ExecOutput, Error> {
        self.state()
            .execs
            .push(format!("{}/{}: {}", pod, container, command.join(" ")));
        Ok(ExecOutput {
            stdout: format!("stanza: db\n    status: ok\n    pod: {}\n", pod),
            stderr: String::new(),
        })
    }
}

fn meta(name: &str, labels: BTreeMap<String, String>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some("pgo".to_string()),
        labels: Some(labels),
        ..Default::default()
    }
}

pub fn cluster(name: &str, backrest: bool) -> Pgcluster {
    let user_labels = BTreeMap::from([(
        LABEL_BACKREST.to_string(),
        if backrest { LABEL_TRUE } else { "false" }.to_string(),
    )]);
    let mut c = Pgcluster::new(
        name,
        PgclusterSpec {
            name: name.to_string(),
            user_labels,
        },
    );
    c.metadata = meta(
        name,
        BTreeMap::from([
            (LABEL_NAME.to_string(), name.to_string()),
            (LABEL_PG_CLUSTER.to_string(), name.to_string()),
        ]),
    );
    c
}

pub fn primary_pod(cluster: &str, name: &str, ready: bool) -> Pod {
    Pod {
        metadata: meta(
            name,
            BTreeMap::from([
                (LABEL_PG_CLUSTER.to_string(), cluster.to_string()),
                (LABEL_PRIMARY.to_string(), LABEL_TRUE.to_string()),
            ]),
        ),
        status: Some(PodStatus {
            container_statuses: Some(vec![ContainerStatus {
                name: "database".to_string(),
                ready,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn primary_deployment(cluster: &str, name: &str) -> Deployment {
    Deployment {
        metadata: meta(
            name,
            BTreeMap::from([
                (LABEL_PG_CLUSTER.to_string(), cluster.to_string()),
                (LABEL_PRIMARY.to_string(), LABEL_TRUE.to_string()),
            ]),
        ),
        ..Default::default()
    }
}

pub fn backup_job(cluster: &str, name: &str) -> Job {
    Job {
        metadata: meta(
            name,
            BTreeMap::from([
                (LABEL_PG_CLUSTER.to_string(), cluster.to_string()),
                (LABEL_BACKREST.to_string(), LABEL_TRUE.to_string()),
            ]),
        ),
        ..Default::default()
    }
}
