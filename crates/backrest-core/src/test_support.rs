//! Mocks and fixtures shared by the unit tests of this crate

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use mockall::mock;

use backrest_common::crd::{Pgcluster, PgclusterSpec, Pgtask};
use backrest_common::kube_client::{ClusterApi, ExecOutput, PodExecutor};
use backrest_common::labels::{LABEL_BACKREST, LABEL_PRIMARY, LABEL_TRUE};
use backrest_common::{ApiContext, Error, LabelSelector, WaitPolicy};

// Local mocks since the mockall-generated mocks are only available within
// the backrest-common crate's test configuration
mock! {
    pub ClusterApi {}

    #[async_trait::async_trait]
    impl ClusterApi for ClusterApi {
        async fn list_clusters(&self, selector: &LabelSelector) -> Result<Vec<Pgcluster>, Error>;
        async fn get_cluster(&self, name: &str) -> Result<Option<Pgcluster>, Error>;
        async fn get_task(&self, name: &str) -> Result<Option<Pgtask>, Error>;
        async fn create_task(&self, task: &Pgtask) -> Result<(), Error>;
        async fn delete_task(&self, name: &str) -> Result<(), Error>;
        async fn list_jobs(&self, selector: &LabelSelector) -> Result<Vec<Job>, Error>;
        async fn delete_jobs(&self, selector: &LabelSelector) -> Result<(), Error>;
        async fn list_pods(&self, selector: &LabelSelector) -> Result<Vec<Pod>, Error>;
        async fn list_deployments(&self, selector: &LabelSelector) -> Result<Vec<Deployment>, Error>;
    }
}

mock! {
    pub PodExecutor {}

    #[async_trait::async_trait]
    impl PodExecutor for PodExecutor {
        async fn exec(&self, pod: &str, container: &str, command: Vec<String>) -> Result<ExecOutput, Error>;
    }
}

/// Context over the given mocks with a zero-wait propagation policy
pub fn context(api: MockClusterApi, exec: MockPodExecutor) -> ApiContext {
    ApiContext::from_parts(
        Arc::new(api),
        Arc::new(exec),
        "pgo",
        WaitPolicy::immediate(),
    )
}

/// Pgcluster with the pgo-backrest user label set as requested
pub fn cluster(name: &str, backrest: bool) -> Pgcluster {
    let mut user_labels = BTreeMap::new();
    user_labels.insert(
        LABEL_BACKREST.to_string(),
        if backrest { LABEL_TRUE } else { "false" }.to_string(),
    );
    Pgcluster::new(
        name,
        PgclusterSpec {
            name: name.to_string(),
            user_labels,
        },
    )
}

/// Pod with the given primary label and `ready` of `total` containers ready
pub fn pod(name: &str, primary: bool, ready: usize, total: usize) -> Pod {
    let labels = BTreeMap::from([(
        LABEL_PRIMARY.to_string(),
        if primary { LABEL_TRUE } else { "false" }.to_string(),
    )]);
    let container_statuses = (0..total)
        .map(|i| ContainerStatus {
            name: format!("c{}", i),
            ready: i < ready,
            ..Default::default()
        })
        .collect();

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        status: Some(PodStatus {
            container_statuses: Some(container_statuses),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Deployment with only a name
pub fn deployment(name: &str) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Job with only a name
pub fn job(name: &str) -> Job {
    Job {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}
