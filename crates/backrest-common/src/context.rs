//! Explicit request context
//!
//! Every component receives an [`ApiContext`] instead of reaching for global
//! client or namespace state.

use std::sync::Arc;
use std::time::Duration;

use kube::Client;

use crate::kube_client::{ClusterApi, KubeClusterApi, KubePodExecutor, PodExecutor};

/// Default number of observations while waiting for job deletion to propagate
pub const DEFAULT_WAIT_ATTEMPTS: u32 = 3;
/// Default spacing between those observations
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Bounded wait for deletions to become visible
///
/// This is a best-effort visibility wait, not a correctness guarantee: once
/// `max_attempts` observations have been made the caller proceeds regardless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Number of times the artifact listing is observed
    pub max_attempts: u32,
    /// Sleep between observations while the artifact is still visible
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_WAIT_ATTEMPTS,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

impl WaitPolicy {
    /// Create a policy with explicit bounds
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Observe the default number of times without sleeping (for tests)
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// Shared context for one API server or CLI process
///
/// Use [`ApiContext::builder`] to construct instances:
///
/// ```text
/// let ctx = ApiContext::builder(client, "pgo")
///     .wait_policy(WaitPolicy::default())
///     .build();
/// ```
#[derive(Clone)]
pub struct ApiContext {
    /// Cluster API operations (trait object for testability)
    pub api: Arc<dyn ClusterApi>,
    /// In-pod command execution
    pub exec: Arc<dyn PodExecutor>,
    /// Namespace every operation is scoped to
    pub namespace: String,
    /// Propagation wait used by the stale-work reclaimer
    pub wait: WaitPolicy,
}

impl ApiContext {
    /// Create a builder backed by a real Kubernetes client
    pub fn builder(client: Client, namespace: impl Into<String>) -> ApiContextBuilder {
        ApiContextBuilder::new(client, namespace.into())
    }

    /// Create a context from explicit trait objects
    ///
    /// Used by tests and by callers that bring their own API implementation.
    pub fn from_parts(
        api: Arc<dyn ClusterApi>,
        exec: Arc<dyn PodExecutor>,
        namespace: impl Into<String>,
        wait: WaitPolicy,
    ) -> Self {
        Self {
            api,
            exec,
            namespace: namespace.into(),
            wait,
        }
    }
}

/// Builder for constructing [`ApiContext`] instances
pub struct ApiContextBuilder {
    client: Client,
    namespace: String,
    wait: WaitPolicy,
}

impl ApiContextBuilder {
    fn new(client: Client, namespace: String) -> Self {
        Self {
            client,
            namespace,
            wait: WaitPolicy::default(),
        }
    }

    /// Set the propagation wait policy
    pub fn wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Build the context with both seams backed by the kube client
    pub fn build(self) -> ApiContext {
        let namespace = self.namespace;
        ApiContext {
            api: Arc::new(KubeClusterApi::new(self.client.clone(), &namespace)),
            exec: Arc::new(KubePodExecutor::new(self.client, &namespace)),
            namespace,
            wait: self.wait,
        }
    }
}
