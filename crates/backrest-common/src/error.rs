//! Error types for backup and restore issuance
//!
//! Each variant maps to one failure class of the issuance pipeline. The
//! display text of terminal variants is what callers see in a response's
//! status message, so it is kept free of prefixes.

use thiserror::Error;

/// Main error type for pgo-backrest operations
#[derive(Debug, Error)]
pub enum Error {
    /// A named cluster or other entity does not exist
    #[error("{message}")]
    NotFound {
        /// Name that was looked up
        name: String,
        /// Caller-facing description
        message: String,
    },

    /// The cluster is not configured for pgbackrest
    #[error("{message}")]
    Ineligible {
        /// Cluster that failed the eligibility check
        cluster: String,
        /// Caller-facing description
        message: String,
    },

    /// Live topology did not resolve to exactly one primary pod or deployment
    #[error("{message}")]
    TopologyAmbiguous {
        /// Cluster whose topology was being resolved
        cluster: String,
        /// Caller-facing description
        message: String,
    },

    /// Cleanup of a prior task's job did not complete
    ///
    /// Only ever logged; issuance proceeds past it.
    #[error("reclaim of {task} incomplete: {message}")]
    TransientReclaim {
        /// Task whose residual work was being reclaimed
        task: String,
        /// Description of what did not complete
        message: String,
    },

    /// Kubernetes API error, surfaced verbatim
    #[error("{source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Any other backend failure (exec, client construction)
    #[error("{message}")]
    Backend {
        /// Where the failure happened (e.g. "exec", "create_client")
        context: String,
        /// Description of what failed
        message: String,
    },

    /// A caller-supplied label selector could not be parsed
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// The selector text as supplied
        selector: String,
        /// What was wrong with it
        message: String,
    },
}

impl Error {
    /// Cluster lookup failed because the cluster does not exist
    pub fn cluster_not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::NotFound {
            message: format!("{} was not found, verify cluster name", name),
            name,
        }
    }

    /// Create an ineligibility error with a caller-facing message
    pub fn ineligible(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Ineligible {
            cluster: cluster.into(),
            message: msg.into(),
        }
    }

    /// Create a topology error for the given cluster
    pub fn topology(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TopologyAmbiguous {
            cluster: cluster.into(),
            message: msg.into(),
        }
    }

    /// Create a transient reclaim error
    pub fn transient_reclaim(task: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TransientReclaim {
            task: task.into(),
            message: msg.into(),
        }
    }

    /// Create a backend error with context
    pub fn backend(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Backend {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create a selector parse error
    pub fn invalid_selector(selector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: msg.into(),
        }
    }

    /// Get the cluster name if this error is associated with a specific cluster
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Error::NotFound { name, .. } => Some(name),
            Error::Ineligible { cluster, .. } => Some(cluster),
            Error::TopologyAmbiguous { cluster, .. } => Some(cluster),
            Error::TransientReclaim { .. }
            | Error::Kube { .. }
            | Error::Backend { .. }
            | Error::InvalidSelector { .. } => None,
        }
    }

    /// Whether the error came from the caller's input rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Ineligible { .. }
                | Error::TopologyAmbiguous { .. }
                | Error::InvalidSelector { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_not_found_message() {
        let err = Error::cluster_not_found("db1");
        assert_eq!(err.to_string(), "db1 was not found, verify cluster name");
        assert_eq!(err.cluster(), Some("db1"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_topology_message_is_unprefixed() {
        let err = Error::topology("db1", "primary pod is not ready");
        assert_eq!(err.to_string(), "primary pod is not ready");
        assert_eq!(err.cluster(), Some("db1"));
    }

    #[test]
    fn test_backend_error_is_not_client_error() {
        let err = Error::backend("exec", "connection reset");
        assert_eq!(err.to_string(), "connection reset");
        assert!(!err.is_client_error());
        assert_eq!(err.cluster(), None);
    }

    #[test]
    fn test_transient_reclaim_names_task() {
        let err = Error::transient_reclaim("db1-backrest-backup", "jobs still visible");
        assert_eq!(
            err.to_string(),
            "reclaim of db1-backrest-backup incomplete: jobs still visible"
        );
    }

    #[test]
    fn test_invalid_selector_quotes_input() {
        let err = Error::invalid_selector("a=b=c", "unexpected '='");
        assert_eq!(err.to_string(), "invalid selector \"a=b=c\": unexpected '='");
    }
}
