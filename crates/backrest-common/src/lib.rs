//! Common types for pgo-backrest: CRDs, errors, label selectors and the
//! Kubernetes API seam shared by the issuance core and the API server.

#![deny(missing_docs)]

pub mod config;
pub mod context;
pub mod crd;
pub mod error;
pub mod kube_client;
pub mod labels;
pub mod selector;
pub mod telemetry;

pub use context::{ApiContext, WaitPolicy};
pub use error::Error;
pub use selector::LabelSelector;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Namespace used when neither the CLI nor the environment names one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Container inside the primary pod that runs pgbackrest
pub const DATABASE_CONTAINER: &str = "database";

/// Binary invoked inside the database container
pub const BACKREST_BINARY: &str = "pgbackrest";

/// pgbackrest subcommand reporting repository status
pub const BACKREST_INFO_COMMAND: &str = "info";

/// Value of the `backrest-command` task parameter for backups
pub const BACKREST_BACKUP_COMMAND: &str = "backup";

/// pgbackrest stanza every cluster is configured with
pub const BACKREST_STANZA: &str = "db";
