//! Custom Resource Definitions shared with the cluster operator and the task executor

mod cluster;
mod task;

pub use cluster::{Pgcluster, PgclusterSpec};
pub use task::{Pgtask, PgtaskSpec, PgtaskStatus, TaskType};

/// API group of every pgo resource
pub const PGO_GROUP: &str = "crunchydata.com";
