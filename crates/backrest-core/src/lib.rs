//! Backup and restore task issuance for pgbackrest-enabled clusters
//!
//! Requests are turned into `Pgtask` descriptors for the task executor:
//!
//! - **eligibility**: gate on the cluster's `pgo-backrest` user label
//! - **topology**: resolve the ready primary pod and its fronting deployment
//! - **reclaim**: retire a previous task and its leftover jobs
//! - **issuer**: build and upsert backup/restore descriptors
//! - **orchestrator**: the backup, restore and show entry points
//! - **messages**: request and response shapes shared with API clients

#![deny(missing_docs)]

pub mod eligibility;
pub mod issuer;
pub mod messages;
pub mod orchestrator;
pub mod reclaim;
pub mod topology;

#[cfg(test)]
pub(crate) mod test_support;

pub use orchestrator::{BackrestService, BatchPolicy};
