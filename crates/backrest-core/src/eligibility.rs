//! Backup and restore eligibility
//!
//! A cluster takes part in pgbackrest operations only when its user labels
//! carry `pgo-backrest=true`. Anything else, including a missing label or a
//! value with different case, makes the cluster ineligible.

use backrest_common::crd::Pgcluster;
use backrest_common::Error;

/// Message returned when a restore source is not pgbackrest-enabled
pub const RESTORE_SOURCE_INELIGIBLE: &str =
    "can't restore, cluster restoring from does not have backrest enabled";

/// Whether the cluster has pgbackrest enabled
pub fn is_backup_enabled(cluster: &Pgcluster) -> bool {
    cluster.spec.backrest_enabled()
}

/// Fail with an ineligibility error unless the cluster can be backed up
pub fn ensure_backup_enabled(cluster: &Pgcluster) -> Result<(), Error> {
    if is_backup_enabled(cluster) {
        return Ok(());
    }
    let name = cluster.cluster_name();
    Err(Error::ineligible(
        name.clone(),
        format!("{} does not have pgbackrest enabled", name),
    ))
}

/// Fail with an ineligibility error unless the cluster can be restored from
pub fn ensure_restore_source_enabled(cluster: &Pgcluster) -> Result<(), Error> {
    if is_backup_enabled(cluster) {
        return Ok(());
    }
    Err(Error::ineligible(
        cluster.cluster_name(),
        RESTORE_SOURCE_INELIGIBLE,
    ))
}
