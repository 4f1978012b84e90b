//! Stale-work reclaim
//!
//! Before a task is reissued under a name that already exists, the old
//! descriptor is removed and, for backups, the jobs it spawned are deleted.
//! Job deletion is eventually consistent, so the reclaimer watches the job
//! listing for a bounded number of observations. Running out of
//! observations is not fatal: issuance continues and the executor tolerates
//! a late-disappearing job.

use tracing::{debug, info, instrument, warn};

use backrest_common::{ApiContext, Error, LabelSelector};

/// What the reclaimer found and removed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reclaimed {
    /// No descriptor existed under the name
    Nothing,
    /// The descriptor was removed and any job cleanup was observed to finish
    Clean,
    /// The descriptor was removed but job cleanup could not be confirmed
    Unsettled,
}

/// Retire the prior task named `task` together with jobs matching `jobs`
///
/// Failing to read or delete the descriptor is terminal. Failing to delete
/// or observe the removal of jobs is logged and reported as
/// [`Reclaimed::Unsettled`].
#[instrument(skip(ctx, jobs), fields(jobs = ?jobs.map(ToString::to_string)))]
pub async fn reclaim_prior_work(
    ctx: &ApiContext,
    task: &str,
    jobs: Option<&LabelSelector>,
) -> Result<Reclaimed, Error> {
    let existing = ctx.api.get_task(task).await.map_err(|e| {
        Error::backend("get_task", format!("error getting pgtask for {}: {}", task, e))
    })?;
    if existing.is_none() {
        debug!("no prior task");
        return Ok(Reclaimed::Nothing);
    }

    ctx.api.delete_task(task).await?;
    info!(task = %task, "deleted prior task");

    let Some(selector) = jobs else {
        return Ok(Reclaimed::Clean);
    };

    match remove_jobs(ctx, task, selector).await {
        Ok(()) => Ok(Reclaimed::Clean),
        Err(e) => {
            warn!(task = %task, error = %e, "continuing without confirmed job cleanup");
            Ok(Reclaimed::Unsettled)
        }
    }
}

async fn remove_jobs(ctx: &ApiContext, task: &str, selector: &LabelSelector) -> Result<(), Error> {
    ctx.api
        .delete_jobs(selector)
        .await
        .map_err(|e| Error::transient_reclaim(task, format!("failed to delete jobs: {}", e)))?;
    wait_for_jobs_gone(ctx, task, selector).await
}

/// Observe the job listing until it is empty or the wait policy runs out
async fn wait_for_jobs_gone(
    ctx: &ApiContext,
    task: &str,
    selector: &LabelSelector,
) -> Result<(), Error> {
    let attempts = ctx.wait.max_attempts;
    for attempt in 1..=attempts {
        match ctx.api.list_jobs(selector).await {
            Ok(jobs) if jobs.is_empty() => {
                debug!(attempt, "jobs gone");
                return Ok(());
            }
            Ok(jobs) => debug!(attempt, remaining = jobs.len(), "jobs still visible"),
            Err(e) => warn!(attempt, error = %e, "failed to list jobs"),
        }
        if attempt < attempts {
            tokio::time::sleep(ctx.wait.interval).await;
        }
    }

    Err(Error::transient_reclaim(
        task,
        format!(
            "jobs matching {} still visible after {} observations",
            selector, attempts
        ),
    ))
}
