//! `pgo-backrest crd` - print the custom resource definitions

use kube::CustomResourceExt;

use backrest_common::crd::{Pgcluster, Pgtask};

use crate::Result;

/// Pgcluster and Pgtask CRDs as a multi-document YAML stream
pub fn render_crds() -> Result<String> {
    let cluster = serde_yaml::to_string(&Pgcluster::crd())?;
    let task = serde_yaml::to_string(&Pgtask::crd())?;
    Ok(format!("{}---\n{}", cluster, task))
}

/// Run the crd command.
pub fn run() -> Result<()> {
    print!("{}", render_crds()?);
    Ok(())
}
