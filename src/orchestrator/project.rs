use std::path::Path;

use tokio::time::sleep;

use crate::config::Timing;
use crate::controller::ControllerClient;

use super::OrchestrateError;

/// Replace any project bearing `name` and create a fresh one, returning
/// its id. For each stale match: close (best-effort — the point is only
/// to unlock deletion), settle, delete (failures propagate), then
/// optionally purge the controller's on-disk project directory.
///
/// The controller has no "create or reuse", so destroy-and-recreate is
/// what makes repeated runs idempotent.
pub async fn ensure_clean_project(
    client: &ControllerClient,
    name: &str,
    projects_dir: Option<&str>,
    timing: &Timing,
) -> Result<String, OrchestrateError> {
    let existing = client.projects().await?;
    for stale in existing.iter().filter(|p| p.name == name) {
        tracing::info!(project_id = %stale.project_id, "Found old version of '{}', cleaning up", name);

        if let Err(e) = client.close_project(&stale.project_id).await {
            tracing::warn!(project_id = %stale.project_id, "Close of stale project failed: {}", e);
        }
        sleep(timing.close_settle).await;

        client.delete_project(&stale.project_id).await?;

        if let Some(root) = projects_dir {
            purge_project_dir(root, &stale.project_id).await;
        }
        sleep(timing.delete_settle).await;
    }

    let project = client.create_project(name).await?;
    tracing::info!(project_id = %project.project_id, "Created project '{}'", project.name);
    Ok(project.project_id)
}

/// Remove the on-disk directory of a deleted project. Missing directories
/// are fine; anything else is logged and ignored — the API deletion
/// already succeeded.
async fn purge_project_dir(root: &str, project_id: &str) {
    let dir = Path::new(root).join(project_id);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => tracing::info!("Removed project directory {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove project directory {}: {}", dir.display(), e),
    }
}
