//! Removing old archives and releases.
//!
//! Archive and release names carry their timestamp, so name order is age
//! order.

use super::pack::ARCHIVE_PREFIX;
use super::{is_safe_name, DeployError, DeployStep, RemoteError, RemoteShell, RELEASES_DIR};
use std::path::Path;

/// `0` and `1` both mean keep only the newest.
pub fn keep_count(number: usize) -> usize {
    number.max(1)
}

/// Everything but the `keep` newest of `names`, oldest first.
pub fn stale(mut names: Vec<String>, keep: usize) -> Vec<String> {
    names.sort();
    let cut = names.len().saturating_sub(keep_count(keep));
    names.truncate(cut);
    names
}

/// Deletes all but the `number` newest archives in `versions_dir`.
pub async fn clean_local(versions_dir: &Path, number: usize) -> Result<Vec<String>, DeployError> {
    let mut names = Vec::new();
    let mut entries = match tokio::fs::read_dir(versions_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(ARCHIVE_PREFIX) {
                names.push(name.to_string());
            }
        }
    }

    let removed = stale(names, number);
    for name in &removed {
        tokio::fs::remove_file(versions_dir.join(name)).await?;
        tracing::info!(archive = %name, "removed local archive");
    }
    Ok(removed)
}

/// Deletes all but the `number` newest releases on `host`.
pub async fn clean_remote(
    shell: &dyn RemoteShell,
    host: &str,
    number: usize,
) -> Result<Vec<String>, DeployError> {
    let step_error = |step: DeployStep| {
        move |source: RemoteError| DeployError::Step {
            host: host.to_string(),
            step,
            source,
        }
    };

    let listing = shell
        .run(host, &format!("ls -1 {}", RELEASES_DIR))
        .await
        .map_err(step_error(DeployStep::ListReleases))?;
    let names: Vec<String> = listing
        .lines()
        .map(str::trim)
        .filter(|n| n.starts_with(ARCHIVE_PREFIX) && is_safe_name(n))
        .map(str::to_string)
        .collect();

    let removed = stale(names, number);
    for name in &removed {
        shell
            .run(host, &format!("sudo rm -rf {}/{}", RELEASES_DIR, name))
            .await
            .map_err(step_error(DeployStep::RemoveRelease))?;
        tracing::info!(host, release = %name, "removed remote release");
    }
    Ok(removed)
}

/// Local archives first, then every host.
pub async fn clean(
    shell: &dyn RemoteShell,
    hosts: &[String],
    versions_dir: &Path,
    number: usize,
) -> Result<(), DeployError> {
    clean_local(versions_dir, number).await?;
    for host in hosts {
        clean_remote(shell, host, number).await?;
    }
    Ok(())
}
