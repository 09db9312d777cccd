//! Shipping the static site to the web servers.
//!
//! A deploy is a fixed sequence of steps per host. The first step that fails
//! stops the deploy, and the error names the host and the step.

pub mod clean;
pub mod pack;
pub mod remote;

pub use clean::{clean, clean_local, clean_remote};
pub use pack::{archive_name, pack};
pub use remote::{RemoteError, RemoteShell, SshShell};

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REMOTE_TMP_DIR: &str = "/tmp";
pub const RELEASES_DIR: &str = "/data/web_static/releases";
pub const CURRENT_LINK: &str = "/data/web_static/current";
/// Top-level directory inside every archive.
pub const ARCHIVE_ROOT: &str = "web_static";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    Upload,
    ClearRelease,
    CreateRelease,
    Extract,
    RemoveUpload,
    MoveContents,
    RemoveNested,
    Unlink,
    Link,
    ListReleases,
    RemoveRelease,
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStep::Upload => "upload archive",
            DeployStep::ClearRelease => "clear release directory",
            DeployStep::CreateRelease => "create release directory",
            DeployStep::Extract => "extract archive",
            DeployStep::RemoveUpload => "remove uploaded archive",
            DeployStep::MoveContents => "move release contents",
            DeployStep::RemoveNested => "remove nested directory",
            DeployStep::Unlink => "remove current link",
            DeployStep::Link => "link current release",
            DeployStep::ListReleases => "list releases",
            DeployStep::RemoveRelease => "remove old release",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("archive not found: {0}")]
    ArchiveMissing(PathBuf),

    #[error("invalid archive name: {0}")]
    InvalidArchiveName(String),

    #[error("packing failed: {0}")]
    Pack(String),

    #[error("{host}: {step} failed: {source}")]
    Step {
        host: String,
        step: DeployStep,
        #[source]
        source: RemoteError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// The step that failed, for remote failures.
    pub fn step(&self) -> Option<DeployStep> {
        match self {
            DeployError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Names that are safe to splice into a remote shell command.
pub(crate) fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    Put { local: PathBuf, remote: String },
    Run(String),
}

/// The per-host steps that install `archive` as the current release.
pub fn release_plan(archive: &Path) -> Result<Vec<(DeployStep, RemoteOp)>, DeployError> {
    let file_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| is_safe_name(n))
        .ok_or_else(|| DeployError::InvalidArchiveName(archive.display().to_string()))?;
    let release_name = file_name.split('.').next().unwrap_or(file_name);
    let release = format!("{}/{}", RELEASES_DIR, release_name);
    let upload = format!("{}/{}", REMOTE_TMP_DIR, file_name);

    Ok(vec![
        (
            DeployStep::Upload,
            RemoteOp::Put {
                local: archive.to_path_buf(),
                remote: format!("{}/", REMOTE_TMP_DIR),
            },
        ),
        (DeployStep::ClearRelease, RemoteOp::Run(format!("rm -rf {}", release))),
        (DeployStep::CreateRelease, RemoteOp::Run(format!("mkdir -p {}", release))),
        (
            DeployStep::Extract,
            RemoteOp::Run(format!("tar -xzf {} -C {}", upload, release)),
        ),
        (DeployStep::RemoveUpload, RemoteOp::Run(format!("rm {}", upload))),
        (
            DeployStep::MoveContents,
            RemoteOp::Run(format!(
                "mv -f {0}/{1}/* {0}/",
                release, ARCHIVE_ROOT
            )),
        ),
        (
            DeployStep::RemoveNested,
            RemoteOp::Run(format!("rm -rf {}/{}/", release, ARCHIVE_ROOT)),
        ),
        (DeployStep::Unlink, RemoteOp::Run(format!("rm -rf {}", CURRENT_LINK))),
        (
            DeployStep::Link,
            RemoteOp::Run(format!("ln -fs {} {}", release, CURRENT_LINK)),
        ),
    ])
}

/// Installs an already-packed archive on every host, in order.
pub async fn deploy_archive(
    shell: &dyn RemoteShell,
    hosts: &[String],
    archive: &Path,
) -> Result<(), DeployError> {
    if !tokio::fs::try_exists(archive).await? {
        return Err(DeployError::ArchiveMissing(archive.to_path_buf()));
    }
    let plan = release_plan(archive)?;

    for host in hosts {
        for (step, op) in &plan {
            let result = match op {
                RemoteOp::Put { local, remote } => shell.put(host, local, remote).await,
                RemoteOp::Run(command) => shell.run(host, command).await.map(|_| ()),
            };
            result.map_err(|source| DeployError::Step {
                host: host.clone(),
                step: *step,
                source,
            })?;
        }
        tracing::info!(host = %host, archive = %archive.display(), "release deployed");
    }
    Ok(())
}

/// Packs `source_dir` and deploys the result.
pub async fn deploy(
    shell: &dyn RemoteShell,
    hosts: &[String],
    source_dir: &Path,
    versions_dir: &Path,
) -> Result<PathBuf, DeployError> {
    let archive = pack(source_dir, versions_dir).await?;
    deploy_archive(shell, hosts, &archive).await?;
    Ok(archive)
}
