//! Packing the static site into a timestamped archive.

use super::remote::run_program;
use super::DeployError;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const ARCHIVE_PREFIX: &str = "web_static_";
pub const ARCHIVE_EXTENSION: &str = ".tgz";

/// `web_static_<YYYYmmddHHMMSS>.tgz`
pub fn archive_name(at: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        at.format("%Y%m%d%H%M%S"),
        ARCHIVE_EXTENSION
    )
}

/// Archives `source_dir` into `versions_dir` and returns the archive path.
///
/// The archive holds `source_dir`'s own directory name at its root, the way
/// the release layout on the servers expects it.
pub async fn pack(source_dir: &Path, versions_dir: &Path) -> Result<PathBuf, DeployError> {
    let (Some(parent), Some(dir_name)) = (source_dir.parent(), source_dir.file_name()) else {
        return Err(DeployError::Pack(format!(
            "cannot archive {}",
            source_dir.display()
        )));
    };
    if !tokio::fs::try_exists(source_dir).await? {
        return Err(DeployError::Pack(format!(
            "{} does not exist",
            source_dir.display()
        )));
    }

    tokio::fs::create_dir_all(versions_dir).await?;
    let archive = versions_dir.join(archive_name(Local::now()));

    let mut cmd = Command::new("tar");
    cmd.arg("-czf").arg(&archive).arg("-C");
    if parent.as_os_str().is_empty() {
        cmd.arg(".");
    } else {
        cmd.arg(parent);
    }
    cmd.arg(dir_name);
    run_program("tar", &mut cmd)
        .await
        .map_err(|e| DeployError::Pack(e.to_string()))?;

    tracing::info!(archive = %archive.display(), "packed");
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn archive_name_is_timestamped() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(archive_name(at), "web_static_20240309070501.tgz");
    }
}
