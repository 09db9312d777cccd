//! Deploy and clean against a recording shell instead of real servers.

use async_trait::async_trait;
use hbnb::infra::deploy::{
    self, clean_local, clean_remote, DeployError, DeployStep, RemoteError, RemoteShell,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
struct FakeShell {
    calls: Mutex<Vec<String>>,
    /// Commands containing this fail.
    fail_on: Option<&'static str>,
    /// Returned for `ls`.
    listing: String,
}

impl FakeShell {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn put(&self, host: &str, local: &Path, remote: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}: put {} {}", host, local.display(), remote));
        Ok(())
    }

    async fn run(&self, host: &str, command: &str) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(format!("{}: {}", host, command));
        if self.fail_on.is_some_and(|needle| command.contains(needle)) {
            return Err(RemoteError::Failed {
                program: "ssh",
                status: "exit status: 1".to_string(),
                stderr: "boom".to_string(),
            });
        }
        if command.starts_with("ls ") {
            return Ok(self.listing.clone());
        }
        Ok(String::new())
    }
}

fn archive_in(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"archive").unwrap();
    path
}

fn hosts() -> Vec<String> {
    vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
}

#[tokio::test]
async fn deploy_runs_every_step_on_every_host() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let archive = archive_in(&dir, "web_static_20240101000000.tgz");
    let shell = FakeShell::default();

    deploy::deploy_archive(&shell, &hosts(), &archive).await?;

    let calls = shell.calls();
    assert_eq!(calls.len(), 18);
    assert!(calls[0].starts_with("10.0.0.1: put "));
    assert!(calls[0].ends_with(" /tmp/"));
    assert_eq!(
        calls[8],
        "10.0.0.1: ln -fs /data/web_static/releases/web_static_20240101000000 /data/web_static/current"
    );
    assert!(calls[9].starts_with("10.0.0.2: put "));
    Ok(())
}

#[tokio::test]
async fn first_failing_step_stops_the_deploy() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let archive = archive_in(&dir, "web_static_20240101000000.tgz");
    let shell = FakeShell {
        fail_on: Some("tar -xzf"),
        ..Default::default()
    };

    let err = deploy::deploy_archive(&shell, &hosts(), &archive)
        .await
        .unwrap_err();
    assert_eq!(err.step(), Some(DeployStep::Extract));
    assert!(matches!(&err, DeployError::Step { host, .. } if host == "10.0.0.1"));
    assert!(err.to_string().contains("extract archive"));

    // Nothing after the failure ran, on this host or the next.
    let calls = shell.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| c.starts_with("10.0.0.1")));
    Ok(())
}

#[tokio::test]
async fn missing_archive_touches_no_server() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let shell = FakeShell::default();

    let err = deploy::deploy_archive(&shell, &hosts(), &dir.path().join("nope.tgz"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::ArchiveMissing(_)));
    assert!(shell.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn clean_local_keeps_the_newest() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    for stamp in ["20240101000000", "20240102000000", "20240103000000"] {
        archive_in(&dir, &format!("web_static_{}.tgz", stamp));
    }
    archive_in(&dir, "notes.txt");

    let removed = clean_local(dir.path(), 2).await?;
    assert_eq!(removed, vec!["web_static_20240101000000.tgz"]);

    let removed = clean_local(dir.path(), 0).await?;
    assert_eq!(removed, vec!["web_static_20240102000000.tgz"]);

    let mut left: Vec<String> = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok()?.file_name().into_string().ok())
        .collect();
    left.sort();
    assert_eq!(left, vec!["notes.txt", "web_static_20240103000000.tgz"]);
    Ok(())
}

#[tokio::test]
async fn clean_local_without_versions_dir_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let removed = clean_local(&dir.path().join("versions"), 1).await?;
    assert!(removed.is_empty());
    Ok(())
}

#[tokio::test]
async fn clean_remote_removes_old_releases() -> Result<(), Box<dyn std::error::Error>> {
    let shell = FakeShell {
        listing: "web_static_20240102000000\nweb_static_20240101000000\n\
                  web_static_20240103000000\ntest\n"
            .to_string(),
        ..Default::default()
    };

    let removed = clean_remote(&shell, "10.0.0.1", 2).await?;
    assert_eq!(removed, vec!["web_static_20240101000000"]);
    assert_eq!(
        shell.calls(),
        vec![
            "10.0.0.1: ls -1 /data/web_static/releases".to_string(),
            "10.0.0.1: sudo rm -rf /data/web_static/releases/web_static_20240101000000"
                .to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn pack_produces_a_timestamped_archive() -> Result<(), Box<dyn std::error::Error>> {
    // Needs a `tar` on PATH.
    if std::process::Command::new("tar").arg("--version").output().is_err() {
        return Ok(());
    }
    let dir = TempDir::new()?;
    let source = dir.path().join("web_static");
    std::fs::create_dir_all(source.join("styles"))?;
    std::fs::write(source.join("index.html"), "<html></html>")?;
    std::fs::write(source.join("styles/common.css"), "body {}")?;
    let versions = dir.path().join("versions");

    let archive = deploy::pack(&source, &versions).await?;
    let name = archive.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("web_static_"));
    assert!(name.ends_with(".tgz"));
    assert_eq!(name.len(), "web_static_20240101000000.tgz".len());
    assert!(std::fs::metadata(&archive)?.len() > 0);

    let listing = std::process::Command::new("tar")
        .arg("-tzf")
        .arg(&archive)
        .output()?;
    let listing = String::from_utf8_lossy(&listing.stdout);
    assert!(listing.contains("web_static/index.html"));
    Ok(())
}

#[tokio::test]
async fn pack_refuses_a_missing_source() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let err = deploy::pack(&dir.path().join("web_static"), &dir.path().join("versions"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Pack(_)));
    Ok(())
}
