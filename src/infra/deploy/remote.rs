//! Running commands on the web servers.

use crate::infra::config::DeployConfig;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: &'static str,
        status: String,
        stderr: String,
    },
}

/// Remote execution seam: upload a file, run a shell command.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn put(&self, host: &str, local: &Path, remote: &str) -> Result<(), RemoteError>;

    /// Runs `command` and returns its stdout.
    async fn run(&self, host: &str, command: &str) -> Result<String, RemoteError>;
}

/// Runs a local program to completion, turning a non-zero exit into an error.
pub(crate) async fn run_program(
    program: &'static str,
    command: &mut Command,
) -> Result<String, RemoteError> {
    let output = command
        .output()
        .await
        .map_err(|source| RemoteError::Spawn { program, source })?;
    if !output.status.success() {
        return Err(RemoteError::Failed {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `scp`/`ssh` with a key file, non-interactive.
pub struct SshShell {
    user: String,
    key_file: std::path::PathBuf,
}

impl SshShell {
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            user: config.user.clone(),
            key_file: config.key_file.clone(),
        }
    }

    fn target(&self, host: &str) -> String {
        format!("{}@{}", self.user, host)
    }

    fn base_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-i")
            .arg(&self.key_file)
            .args(["-o", "BatchMode=yes"]);
        cmd
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn put(&self, host: &str, local: &Path, remote: &str) -> Result<(), RemoteError> {
        tracing::debug!(host, local = %local.display(), remote, "scp");
        let mut cmd = self.base_command("scp");
        cmd.arg(local).arg(format!("{}:{}", self.target(host), remote));
        run_program("scp", &mut cmd).await.map(|_| ())
    }

    async fn run(&self, host: &str, command: &str) -> Result<String, RemoteError> {
        tracing::debug!(host, command, "ssh");
        let mut cmd = self.base_command("ssh");
        cmd.arg(self.target(host)).arg(command);
        run_program("ssh", &mut cmd).await
    }
}
