//! Console bridge to the game server's remote console
//!
//! Runs `rcon-cli` inside the server container through the Docker exec API
//! and hands back the cleaned text output.

use async_trait::async_trait;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

use super::ansi::strip_ansi;

pub const RCON_TIMEOUT_MSG: &str = "⚠️ Error: RCON Timeout (Server Busy)";

const EXEC_TIMEOUT: Duration = Duration::from_secs(5);

/// Seam between the dispatcher and the game server's console.
///
/// Failures come back as text, never as errors: a hung or dead server must
/// turn into a user-facing message, not take the caller down with it.
#[async_trait]
pub trait GameConsole: Send + Sync {
    async fn execute(&self, command: &str) -> String;
}

pub struct RconConsole {
    docker: Docker,
    container_name: String,
}

impl RconConsole {
    pub fn new(container_name: String) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            container_name,
        })
    }

    async fn run_exec(&self, command: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut cmd = vec!["rcon-cli".to_string()];
        cmd.extend(command.split_whitespace().map(str::to_string));

        let exec = self
            .docker
            .create_exec(
                &self.container_name,
                CreateExecOptions {
                    cmd: Some(cmd),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let mut collected = String::new();
        if let StartExecResults::Attached { mut output, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(chunk) = output.next().await {
                let chunk = chunk?;
                collected.push_str(&String::from_utf8_lossy(&chunk.into_bytes()));
            }
        }

        Ok(strip_ansi(collected.trim()))
    }
}

#[async_trait]
impl GameConsole for RconConsole {
    async fn execute(&self, command: &str) -> String {
        match timeout(EXEC_TIMEOUT, self.run_exec(command)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("Console command failed: {}", e);
                format!("Error: {}", e)
            }
            Err(_) => {
                tracing::warn!("Console command timed out: {}", command);
                RCON_TIMEOUT_MSG.to_string()
            }
        }
    }
}
