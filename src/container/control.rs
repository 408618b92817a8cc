//! Process control adapter for the server container
//!
//! Wraps the Docker API with bounded timeouts. Lifecycle operations hand
//! back user-facing status strings; a hung daemon call becomes a caught
//! failure string, never an unhandled error or an indefinite stall.

use async_trait::async_trait;
use bollard::container::{RestartContainerOptions, StartContainerOptions, StopContainerOptions};
use bollard::Docker;
use std::time::Duration;
use tokio::time::timeout;

use super::stats;

const INSPECT_TIMEOUT: Duration = Duration::from_secs(5);
const START_TIMEOUT: Duration = Duration::from_secs(10);
const STOP_TIMEOUT: Duration = Duration::from_secs(20);
const RESTART_TIMEOUT: Duration = Duration::from_secs(60);

/// Seam between the dispatcher and the container runtime.
#[async_trait]
pub trait ServerControl: Send + Sync {
    async fn start(&self) -> String;
    async fn stop(&self) -> String;
    async fn restart(&self) -> String;
    /// Lowercase run-state (`running`, `exited`, ...), None when the
    /// container cannot be inspected.
    async fn state(&self) -> Option<String>;
    /// Human resource-usage line, "OFFLINE" when stats are unavailable.
    async fn mem_usage(&self) -> String;
}

pub struct DockerControl {
    docker: Docker,
    container_name: String,
}

impl DockerControl {
    pub fn new(container_name: String) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            container_name,
        })
    }

    pub async fn is_running(&self) -> bool {
        match timeout(
            INSPECT_TIMEOUT,
            self.docker.inspect_container(&self.container_name, None),
        )
        .await
        {
            Ok(Ok(info)) => info.state.and_then(|s| s.running).unwrap_or(false),
            _ => false,
        }
    }

    /// Unix timestamp the container started at, for log `since` filtering.
    pub async fn started_at(&self) -> Option<i64> {
        match timeout(
            INSPECT_TIMEOUT,
            self.docker.inspect_container(&self.container_name, None),
        )
        .await
        {
            Ok(Ok(info)) => info.state.and_then(|s| s.started_at).and_then(|ts| {
                chrono::DateTime::parse_from_rfc3339(&ts)
                    .ok()
                    .map(|dt| dt.timestamp())
            }),
            _ => None,
        }
    }

    /// Memory utilization percentage. Errors (container stopped, stats
    /// unavailable) are for the caller to swallow.
    pub async fn mem_percent(&self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let sample = timeout(
            INSPECT_TIMEOUT,
            stats::sample(&self.docker, &self.container_name),
        )
        .await
        .map_err(|_| anyhow::anyhow!("stats sample timed out"))??;
        sample
            .mem_percent()
            .ok_or_else(|| anyhow::anyhow!("no memory limit reported").into())
    }
}

#[async_trait]
impl ServerControl for DockerControl {
    async fn start(&self) -> String {
        tracing::info!("Starting container: {}", self.container_name);
        match timeout(
            START_TIMEOUT,
            self.docker
                .start_container(&self.container_name, None::<StartContainerOptions<String>>),
        )
        .await
        {
            Ok(Ok(())) => "✅ Server starting...".to_string(),
            Ok(Err(e)) => format!("❌ Error: {}", e),
            Err(_) => "❌ Error: start timed out".to_string(),
        }
    }

    async fn stop(&self) -> String {
        tracing::info!("Stopping container: {}", self.container_name);
        match timeout(
            STOP_TIMEOUT,
            self.docker
                .stop_container(&self.container_name, Some(StopContainerOptions { t: 15 })),
        )
        .await
        {
            Ok(Ok(())) => "🛑 Server stopped.".to_string(),
            Ok(Err(e)) => format!("❌ Error: {}", e),
            Err(_) => "❌ Error: stop timed out".to_string(),
        }
    }

    async fn restart(&self) -> String {
        tracing::info!("Restarting container: {}", self.container_name);
        match timeout(
            RESTART_TIMEOUT,
            self.docker
                .restart_container(&self.container_name, None::<RestartContainerOptions>),
        )
        .await
        {
            Ok(Ok(())) => "🔄 Server restarting...".to_string(),
            Ok(Err(e)) => format!("❌ Error: {}", e),
            Err(_) => "❌ Error: restart timed out".to_string(),
        }
    }

    async fn state(&self) -> Option<String> {
        match timeout(
            INSPECT_TIMEOUT,
            self.docker.inspect_container(&self.container_name, None),
        )
        .await
        {
            Ok(Ok(info)) => info
                .state
                .and_then(|s| s.status)
                .map(|status| status.to_string()),
            _ => None,
        }
    }

    async fn mem_usage(&self) -> String {
        match timeout(
            INSPECT_TIMEOUT,
            stats::sample(&self.docker, &self.container_name),
        )
        .await
        {
            Ok(Ok(sample)) => sample.usage_string(),
            _ => "OFFLINE".to_string(),
        }
    }
}
