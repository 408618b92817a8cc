//! One-shot resource sampling from the Docker stats stream

use bollard::container::StatsOptions;
use bollard::Docker;
use futures::StreamExt;

#[derive(Debug, Clone)]
pub struct StatsSample {
    pub memory_bytes: u64,
    pub memory_limit_bytes: u64,
    pub cpu_percent: f64,
}

impl StatsSample {
    pub fn mem_percent(&self) -> Option<f64> {
        if self.memory_limit_bytes == 0 {
            return None;
        }
        Some(self.memory_bytes as f64 / self.memory_limit_bytes as f64 * 100.0)
    }

    pub fn usage_string(&self) -> String {
        const MIB: f64 = 1024.0 * 1024.0;
        format!(
            "{:.0}MiB / {:.0}MiB / {:.1}%",
            self.memory_bytes as f64 / MIB,
            self.memory_limit_bytes as f64 / MIB,
            self.cpu_percent
        )
    }
}

/// Take one sample from the container's stats stream.
///
/// The first frame of the stream has empty pre-CPU counters, so we read a
/// second frame when one is available and compute the CPU delta from that.
pub async fn sample(
    docker: &Docker,
    container_name: &str,
) -> Result<StatsSample, Box<dyn std::error::Error + Send + Sync>> {
    let opts = StatsOptions {
        stream: true,
        one_shot: false,
    };

    let mut stream = docker.stats(container_name, Some(opts));

    let first = stream
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("stats stream ended"))??;
    let stats = match stream.next().await {
        Some(Ok(second)) => second,
        _ => first,
    };

    let cpu_percent = {
        let cpu_delta =
            stats.cpu_stats.cpu_usage.total_usage as i64 - stats.precpu_stats.cpu_usage.total_usage as i64;
        let system_delta = stats.cpu_stats.system_cpu_usage.unwrap_or(0) as i64
            - stats.precpu_stats.system_cpu_usage.unwrap_or(0) as i64;

        if system_delta > 0 && cpu_delta > 0 {
            let num_cpus = stats.cpu_stats.online_cpus.unwrap_or(1) as f64;
            (cpu_delta as f64 / system_delta as f64) * num_cpus * 100.0
        } else {
            0.0
        }
    };

    Ok(StatsSample {
        memory_bytes: stats.memory_stats.usage.unwrap_or(0),
        memory_limit_bytes: stats.memory_stats.limit.unwrap_or(0),
        cpu_percent: (cpu_percent * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_percent_requires_a_limit() {
        let sample = StatsSample {
            memory_bytes: 512,
            memory_limit_bytes: 0,
            cpu_percent: 0.0,
        };
        assert!(sample.mem_percent().is_none());

        let sample = StatsSample {
            memory_bytes: 512 * 1024 * 1024,
            memory_limit_bytes: 1024 * 1024 * 1024,
            cpu_percent: 12.5,
        };
        assert!((sample.mem_percent().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn usage_string_is_human_readable() {
        let sample = StatsSample {
            memory_bytes: 512 * 1024 * 1024,
            memory_limit_bytes: 2048 * 1024 * 1024,
            cpu_percent: 35.25,
        };
        assert_eq!(sample.usage_string(), "512MiB / 2048MiB / 35.2%");
    }
}
