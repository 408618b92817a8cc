//! Resource monitoring with rate-limited alerting
//!
//! Samples the container's memory utilization on a fixed interval and
//! warns chat when it crosses the threshold. Sampling failures mean the
//! container is stopped or starting; they are nothing to report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bot::fanout::Broadcaster;
use crate::config::config::MonitoringConfig;
use crate::container::control::DockerControl;

/// Threshold + cooldown gate, separated from the loop so it can be
/// exercised with explicit instants instead of real sleeps.
pub struct AlertGate {
    threshold: f64,
    cooldown: Duration,
    last_alert: Option<Instant>,
}

impl AlertGate {
    pub fn new(threshold: f64, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            last_alert: None,
        }
    }

    /// True when this sample should raise an alert. Arms the cooldown as
    /// a side effect.
    pub fn check(&mut self, percent: f64, now: Instant) -> bool {
        if percent <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_alert {
            if now.duration_since(last) <= self.cooldown {
                return false;
            }
        }
        self.last_alert = Some(now);
        true
    }
}

pub async fn run(control: Arc<DockerControl>, notifier: Arc<Broadcaster>, config: MonitoringConfig) {
    tracing::info!(
        "Resource monitor started (threshold {}%, every {}s)",
        config.mem_threshold_percent,
        config.interval_secs
    );

    let mut gate = AlertGate::new(
        config.mem_threshold_percent,
        Duration::from_secs(config.alert_cooldown_secs),
    );

    loop {
        match control.mem_percent().await {
            Ok(percent) => {
                if gate.check(percent, Instant::now()) {
                    tracing::warn!("High memory usage: {:.1}%", percent);
                    notifier
                        .broadcast(
                            &format!(
                                "⚠️ *High RAM Usage Alert!* 📊\nUsage: `{:.1}%`\nThe server might lag. Consider restarting soon.",
                                percent
                            ),
                            None,
                        )
                        .await;
                }
            }
            Err(e) => {
                // Stopped or starting container; not worth alerting over.
                tracing::debug!("Resource sample skipped: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_secs(config.interval_secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_never_alerts() {
        let mut gate = AlertGate::new(90.0, Duration::from_secs(1800));
        let now = Instant::now();
        assert!(!gate.check(45.0, now));
        assert!(!gate.check(90.0, now)); // boundary is not an alert
    }

    #[test]
    fn alert_then_cooldown_then_alert_again() {
        let mut gate = AlertGate::new(90.0, Duration::from_secs(1800));
        let t0 = Instant::now();

        assert!(gate.check(95.0, t0));
        // Still hot, but inside the cooldown window.
        assert!(!gate.check(97.0, t0 + Duration::from_secs(60)));
        assert!(!gate.check(99.0, t0 + Duration::from_secs(1800)));
        // Window elapsed: alert again.
        assert!(gate.check(95.0, t0 + Duration::from_secs(1801)));
    }

    #[test]
    fn recovery_resets_nothing_but_allows_future_alerts() {
        let mut gate = AlertGate::new(90.0, Duration::from_secs(100));
        let t0 = Instant::now();

        assert!(gate.check(95.0, t0));
        assert!(!gate.check(50.0, t0 + Duration::from_secs(10)));
        assert!(gate.check(95.0, t0 + Duration::from_secs(101)));
    }
}
