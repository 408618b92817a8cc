//! Fire-and-forget world backup
//!
//! The heavy lifting (archive + upload) lives in an external script; the
//! bot only launches it detached so a long-running backup never blocks
//! the dispatcher.

use std::path::Path;

pub fn run_backup(script: &str) -> String {
    if !Path::new(script).exists() {
        return "❌ Backup script not found.".to_string();
    }

    // Spawn detached; the child is not awaited and keeps running on its
    // own if the handle is dropped.
    match tokio::process::Command::new(script).spawn() {
        Ok(_child) => {
            tracing::info!("Backup script launched: {}", script);
            "📦 Backup started! You will receive files shortly.".to_string()
        }
        Err(e) => {
            tracing::error!("Failed to launch backup script {}: {}", script, e);
            format!("❌ Error starting backup: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_script_is_reported() {
        assert_eq!(
            run_backup("/definitely/not/a/script.sh"),
            "❌ Backup script not found."
        );
    }
}
