use crate::config::config::Config;

pub fn print_banner() {
    let banner = format!(
        r#"
 ----------------------------------------
  craftctl v{}
  Telegram control for a containerized
  Minecraft server
 ----------------------------------------
"#,
        env!("CARGO_PKG_VERSION")
    );

    println!("{}", banner);
}

/// Sanity-check the configured paths before the loops start. Nothing here
/// is fatal: the server may simply not have generated its files yet, but
/// surprises are cheaper to spot at startup than mid-session.
pub fn check_paths(config: &Config) {
    if !std::path::Path::new(&config.server.properties_file).exists() {
        tracing::warn!(
            "Properties file not found yet: {}",
            config.server.properties_file
        );
    }

    if !std::path::Path::new(&config.server.backup_script).exists() {
        tracing::warn!(
            "Backup script not found: {} (backup button will report this)",
            config.server.backup_script
        );
    }

    if config.telegram.allowed_chat_ids.is_empty() {
        tracing::warn!("No allowed chat ids configured; nobody can control the bot");
    }
}
