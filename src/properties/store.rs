//! Flat key=value store for server.properties
//!
//! Reads are line scans; writes rewrite only the matching keys and leave
//! every other line byte-identical. There is no cross-process locking of
//! the file, so a concurrent writer (the server itself on shutdown) can
//! race a bot edit. Acceptable for a single-operator control plane.

use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PropertiesStore {
    path: PathBuf,
}

impl PropertiesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Value of the first `key=` line, or None when the key is absent or
    /// the file cannot be read.
    pub fn read(&self, key: &str) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let prefix = format!("{}=", key);
        content
            .lines()
            .find(|line| line.starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }

    pub fn read_bool(&self, key: &str) -> bool {
        self.read(key).as_deref() == Some("true")
    }

    /// Rewrite every `key=` line as `key=value`, preserving all other
    /// lines exactly as they were.
    pub fn write(&self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let content = fs::read_to_string(&self.path)?;
        let prefix = format!("{}=", key);

        let mut out = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            if body.starts_with(&prefix) {
                out.push_str(&prefix);
                out.push_str(value);
                out.push('\n');
            } else {
                out.push_str(line);
            }
        }

        fs::write(&self.path, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_props(name: &str, content: &str) -> PropertiesStore {
        let path = std::env::temp_dir().join(format!("craftctl-props-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        PropertiesStore::new(path)
    }

    #[test]
    fn read_existing_key() {
        let store = temp_props("read", "#comment\nmax-players=20\npvp=true\n");
        assert_eq!(store.read("max-players").as_deref(), Some("20"));
        assert!(store.read_bool("pvp"));
    }

    #[test]
    fn read_missing_key_is_none() {
        let store = temp_props("missing", "pvp=true\n");
        assert_eq!(store.read("view-distance"), None);
        assert!(!store.read_bool("white-list"));
    }

    #[test]
    fn write_round_trip_preserves_other_lines() {
        let original = "#Minecraft server properties\n#generated\nmax-players=20\npvp=true\nview-distance=10\n";
        let store = temp_props("roundtrip", original);

        store.write("pvp", "false").unwrap();

        assert_eq!(store.read("pvp").as_deref(), Some("false"));
        let rewritten = fs::read_to_string(store.path.clone()).unwrap();
        assert_eq!(
            rewritten,
            "#Minecraft server properties\n#generated\nmax-players=20\npvp=false\nview-distance=10\n"
        );
    }

    #[test]
    fn write_does_not_touch_prefix_collisions() {
        // "pvp=" must not match "pvp-extra="
        let store = temp_props("prefix", "pvp-extra=1\npvp=true\n");
        store.write("pvp", "false").unwrap();
        assert_eq!(store.read("pvp-extra").as_deref(), Some("1"));
        assert_eq!(store.read("pvp").as_deref(), Some("false"));
    }

    #[test]
    fn values_containing_equals_survive() {
        let store = temp_props("equals", "motd=A=B=C\npvp=true\n");
        assert_eq!(store.read("motd").as_deref(), Some("A=B=C"));
        store.write("motd", "X=Y").unwrap();
        assert_eq!(store.read("motd").as_deref(), Some("X=Y"));
    }
}
