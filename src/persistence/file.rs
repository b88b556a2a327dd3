use super::{PersistenceGateway, ProfileSnapshot};
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the snapshot as pretty JSON in a single file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "trust_profile".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Result<Option<ProfileSnapshot>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read snapshot {}", self.path.display()))
            }
        };

        let snapshot = ProfileSnapshot::from_json(&raw)
            .with_context(|| format!("Corrupt snapshot {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ProfileSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory {}", parent.display())
            })?;
        }

        let json = snapshot.to_json()?;
        let temp = self.temp_path();
        fs::write(&temp, json)
            .with_context(|| format!("Failed to write snapshot {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to move snapshot into {}", self.path.display()))?;

        debug!(path = %self.path.display(), certs = snapshot.certs.len(), "Saved trust profile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionCatalog;
    use crate::trust::{Faction, TrustState};
    use tempfile::TempDir;

    fn snapshot() -> ProfileSnapshot {
        let catalog = DefinitionCatalog::default();
        ProfileSnapshot::capture(&TrustState::new("p1", Faction::neutral(), &catalog))
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("profile.json"));
        assert!(gateway.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let gateway = JsonFileGateway::new(dir.path().join("nested/profile.json"));

        gateway.save(&snapshot()).unwrap();
        assert_eq!(gateway.load().unwrap(), Some(snapshot()));
        assert!(!gateway.temp_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "{ truncated").unwrap();

        assert!(JsonFileGateway::new(path).load().is_err());
    }
}
