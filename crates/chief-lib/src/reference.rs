//! Reference data store — per-vehicle JSON documents on disk.
//!
//! One flat `label → value` JSON file per vehicle, addressed by the
//! normalized slug of its display name. An absent or unreadable file is a
//! miss, never an error; callers degrade to a "no data" reply.

use std::path::PathBuf;

use tracing::warn;

use chief_core::slug::vehicle_slug;
use chief_core::types::ReferenceData;

pub struct ReferenceStore {
    base_dir: PathBuf,
}

impl ReferenceStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Look up the reference document for a vehicle display name.
    pub fn lookup(&self, vehicle_name: &str) -> Option<ReferenceData> {
        let slug = vehicle_slug(vehicle_name);
        if slug.is_empty() {
            return None;
        }
        let path = self.base_dir.join(format!("{slug}.json"));
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("malformed reference file {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(file: &str, contents: &str) -> (tempfile::TempDir, ReferenceStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file), contents).unwrap();
        let store = ReferenceStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn loads_matching_vehicle_file() {
        let (_dir, store) = store_with("f_16a.json", r#"{"Combat": 450}"#);
        let data = store.lookup("F 16A").unwrap();
        assert_eq!(data.get("Combat"), Some(&serde_json::json!(450)));
    }

    #[test]
    fn slugged_file_name_with_hyphen() {
        let (_dir, store) = store_with(
            "f-16c_block_50.json",
            r#"{"Combat": 450, "Landing": 350, "Takeoff": 320}"#,
        );
        assert!(store.lookup("F-16C Block 50").is_some());
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceStore::new(dir.path());
        assert!(store.lookup("Unknown Vehicle").is_none());
    }

    #[test]
    fn malformed_file_is_a_miss() {
        let (_dir, store) = store_with("f_16a.json", "not json{");
        assert!(store.lookup("F 16A").is_none());
    }

    #[test]
    fn empty_name_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReferenceStore::new(dir.path());
        assert!(store.lookup("").is_none());
        assert!(store.lookup("!!!").is_none());
    }
}
