use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{MemoryStore, StoreSnapshot};

/// Load a store snapshot from disk. A missing file gives an empty store; an
/// unreadable or corrupt file is an error so it never gets overwritten.
pub async fn load_store(path: impl AsRef<Path>) -> Result<MemoryStore> {
    let path = path.as_ref();
    if !fs::try_exists(path).await? {
        info!("No {} found, starting with an empty rotation store", path.display());
        return Ok(MemoryStore::new());
    }

    let data = fs::read_to_string(path).await.map_err(|e| {
        warn!("Failed to read {}: {e}", path.display());
        e
    })?;
    let snapshot: StoreSnapshot = serde_json::from_str(&data).map_err(|e| {
        warn!("Failed to parse {}: {e}", path.display());
        e
    })?;
    let rows: usize = snapshot.regattas.values().map(Vec::len).sum();
    info!(
        "Loaded rotation store from {} ({} regattas, {} assignments)",
        path.display(),
        snapshot.regattas.len(),
        rows
    );
    Ok(MemoryStore::from_snapshot(snapshot))
}

/// Write every regatta's assignments to disk as pretty JSON.
pub async fn save_store(path: impl AsRef<Path>, store: &MemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RotationError;
    use crate::regatta::{RaceId, TeamId};
    use crate::store::{Assignment, Batch, RotationStore};
    use sail_types::Sail;

    #[tokio::test]
    async fn missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(dir.path().join("rotations.json")).await.unwrap();
        assert!(store.snapshot().regattas.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotations.json");
        std::fs::write(&path, r#"{"regattas":{"fall":[{"race":0,"#).unwrap();
        assert!(matches!(load_store(&path).await, Err(RotationError::Json(_))));
        // left for the operator to repair
        assert!(std::fs::read_to_string(&path).unwrap().contains("fall"));
    }

    #[tokio::test]
    async fn save_then_load_keeps_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotations.json");

        let mut store = MemoryStore::new();
        store
            .commit(Batch {
                regatta: "spring".into(),
                assignments: vec![Assignment {
                    race: RaceId(3),
                    team: TeamId(1),
                    sail: Sail::new("A12", "blue"),
                }],
            })
            .unwrap();
        save_store(&path, &store).await.unwrap();

        let loaded = load_store(&path).await.unwrap();
        assert_eq!(
            loaded.lookup("spring", RaceId(3), TeamId(1)),
            Some(Sail::new("A12", "blue"))
        );
    }
}
