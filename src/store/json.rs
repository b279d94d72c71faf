//! File-backed program store: one JSON document per program.
//!
//! Documents live under `<home>/programs/<uuid>.json`, pretty-printed for
//! easy inspection and debugging.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::domain::Program;
use crate::error::{Entity, Error, Result};

use super::ProgramStore;

/// JSON-document program store
pub struct JsonProgramStore {
    /// Directory holding the program documents
    programs_dir: PathBuf,
}

impl JsonProgramStore {
    /// Create a store rooted at the given directory
    pub fn new(programs_dir: impl Into<PathBuf>) -> Self {
        Self {
            programs_dir: programs_dir.into(),
        }
    }

    /// Create a store at the configured default location
    pub fn from_config() -> Result<Self> {
        let dir = crate::config::programs_dir()
            .map_err(|e| Error::persistence(format!("cannot resolve programs dir: {}", e)))?;
        Ok(Self::new(dir))
    }

    /// The directory holding the documents
    pub fn programs_dir(&self) -> &Path {
        &self.programs_dir
    }

    fn document_path(&self, id: Uuid) -> PathBuf {
        self.programs_dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl ProgramStore for JsonProgramStore {
    async fn load(&self, id: Uuid) -> Result<Program> {
        let path = self.document_path(id);

        if !path.exists() {
            return Err(Error::not_found(Entity::Program, id));
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::persistence_io(format!("failed to read {}", path.display()), e))?;

        serde_json::from_str(&content).map_err(|e| {
            Error::persistence(format!("corrupt program document {}: {}", path.display(), e))
        })
    }

    async fn save(&self, program: &mut Program) -> Result<()> {
        program.touch();

        fs::create_dir_all(&self.programs_dir).await.map_err(|e| {
            Error::persistence_io(
                format!("failed to create {}", self.programs_dir.display()),
                e,
            )
        })?;

        let path = self.document_path(program.id);
        let content = serde_json::to_string_pretty(program)
            .map_err(|e| Error::persistence(format!("failed to serialize program: {}", e)))?;

        fs::write(&path, content)
            .await
            .map_err(|e| Error::persistence_io(format!("failed to write {}", path.display()), e))
    }

    async fn list(&self) -> Result<Vec<Program>> {
        if !self.programs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.programs_dir).await.map_err(|e| {
            Error::persistence_io(
                format!("failed to list {}", self.programs_dir.display()),
                e,
            )
        })?;

        let mut programs = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::persistence_io("failed to read directory entry", e))?
        {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            let Ok(id) = Uuid::parse_str(stem) else {
                continue;
            };

            programs.push(self.load(id).await?);
        }

        programs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(programs)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.document_path(id);

        if !path.exists() {
            return Err(Error::not_found(Entity::Program, id));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| Error::persistence_io(format!("failed to delete {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (JsonProgramStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = JsonProgramStore::new(temp.path().join("programs"));
        (store, temp)
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (store, _temp) = test_store();
        let mut program = Program::new("Rust 101", "user-1").with_tag("rust");
        let id = program.id;

        store.save(&mut program).await.unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.title, "Rust 101");
        assert_eq!(loaded.tags, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (store, _temp) = test_store();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_persistence_error() {
        let (store, _temp) = test_store();
        let id = Uuid::new_v4();

        fs::create_dir_all(store.programs_dir()).await.unwrap();
        fs::write(store.programs_dir().join(format!("{}.json", id)), "not json")
            .await
            .unwrap();

        let err = store.load(id).await.unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted_by_update_time() {
        let (store, _temp) = test_store();

        let mut first = Program::new("First", "user-1");
        store.save(&mut first).await.unwrap();

        let mut second = Program::new("Second", "user-1");
        store.save(&mut second).await.unwrap();

        let programs = store.list().await.unwrap();
        assert_eq!(programs.len(), 2);
        assert!(programs[0].updated_at >= programs[1].updated_at);
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _temp) = test_store();
        let mut program = Program::new("P", "user-1");
        let id = program.id;
        store.save(&mut program).await.unwrap();

        store.delete(id).await.unwrap();

        assert!(store.load(id).await.unwrap_err().is_not_found());
        assert!(store.delete(id).await.unwrap_err().is_not_found());
    }
}
