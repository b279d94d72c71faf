//! Program persistence boundary.
//!
//! Programs are saved and loaded as whole documents: every mutation is a
//! full read-modify-write of the aggregate. There is no cross-writer
//! locking; concurrent saves are last-writer-wins at document granularity.

pub mod json;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Program;
use crate::error::{Entity, Error, Result};

// Re-export the file-backed store
pub use json::JsonProgramStore;

/// Whole-document program store
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Load the latest copy of a program
    async fn load(&self, id: Uuid) -> Result<Program>;

    /// Persist a program, refreshing its update timestamp
    async fn save(&self, program: &mut Program) -> Result<()>;

    /// All programs, most recently updated first
    async fn list(&self) -> Result<Vec<Program>>;

    /// Remove a program
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// In-memory store used by tests and ephemeral runs
#[derive(Default)]
pub struct MemoryProgramStore {
    programs: Mutex<HashMap<Uuid, Program>>,
}

impl MemoryProgramStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgramStore for MemoryProgramStore {
    async fn load(&self, id: Uuid) -> Result<Program> {
        self.programs
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(Entity::Program, id))
    }

    async fn save(&self, program: &mut Program) -> Result<()> {
        program.touch();
        self.programs
            .lock()
            .await
            .insert(program.id, program.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Program>> {
        let mut programs: Vec<Program> = self.programs.lock().await.values().cloned().collect();
        programs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(programs)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.programs
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(Entity::Program, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryProgramStore::new();
        let mut program = Program::new("Rust 101", "user-1");
        let id = program.id;

        store.save(&mut program).await.unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.title, "Rust 101");
    }

    #[tokio::test]
    async fn test_memory_store_missing_is_not_found() {
        let store = MemoryProgramStore::new();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_refreshes_updated_at() {
        let store = MemoryProgramStore::new();
        let mut program = Program::new("P", "user-1");
        let created = program.updated_at;

        store.save(&mut program).await.unwrap();

        assert!(program.updated_at >= created);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemoryProgramStore::new();
        let mut program = Program::new("Original", "user-1");
        let id = program.id;
        store.save(&mut program).await.unwrap();

        // Two writers load independent copies
        let mut copy_a = store.load(id).await.unwrap();
        let mut copy_b = store.load(id).await.unwrap();

        copy_a.title = "Writer A".to_string();
        store.save(&mut copy_a).await.unwrap();

        copy_b.title = "Writer B".to_string();
        store.save(&mut copy_b).await.unwrap();

        // The second save clobbers the first, whole-document
        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.title, "Writer B");
    }
}
