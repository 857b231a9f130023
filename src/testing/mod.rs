//! In-memory store implementations for tests.
//!
//! Integration tests assemble an `AppState` over these instead of a live
//! Postgres instance. Behavior mirrors the Postgres stores, including the
//! duplicate-login error on insert.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Credential, Note};
use crate::db::operations::{NoteStore, UserStore};
use crate::error::DatabaseError;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, Credential>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<Credential>, DatabaseError> {
        Ok(self.users.read().await.get(login).cloned())
    }

    async fn insert_credential(&self, credential: Credential) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(&credential.login) {
            return Err(DatabaseError::Duplicate);
        }
        users.insert(credential.login.clone(), credential);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>, DatabaseError> {
        Ok(self.notes.read().await.clone())
    }

    async fn insert(&self, note: Note) -> Result<(), DatabaseError> {
        self.notes.write().await.push(note);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        Ok(self.notes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<bool, DatabaseError> {
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                if let Some(title) = title {
                    note.title = title;
                }
                if let Some(content) = content {
                    note.content = content;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        Ok(notes.len() < before)
    }
}
