use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Credential, Note};
use crate::error::DatabaseError;

#[cfg(test)]
use mockall::automock;

/// Read/insert access to credential records. Implemented by the Postgres
/// store in production and by the in-memory store in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<Credential>, DatabaseError>;
    async fn insert_credential(&self, credential: Credential) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, DatabaseError>;
    async fn insert(&self, note: Note) -> Result<(), DatabaseError>;
    async fn get(&self, id: Uuid) -> Result<Option<Note>, DatabaseError>;

    /// Partial update; `None` fields keep their stored value. Returns false
    /// when no row matched `id`.
    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<bool, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<Credential>, DatabaseError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT login, password_hash, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(credential)
    }

    async fn insert_credential(&self, credential: Credential) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO users (login, password_hash, created_at) VALUES ($1, $2, $3)")
            .bind(&credential.login)
            .bind(&credential.password_hash)
            .bind(credential.created_at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

pub struct PgNoteStore {
    pool: Arc<PgPool>,
}

impl PgNoteStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list(&self) -> Result<Vec<Note>, DatabaseError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, title, content, created_at FROM notes ORDER BY created_at",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(notes)
    }

    async fn insert(&self, note: Note) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO notes (id, title, content, created_at) VALUES ($1, $2, $3, $4)")
            .bind(note.id)
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.created_at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, title, content, created_at FROM notes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(note)
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notes SET title = COALESCE($2, title), content = COALESCE($3, content) WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Connect a bounded pool; acquire timeouts surface as 500s rather than
/// hanging a request.
pub async fn connect_pool(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    Ok(pool)
}
