use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::db::models::Note;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

/// `GET /soleil/notes`
pub async fn list_notes(
    identity: Identity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Listing notes for {}", identity.username);
    let notes = state.notes.list().await?;
    Ok(HttpResponse::Ok().json(notes))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// `POST /soleil/notes`
pub async fn create_note(
    identity: Identity,
    req: web::Json<CreateNoteRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let title = req.title.as_deref().unwrap_or("").trim();
    if title.is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    let content = req.content.as_deref().unwrap_or("").trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("Content is required".to_string()));
    }

    let note = Note::new(title.to_string(), content.to_string());
    info!("Creating note {} for {}", note.id, identity.username);
    state.notes.insert(note).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "note created"
    })))
}

/// `GET /soleil/notes/{id}`
pub async fn get_note(
    identity: Identity,
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Fetching note {} for {}", id, identity.username);
    let note = state
        .notes
        .get(id.into_inner())
        .await?
        .ok_or(DatabaseError::NotFound)?;

    Ok(HttpResponse::Ok().json(note))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// `PUT /soleil/notes/{id}` — partial update, at least one field required.
pub async fn update_note(
    identity: Identity,
    id: web::Path<Uuid>,
    req: web::Json<UpdateNoteRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let title = req.title.as_ref().map(|t| t.trim().to_string());
    let content = req.content.as_ref().map(|c| c.trim().to_string());

    if title.is_none() && content.is_none() {
        return Err(AppError::ValidationError(
            "at least one of title or content is required".to_string(),
        ));
    }
    if matches!(&title, Some(t) if t.is_empty()) {
        return Err(AppError::ValidationError("title cannot be empty".to_string()));
    }
    if matches!(&content, Some(c) if c.is_empty()) {
        return Err(AppError::ValidationError("content cannot be empty".to_string()));
    }

    let id = id.into_inner();
    info!("Updating note {} for {}", id, identity.username);
    let found = state.notes.update(id, title, content).await?;
    if !found {
        return Err(DatabaseError::NotFound.into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "note updated"
    })))
}

/// `DELETE /soleil/notes/{id}`
pub async fn delete_note(
    identity: Identity,
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    info!("Deleting note {} for {}", id, identity.username);
    let found = state.notes.delete(id).await?;
    if !found {
        return Err(DatabaseError::NotFound.into());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "note deleted"
    })))
}
