//! Database module for the soleil server
//!
//! This module holds the persisted models and the store traits the
//! handlers are written against, plus their Postgres implementations.

pub mod models;
pub mod operations;

pub use models::{Credential, Note};
pub use operations::{connect_pool, NoteStore, PgNoteStore, PgUserStore, UserStore};
