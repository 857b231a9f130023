//! Note CRUD handlers, gated by the `Identity` extractor.
//!
//! Persistence lives behind the `NoteStore` trait in the db module; these
//! handlers only validate input and map outcomes to responses.

pub mod handlers;
