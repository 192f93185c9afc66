//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Update DTOs where a flow writes a subset of columns

pub mod campaign;
pub mod content_draft;
pub mod paid_content;
