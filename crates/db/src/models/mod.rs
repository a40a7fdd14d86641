//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs for inserts and patches, where the entity has them

pub mod annotation;
pub mod collaborator;
pub mod label;
pub mod project;
pub mod text;
pub mod user;
