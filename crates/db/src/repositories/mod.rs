//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` (or an open transaction, for the steps of a multi-statement
//! operation) as the first argument.

pub mod annotation_repo;
pub mod collaborator_repo;
pub mod label_repo;
pub mod project_repo;
pub mod text_repo;
pub mod user_repo;

pub use annotation_repo::AnnotationRepo;
pub use collaborator_repo::CollaboratorRepo;
pub use label_repo::LabelRepo;
pub use project_repo::ProjectRepo;
pub use text_repo::TextRepo;
pub use user_repo::UserRepo;

/// Transaction handle passed between repositories during one operation.
pub type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
