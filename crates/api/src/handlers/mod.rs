pub mod annotation;
pub mod collaborator;
pub mod export;
pub mod import;
pub mod label;
pub mod project;
pub mod text;
