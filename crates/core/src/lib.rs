//! Domain logic for the text annotation service.
//!
//! Everything in this crate is pure: no database, no async, no network.
//! The `db` crate persists what these functions compute and the `api`
//! crate wires both behind HTTP handlers.

pub mod access;
pub mod encoding;
pub mod error;
pub mod export;
pub mod importer;
pub mod labels;
pub mod overlay;
pub mod span;
pub mod types;
