//! envsync core library.
//!
//! Compares the schemas, permissions, API surfaces, and custom API keys of
//! deployed application environments, and reconciles target environments to
//! match a source environment through the console API.
//!
//! The comparison pipeline: raw environment data is normalized by
//! [`resolve`] (relation identification IDs become names), rendered into
//! canonical signatures by [`signature`], and diffed by [`diff`]. The
//! [`sync`] module applies the ordered mutations needed to align targets
//! with the source.

pub mod api;
pub mod client;
pub mod compare;
pub mod diff;
pub mod errors;
pub mod model;
pub mod resolve;
pub mod signature;
pub mod sync;

pub use api::{ConfirmPrompt, ConsoleApi};
pub use client::ConsoleClient;
pub use errors::{ApiError, ApiResult};
pub use model::{Cardinality, Column, ColumnRef, Environment, Relation, Table};
