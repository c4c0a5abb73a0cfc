//! Core types and shared functionality for holocron.
//!
//! This crate provides:
//! - Catalog entity model and view routes
//! - In-memory resource cache with request coalescing
//! - Search, pagination and selection over loaded collections
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod crossref;
pub mod error;
pub mod filter;
pub mod model;
pub mod route;
pub mod selection;

pub use cache::{CacheStats, EntryInfo, EntryState, ResourceCache};
pub use config::{AppConfig, ConfigError};
pub use crossref::{CrossRefs, RelatedPanel, RelatedUpdate, Slot};
pub use error::Error;
pub use filter::{FilterState, Page, PageControls};
pub use model::{Character, DetailField, Film, Kind, Resource};
pub use route::Route;
