//! Core types and shared functionality for the small-giants registry tools.
//!
//! This crate provides:
//! - The `Item` record model and company-name filtering
//! - Query-signature keyed cache with in-memory and Redis backends
//! - Unified error types
//! - Configuration structures
//! - CSV/JSON export

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod item;

pub use cache::{CacheScope, CacheStore, QuerySignature, TieredCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use export::{Listing, OutputFormat};
pub use filter::{MatchMode, filter_by_company, normalize_name};
pub use item::{COMPANY_NAME_FIELD, Item};
