pub mod config;
pub mod db;
pub mod web;

pub use config::{ReporterConfig, StoreKind};
pub use db::{open_store, MemoryStatusStore, PgStatusStore, StatusStore, StoreError};
pub use web::create_axum_router;
