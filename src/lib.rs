//! In-memory attendance ledger: an append-only per-student record store,
//! report aggregation, and CSV export.

pub mod clock;
pub mod errors;
pub mod export;
pub mod import;
pub mod models;
pub mod report;
pub mod service;
pub mod store;
pub mod timestamp;
