//! # SDGP Context Core
//!
//! Shared, I/O-free logic for SDGP Context: the project record schema,
//! content fingerprints, the relevance ranker, bounded conversation memory,
//! and dataset analysis.
//!
//! This crate contains no tokio, no filesystem access, and no network
//! clients. Everything here is deterministic given its inputs, which keeps
//! the ranking and staleness rules testable in isolation.

pub mod analysis;
pub mod fingerprint;
pub mod memory;
pub mod models;
pub mod rank;
pub mod text;
