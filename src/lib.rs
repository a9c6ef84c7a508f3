//! # SDGP Context
//!
//! A local-first context engine for AI chat over SDGP project records.
//!
//! SDGP Context loads a scraped project dataset, ranks records against a
//! free-text query, and renders a bounded context block for a downstream
//! language model. Per-record summaries are expensive to produce, so they
//! are kept in a content-addressed cache on disk and recomputed only when
//! the record they describe changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌───────────┐
//! │ Dataset  │──▶│  Ranker  │──▶│  Context   │──▶│ Generator │
//! │  (JSON)  │   │ (core)   │   │ Assembler  │   │ OpenAI /  │
//! └──────────┘   └──────────┘   └─────┬──────┘   │  Ollama   │
//!                                     │          └───────────┘
//!                               ┌─────▼──────┐
//!                               │  Summary   │
//!                               │   Cache    │
//!                               └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sdgp warm                         # fill the summary cache
//! sdgp search "health monitoring" --explain
//! sdgp context "edtech for rural schools"
//! sdgp ask "which projects use machine learning?"
//! sdgp chat                         # interactive session
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`dataset`] | Dataset file discovery and loading |
//! | [`cache`] | Fingerprint-validated summary cache |
//! | [`generation`] | Text generation provider abstraction |
//! | [`summarize`] | Summary synthesis and cache warm-up |
//! | [`context`] | Context block assembly |
//! | [`harness`] | Query surface used by the CLI and chat loop |
//! | [`indicator`] | Terminal "thinking" indicator |
//! | [`progress`] | Warm-up progress reporting |
//! | [`search`] | `sdgp search` |
//! | [`get`] | `sdgp get` / `sdgp find` |
//! | [`stats`] | `sdgp stats` |
//! | [`export`] | `sdgp cache export` / `sdgp cache clear` |
//! | [`report`] | `sdgp report` |
//! | [`chat`] | `sdgp ask` / `sdgp chat` |
//! | [`warm`] | `sdgp warm` |
//!
//! Record types, fingerprints, ranking, conversation memory and dataset
//! analysis live in the [`sdgp_context_core`] crate and are re-exported here.

pub mod cache;
pub mod chat;
pub mod config;
pub mod context;
pub mod dataset;
pub mod export;
pub mod generation;
pub mod get;
pub mod harness;
pub mod indicator;
pub mod progress;
pub mod report;
pub mod search;
pub mod stats;
pub mod summarize;
pub mod warm;

pub use sdgp_context_core::{analysis, fingerprint, memory, models, rank, text};
