//! # sixten-core
//!
//! Core types, triage rules, and abstractions for the sixten read-it-later
//! queue.
//!
//! This crate provides the data model, error taxonomy, tag and URL
//! normalization, and the trait definitions that the storage, inference and
//! API crates depend on.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod stats;
pub mod tags;
pub mod traits;
pub mod triage;
pub mod urls;

// Re-export commonly used types at crate root
pub use error::{AnalysisError, CapacityError, Error, FetchError, Result};
pub use events::{EventBus, EventEnvelope, ServerEvent};
pub use models::*;
pub use stats::QueueStats;
pub use tags::{normalize_tag, normalize_tags, suggest_tags, TagSuggestions};
pub use traits::*;
pub use triage::{allowed_targets, can_transition, TriageLimits};
