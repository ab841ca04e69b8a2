//! Service layer for business logic.

pub mod triage;

pub use triage::{IntakeOutcome, IntakeRequest, TriageService};
