//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate lookup, prompt construction, generation and persistence
//!   into the generate-or-fetch use case.
//! - Coalesce concurrent work per (repository, kind) unit.

pub mod diagram_service;
pub mod single_flight;
