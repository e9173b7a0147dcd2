//! Domain model for repositories and their cached diagram scripts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one record shape per repository for all diagram kinds.
//!
//! # Invariants
//! - Repository identity is owned by an external collaborator.
//! - At most one diagram record exists per repository id.

pub mod diagram;
pub mod repository;
