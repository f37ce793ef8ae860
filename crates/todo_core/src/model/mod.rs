//! Domain model for the task store.
//!
//! # Responsibility
//! - Define the canonical task record shared by all backends and the service.
//!
//! # Invariants
//! - Every stored task is identified by a backend-assigned positive `TaskId`.
//! - Deletion is permanent; there are no tombstones.

pub mod task;
