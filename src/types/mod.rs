//! Core types and identifiers for the queue models
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the crate.
//!
//! # Overview
//!
//! - **Identifiers**: UUID-based unique identifiers for entities
//! - **Enums**: Entity lifecycle states, request outcomes, discipline kinds
//! - **Configuration**: Model configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::types::*;
//!
//! let id = EntityId::new();
//! assert!(id.to_string().starts_with("ENT_"));
//!
//! let config = ModelConfig {
//!     discipline: DisciplineKind::FiniteCapacity,
//!     capacity: 2,
//!     queue_capacity: Some(5),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
