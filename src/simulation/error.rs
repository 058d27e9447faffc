//! Error types and handling
//!
//! This module contains the error taxonomy shared by the queue disciplines,
//! the measurement engine and the transient analysis.
//!
//! Construction errors and contract violations propagate to the caller.
//! Degenerate measurement inputs never reach this type: they are absorbed by
//! the measurement layer and reported as placeholder values.

use thiserror::Error;

use crate::types::{ConfigError, ConfigValidationError, EntityId};

/// Errors that can occur while building or driving a queue model
#[derive(Debug, Error)]
pub enum QueueError {
    /// Server count must be positive
    #[error("Capacity must be a positive integer, got {0}")]
    InvalidCapacity(i64),

    /// Waiting-line bound must be non-negative
    #[error("Queue capacity must be a non-negative integer, got {0}")]
    InvalidQueueCapacity(i64),

    /// Release of an entity that is not occupying a server
    #[error("Cannot release entity {entity}: not found in the active set")]
    InvalidRelease {
        /// Entity the driver tried to release
        entity: EntityId,
    },

    /// Priority discipline received an entity without a priority
    #[error("Entity {entity} has no priority attribute")]
    MissingPriority {
        /// Entity missing the attribute
        entity: EntityId,
    },

    /// Fewer observations than requested batches
    #[error("Insufficient data for transient analysis: {available} observations for {required} batches")]
    InsufficientData {
        /// Number of observations available
        available: usize,
        /// Number of batches requested
        required: usize,
    },

    /// Zero batches requested
    #[error("Number of batches must be greater than 0")]
    InvalidBatchCount,

    /// Arrival trace entry that cannot be replayed
    #[error("Invalid arrival #{index}: {reason}")]
    InvalidTrace {
        /// Position of the record in the trace
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration failed validation
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ConfigValidationError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl QueueError {
    /// Create a release error for `entity`
    pub fn invalid_release(entity: EntityId) -> Self {
        Self::InvalidRelease { entity }
    }

    /// Create a missing-priority error for `entity`
    pub fn missing_priority(entity: EntityId) -> Self {
        Self::MissingPriority { entity }
    }

    /// Create a trace error for the record at `index`
    pub fn invalid_trace(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTrace { index, reason: reason.into() }
    }

    /// Create an insufficient-data error
    pub fn insufficient_data(available: usize, required: usize) -> Self {
        Self::InsufficientData { available, required }
    }

    /// Check if the caller can degrade gracefully instead of aborting
    ///
    /// Construction errors and driver contract violations are fatal.
    pub fn is_recoverable(&self) -> bool {
        match self {
            QueueError::InvalidCapacity(_) => false,
            QueueError::InvalidQueueCapacity(_) => false,
            QueueError::InvalidRelease { .. } => false,
            QueueError::MissingPriority { .. } => false,
            QueueError::InsufficientData { .. } => true,
            QueueError::InvalidBatchCount => false,
            QueueError::InvalidTrace { .. } => false,
            QueueError::Config(_) => false,
            QueueError::Validation(_) => false,
            QueueError::IoError(_) => true,
            QueueError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            QueueError::InvalidCapacity(_) | QueueError::InvalidQueueCapacity(_) => "Construction",
            QueueError::InvalidRelease { .. } | QueueError::MissingPriority { .. } => {
                "Contract Violation"
            }
            QueueError::InsufficientData { .. } | QueueError::InvalidBatchCount => {
                "Transient Analysis"
            }
            QueueError::InvalidTrace { .. } => "Scenario",
            QueueError::Config(_) | QueueError::Validation(_) => "Configuration",
            QueueError::IoError(_) => "IO",
            QueueError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for queue model operations
pub type QueueResult<T> = Result<T, QueueError>;
