//! KPI report structures
//!
//! The field names of these structures are the external contract consumed by
//! plotting and reporting tools, so they are serialized verbatim.

use ordered_float::OrderedFloat;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::ObservationSummary;

/// Result of a KPI reduction
///
/// Serializes either as the grouped report or as `{"error": "..."}` when no
/// statistics could be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KpiReport {
    /// Statistics were computed
    Complete(Box<KpiSnapshot>),
    /// The reduction was skipped; `error` says why
    Unavailable {
        /// Diagnostic message
        error: String,
    },
}

impl KpiReport {
    /// Create an error-tagged report
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self::Unavailable { error: error.into() }
    }

    /// Whether statistics were computed
    pub fn is_complete(&self) -> bool {
        matches!(self, KpiReport::Complete(_))
    }

    /// The computed statistics, if any
    pub fn snapshot(&self) -> Option<&KpiSnapshot> {
        match self {
            KpiReport::Complete(snapshot) => Some(snapshot),
            KpiReport::Unavailable { .. } => None,
        }
    }

    /// Mutable access to the computed statistics, if any
    pub fn snapshot_mut(&mut self) -> Option<&mut KpiSnapshot> {
        match self {
            KpiReport::Complete(snapshot) => Some(snapshot),
            KpiReport::Unavailable { .. } => None,
        }
    }

    /// The diagnostic message of an unavailable report
    pub fn error(&self) -> Option<&str> {
        match self {
            KpiReport::Complete(_) => None,
            KpiReport::Unavailable { error } => Some(error),
        }
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Grouped KPI values of one measurement run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    /// Run window and configuration
    pub simulation_summary: SimulationSummary,
    /// Counters and derived ratios
    pub arrivals_and_throughput: ArrivalsAndThroughput,
    /// Time spent waiting before service
    pub wait_time: ObservationSummary,
    /// Time spent in service
    pub service_time: ObservationSummary,
    /// Time from arrival to departure
    pub system_time: ObservationSummary,
    /// Waiting-line length statistics
    pub queue_length: QueueLengthKpis,
    /// Server occupancy statistics
    pub server_utilization: ServerUtilizationKpis,
    /// Per-priority reports of a priority queue
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_breakdown"
    )]
    pub priority_breakdown: Option<BTreeMap<OrderedFloat<f64>, KpiReport>>,
}

/// Write priority keys in their shortest decimal form (`2`, `1.5`)
fn serialize_breakdown<S>(
    breakdown: &Option<BTreeMap<OrderedFloat<f64>, KpiReport>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match breakdown {
        Some(classes) => {
            let mut map = serializer.serialize_map(Some(classes.len()))?;
            for (priority, report) in classes {
                map.serialize_entry(&priority.0.to_string(), report)?;
            }
            map.end()
        }
        None => serializer.serialize_none(),
    }
}

/// Run window and configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Time the measurement started
    pub start_time: f64,
    /// Time the reduction was taken at
    pub end_time: f64,
    /// `end_time - start_time`
    pub total_duration: f64,
    /// Number of parallel servers
    #[serde(rename = "total_capacity")]
    pub capacity: usize,
}

/// Counters and derived ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArrivalsAndThroughput {
    /// Number of requests
    pub total_arrivals: u64,
    /// Number of completed services
    pub total_served: u64,
    /// Number of arrivals that had to wait
    #[serde(rename = "total_who_waited")]
    pub total_waited: u64,
    /// `total_waited / total_arrivals`
    pub probability_of_waiting: f64,
    /// Completed services per unit of time
    pub throughput_rate: f64,
    /// Balking statistics, present only for a finite-capacity queue
    #[serde(flatten)]
    pub rejection: Option<RejectionKpis>,
}

/// Waiting-line length statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueLengthKpis {
    /// Time-weighted average number waiting
    pub time_weighted_average: f64,
    /// Largest waiting-line length ever logged
    pub max_observed: usize,
}

/// Server occupancy statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServerUtilizationKpis {
    /// Time-weighted average number of busy servers
    #[serde(rename = "time_weighted_average_busy_servers")]
    pub average_busy_servers: f64,
    /// `average_busy_servers / capacity`, as a fraction in `[0, 1]`
    #[serde(rename = "average_utilization_percentage")]
    pub utilization: f64,
}

/// Balking statistics of a finite-capacity queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RejectionKpis {
    /// Number of arrivals turned away
    pub total_rejections: u64,
    /// `total_rejections / total_arrivals`
    pub probability_of_rejection: f64,
}

impl RejectionKpis {
    /// Build from raw counters; the probability is 0 without arrivals
    pub fn new(total_rejections: u64, total_arrivals: u64) -> Self {
        let probability_of_rejection = if total_arrivals == 0 {
            0.0
        } else {
            total_rejections as f64 / total_arrivals as f64
        };
        Self { total_rejections, probability_of_rejection }
    }
}
