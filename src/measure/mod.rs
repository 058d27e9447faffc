//! Event-sourced KPI measurement
//!
//! A [`Measure`] is a passive, append-only recorder. Disciplines forward
//! every state change to it through the `log_*` methods during a run, and
//! the driver asks for a reduction with [`Measure::get_final_kpis`] once the
//! run is over. A measure holds no reference back to the discipline that
//! feeds it.
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::measure::Measure;
//!
//! let mut measure = Measure::new(1, 0.0);
//! measure.log_arrival(0.0);
//! measure.log_service_start(0.0, 0.0, 0, 1);
//! measure.log_service_end(4.0, 4.0, 4.0, 0);
//!
//! let report = measure.get_final_kpis(10.0);
//! let snapshot = report.snapshot().unwrap();
//! assert_eq!(snapshot.arrivals_and_throughput.total_served, 1);
//! assert!((snapshot.server_utilization.utilization - 0.4).abs() < 1e-12);
//! ```

pub mod report;
pub mod statistics;

pub use report::*;
pub use statistics::*;

use tracing::{debug, warn};

use crate::types::defaults;

/// Append-only recorder of queue observations and time series
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    capacity: usize,
    start_time: f64,
    last_update_time: f64,
    wait_times: Vec<f64>,
    service_times: Vec<f64>,
    system_times: Vec<f64>,
    queue_length_log: Vec<(f64, usize)>,
    server_busy_log: Vec<(f64, usize)>,
    total_arrivals: u64,
    total_waited: u64,
    total_served: u64,
}

impl Measure {
    /// Create a measure for `capacity` servers starting at `start_time`
    ///
    /// Both time-series logs are seeded with `(start_time, 0)`.
    /// A zero `capacity` is accepted, but utilization then reports 0.
    pub fn new(capacity: usize, start_time: f64) -> Self {
        if capacity == 0 {
            warn!(start_time, "Measure created with zero capacity, utilization will report 0");
        }
        debug!(capacity, start_time, "Measure initialized");
        Self {
            capacity,
            start_time,
            last_update_time: start_time,
            wait_times: Vec::new(),
            service_times: Vec::new(),
            system_times: Vec::new(),
            queue_length_log: vec![(start_time, 0)],
            server_busy_log: vec![(start_time, 0)],
            total_arrivals: 0,
            total_waited: 0,
            total_served: 0,
        }
    }

    fn touch(&mut self, time: f64) {
        if time > self.last_update_time {
            self.last_update_time = time;
        }
    }

    /// Record an arrival
    pub fn log_arrival(&mut self, time: f64) {
        self.touch(time);
        self.total_arrivals += 1;
        debug!(time, total_arrivals = self.total_arrivals, "Arrival logged");
    }

    /// Record an entity joining the waiting line, which now holds `queue_length`
    pub fn log_queue_entry(&mut self, time: f64, queue_length: usize) {
        self.touch(time);
        self.total_waited += 1;
        self.queue_length_log.push((time, queue_length));
        debug!(time, queue_length, "Queue entry logged");
    }

    /// Record a service start after `wait_time` in the waiting line
    pub fn log_service_start(
        &mut self,
        time: f64,
        wait_time: f64,
        queue_length: usize,
        busy_servers: usize,
    ) {
        self.touch(time);
        self.wait_times.push(wait_time);
        self.queue_length_log.push((time, queue_length));
        self.server_busy_log.push((time, busy_servers));
        debug!(time, wait_time, queue_length, busy_servers, "Service start logged");
    }

    /// Record a service completion
    pub fn log_service_end(
        &mut self,
        time: f64,
        service_time: f64,
        system_time: f64,
        busy_servers: usize,
    ) {
        self.touch(time);
        self.service_times.push(service_time);
        self.system_times.push(system_time);
        self.total_served += 1;
        self.server_busy_log.push((time, busy_servers));
        debug!(time, service_time, system_time, busy_servers, "Service end logged");
    }

    /// Reduce the recorded data at the default 95% confidence level
    pub fn get_final_kpis(&self, end_time: f64) -> KpiReport {
        self.get_final_kpis_at(end_time, defaults::CONFIDENCE_LEVEL)
    }

    /// Reduce the recorded data, summarizing observations at `confidence_level`
    ///
    /// Returns [`KpiReport::Unavailable`] when `end_time` does not lie after
    /// the start time.
    pub fn get_final_kpis_at(&self, end_time: f64, confidence_level: f64) -> KpiReport {
        let total_duration = end_time - self.start_time;
        if total_duration <= 0.0 {
            warn!(
                start_time = self.start_time,
                end_time, "Simulation duration is not positive; no KPIs computed"
            );
            return KpiReport::unavailable(format!(
                "Total simulation duration must be positive (start {}, end {})",
                self.start_time, end_time
            ));
        }

        let average_busy_servers =
            time_weighted_average(&self.server_busy_log, end_time, total_duration);
        let utilization = if self.capacity == 0 {
            0.0
        } else {
            average_busy_servers / self.capacity as f64
        };
        let probability_of_waiting = if self.total_arrivals == 0 {
            0.0
        } else {
            self.total_waited as f64 / self.total_arrivals as f64
        };

        KpiReport::Complete(Box::new(KpiSnapshot {
            simulation_summary: SimulationSummary {
                start_time: self.start_time,
                end_time,
                total_duration,
                capacity: self.capacity,
            },
            arrivals_and_throughput: ArrivalsAndThroughput {
                total_arrivals: self.total_arrivals,
                total_served: self.total_served,
                total_waited: self.total_waited,
                probability_of_waiting,
                throughput_rate: self.total_served as f64 / total_duration,
                rejection: None,
            },
            wait_time: ObservationSummary::from_samples(&self.wait_times, confidence_level),
            service_time: ObservationSummary::from_samples(&self.service_times, confidence_level),
            system_time: ObservationSummary::from_samples(&self.system_times, confidence_level),
            queue_length: QueueLengthKpis {
                time_weighted_average: time_weighted_average(
                    &self.queue_length_log,
                    end_time,
                    total_duration,
                ),
                max_observed: self.max_queue_length(),
            },
            server_utilization: ServerUtilizationKpis { average_busy_servers, utilization },
            priority_breakdown: None,
        }))
    }

    /// Largest waiting-line length ever logged
    pub fn max_queue_length(&self) -> usize {
        self.queue_length_log.iter().map(|&(_, len)| len).max().unwrap_or(0)
    }

    /// Number of parallel servers
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Time the measurement started
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Latest timestamp seen by any `log_*` call
    pub fn last_update_time(&self) -> f64 {
        self.last_update_time
    }

    /// Recorded waiting times, in service-start order
    pub fn wait_times(&self) -> &[f64] {
        &self.wait_times
    }

    /// Recorded service times, in departure order
    pub fn service_times(&self) -> &[f64] {
        &self.service_times
    }

    /// Recorded system times, in departure order
    pub fn system_times(&self) -> &[f64] {
        &self.system_times
    }

    /// `(timestamp, waiting-line length)` step log
    pub fn queue_length_log(&self) -> &[(f64, usize)] {
        &self.queue_length_log
    }

    /// `(timestamp, busy servers)` step log
    pub fn server_busy_log(&self) -> &[(f64, usize)] {
        &self.server_busy_log
    }

    /// Number of arrivals logged
    pub fn total_arrivals(&self) -> u64 {
        self.total_arrivals
    }

    /// Number of arrivals that joined the waiting line
    pub fn total_waited(&self) -> u64 {
        self.total_waited
    }

    /// Number of completed services
    pub fn total_served(&self) -> u64 {
        self.total_served
    }
}
