//! Configuration structures for the queue models
//!
//! This module contains the model configuration structure and validation logic
//! used to build a queue discipline and to drive post-run transient analysis.

use super::DisciplineKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default values shared by the config file layer and the CLI
pub mod defaults {
    /// Confidence level used for observation intervals
    pub const CONFIDENCE_LEVEL: f64 = 0.95;

    /// Number of batches for batch-means transient detection
    pub const NUM_BATCHES: usize = 20;

    /// Relative-error threshold below which a suffix mean counts as stable
    pub const TRANSIENT_THRESHOLD: f64 = 0.05;

    /// Number of consecutive stable batches required
    pub const TRANSIENT_PATIENCE: usize = 3;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "queue-kpi-simulator",
    version = "0.1.0",
    about = "Queue KPI Simulator - Replays arrival traces through a queue discipline",
    long_about = "Replays a trace of arrival timestamps and service durations through a FIFO, priority or finite-capacity queue and reports time-weighted and per-observation KPIs together with a batch-means warm-up estimate.

EXAMPLES:
    # Replay a scenario with its embedded configuration
    queue-kpi-simulator --scenario call-center.json

    # Override the discipline and number of servers
    queue-kpi-simulator --scenario call-center.json --discipline priority --capacity 3

    # Generate configuration template
    queue-kpi-simulator --print-config > my-config.json

    # Validate configuration without running
    queue-kpi-simulator --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. The scenario file's embedded configuration
    4. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Scenario file with the arrival trace to replay
    #[arg(short, long, help = "Scenario file (JSON) with the arrival trace to replay")]
    pub scenario: Option<String>,

    /// Queue discipline
    #[arg(
        long,
        help = "Queue discipline (fifo, priority, finite_capacity)",
        long_help = "Queue discipline governing waiting-line order and admission. Supported: fifo, priority, finite_capacity. Default: fifo"
    )]
    pub discipline: Option<String>,

    /// Number of parallel servers
    #[arg(long, help = "Number of parallel servers")]
    pub capacity: Option<usize>,

    /// Maximum waiting-line length (finite_capacity only)
    #[arg(long, help = "Maximum waiting-line length (finite_capacity only)")]
    pub queue_capacity: Option<usize>,

    /// Simulation start time
    #[arg(long, help = "Simulation start time")]
    pub start_time: Option<f64>,

    /// Simulation end time used for KPI reduction
    #[arg(
        long,
        help = "Simulation end time",
        long_help = "Time at which KPIs are reduced. Defaults to the time of the last replayed event."
    )]
    pub end_time: Option<f64>,

    /// Confidence level for observation intervals
    #[arg(long, help = "Confidence level for intervals (only 0.95 is exact)")]
    pub confidence_level: Option<f64>,

    /// Number of batches for transient detection
    #[arg(long, help = "Number of batches for warm-up detection")]
    pub num_batches: Option<usize>,

    /// Relative error threshold for transient detection
    #[arg(long, help = "Relative error threshold for warm-up detection")]
    pub transient_threshold: Option<f64>,

    /// Consecutive stable batches required for transient detection
    #[arg(long, help = "Consecutive stable batches required for warm-up detection")]
    pub patience: Option<usize>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, help = "Write the JSON report to this file")]
    pub output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without replaying
    #[arg(long, help = "Validate configuration without replaying the scenario")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Parameters of the batch-means warm-up heuristic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TransientConfig {
    /// Number of contiguous batches the observation sequence is split into
    pub num_batches: usize,
    /// Relative error threshold
    pub threshold: f64,
    /// Length of the stability window, in batches
    pub patience: usize,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            num_batches: defaults::NUM_BATCHES,
            threshold: defaults::TRANSIENT_THRESHOLD,
            patience: defaults::TRANSIENT_PATIENCE,
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Queue discipline
    pub discipline: Option<DisciplineKind>,

    /// Number of parallel servers
    pub capacity: Option<usize>,

    /// Maximum waiting-line length (finite capacity only)
    pub queue_capacity: Option<usize>,

    /// Simulation start time
    pub start_time: Option<f64>,

    /// Simulation end time
    pub end_time: Option<f64>,

    /// Confidence level for observation intervals
    pub confidence_level: Option<f64>,

    /// Warm-up detection parameters
    pub transient: Option<TransientConfig>,
}

/// Configuration for a single queue model run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Queue discipline
    pub discipline: DisciplineKind,

    /// Number of parallel servers
    pub capacity: usize,

    /// Maximum waiting-line length (required for finite capacity)
    pub queue_capacity: Option<usize>,

    /// Simulation start time
    pub start_time: f64,

    /// Simulation end time; `None` lets the driver use its last event time
    pub end_time: Option<f64>,

    /// Confidence level for observation intervals
    pub confidence_level: f64,

    /// Warm-up detection parameters
    pub transient: TransientConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// Unknown discipline name on the command line
    #[error("{0}")]
    UnknownDiscipline(String),
}

/// Validation errors for model configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Server count is invalid
    #[error("Capacity must be greater than 0, got {0}")]
    InvalidCapacity(usize),

    /// Finite capacity discipline without a queue bound
    #[error("Discipline {0} requires queue_capacity")]
    MissingQueueCapacity(DisciplineKind),

    /// A time value is NaN or infinite
    #[error("Invalid {field}: {value} (must be finite)")]
    NonFiniteTime {
        /// Name of the offending field
        field: String,
        /// The offending value
        value: f64,
    },

    /// End time does not follow start time
    #[error("Invalid time window: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeWindow {
        /// Configured start time
        start: f64,
        /// Configured end time
        end: f64,
    },

    /// Confidence level outside (0, 1)
    #[error("Confidence level must be between 0.0 and 1.0 (exclusive), got {0}")]
    InvalidConfidenceLevel(f64),

    /// Zero batches requested
    #[error("Number of batches must be greater than 0, got {0}")]
    InvalidBatchCount(usize),

    /// Non-positive relative error threshold
    #[error("Transient threshold must be greater than 0, got {0}")]
    InvalidThreshold(f64),

    /// Zero-length stability window
    #[error("Transient patience must be greater than 0, got {0}")]
    InvalidPatience(usize),
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            discipline: DisciplineKind::Fifo,
            capacity: 1,
            queue_capacity: None,
            start_time: 0.0,
            end_time: None,
            confidence_level: defaults::CONFIDENCE_LEVEL,
            transient: TransientConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments on top of the defaults
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        Self::from_cli_args_with_base(args, Self::default())
    }

    /// Create configuration from parsed CLI arguments on top of `base`
    ///
    /// A `--config` file replaces `base` before the CLI overrides apply.
    pub fn from_cli_args_with_base(args: CliArgs, base: Self) -> Result<Self, ConfigError> {
        let mut config = base;

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        Self::apply_cli_overrides(&mut config, args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    pub fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            discipline: config_file.discipline.unwrap_or(defaults.discipline),
            capacity: config_file.capacity.unwrap_or(defaults.capacity),
            queue_capacity: config_file.queue_capacity.or(defaults.queue_capacity),
            start_time: config_file.start_time.unwrap_or(defaults.start_time),
            end_time: config_file.end_time.or(defaults.end_time),
            confidence_level: config_file
                .confidence_level
                .unwrap_or(defaults.confidence_level),
            transient: config_file.transient.unwrap_or(defaults.transient),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) -> Result<(), ConfigError> {
        if let Some(value) = args.discipline {
            config.discipline = value.parse().map_err(ConfigError::UnknownDiscipline)?;
        }
        if let Some(value) = args.capacity {
            config.capacity = value;
        }
        if let Some(value) = args.queue_capacity {
            config.queue_capacity = Some(value);
        }
        if let Some(value) = args.start_time {
            config.start_time = value;
        }
        if let Some(value) = args.end_time {
            config.end_time = Some(value);
        }
        if let Some(value) = args.confidence_level {
            config.confidence_level = value;
        }
        if let Some(value) = args.num_batches {
            config.transient.num_batches = value;
        }
        if let Some(value) = args.transient_threshold {
            config.transient.threshold = value;
        }
        if let Some(value) = args.patience {
            config.transient.patience = value;
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.capacity == 0 {
            return Err(ConfigValidationError::InvalidCapacity(self.capacity));
        }

        if self.discipline == DisciplineKind::FiniteCapacity && self.queue_capacity.is_none() {
            return Err(ConfigValidationError::MissingQueueCapacity(self.discipline));
        }

        self.validate_finite("start_time", self.start_time)?;
        if let Some(end) = self.end_time {
            self.validate_finite("end_time", end)?;
            if end <= self.start_time {
                return Err(ConfigValidationError::InvalidTimeWindow {
                    start: self.start_time,
                    end,
                });
            }
        }

        if !(0.0..1.0).contains(&self.confidence_level) || self.confidence_level == 0.0 {
            return Err(ConfigValidationError::InvalidConfidenceLevel(self.confidence_level));
        }

        if self.transient.num_batches == 0 {
            return Err(ConfigValidationError::InvalidBatchCount(self.transient.num_batches));
        }
        if self.transient.threshold.is_nan() || self.transient.threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(self.transient.threshold));
        }
        if self.transient.patience == 0 {
            return Err(ConfigValidationError::InvalidPatience(self.transient.patience));
        }

        Ok(())
    }

    /// Helper method to validate time values
    fn validate_finite(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() {
            return Err(ConfigValidationError::NonFiniteTime { field: field.to_string(), value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs::try_parse_from(["test"]).unwrap()
    }

    #[test]
    fn test_model_config_default() {
        let config = ModelConfig::default();

        assert_eq!(config.discipline, DisciplineKind::Fifo);
        assert_eq!(config.capacity, 1);
        assert!(config.queue_capacity.is_none());
        assert_eq!(config.start_time, 0.0);
        assert!(config.end_time.is_none());
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.transient.num_batches, 20);
        assert_eq!(config.transient.patience, 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::try_parse_from([
            "test",
            "--discipline",
            "finite_capacity",
            "--capacity",
            "3",
            "--queue-capacity",
            "5",
            "--end-time",
            "480",
            "--num-batches",
            "10",
        ])
        .unwrap();

        let config = ModelConfig::from_cli_args(args).unwrap();
        assert_eq!(config.discipline, DisciplineKind::FiniteCapacity);
        assert_eq!(config.capacity, 3);
        assert_eq!(config.queue_capacity, Some(5));
        assert_eq!(config.end_time, Some(480.0));
        assert_eq!(config.transient.num_batches, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_discipline_rejected() {
        let args = CliArgs::try_parse_from(["test", "--discipline", "lifo"]).unwrap();
        let result = ModelConfig::from_cli_args(args);
        assert!(matches!(result, Err(ConfigError::UnknownDiscipline(_))));
    }

    #[test]
    fn test_base_config_is_kept_without_overrides() {
        let base = ModelConfig { capacity: 4, ..Default::default() };
        let config = ModelConfig::from_cli_args_with_base(empty_args(), base.clone()).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "discipline": "priority",
            "capacity": 2,
            "start_time": 10.0,
            "transient": { "num_batches": 8, "threshold": 0.1, "patience": 2 }
        }"#;

        temp_file.write_all(config_json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ModelConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.discipline, DisciplineKind::Priority);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.start_time, 10.0);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.transient.num_batches, 8);
        assert_eq!(config.transient.patience, 2);
    }

    #[test]
    fn test_config_file_errors() {
        let missing = ModelConfig::from_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        let temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let unsupported = ModelConfig::from_file(temp_file.path());
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validation_errors() {
        let config = ModelConfig { capacity: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidCapacity(0)));

        let config =
            ModelConfig { discipline: DisciplineKind::FiniteCapacity, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingQueueCapacity(DisciplineKind::FiniteCapacity))
        ));

        let config = ModelConfig { start_time: 5.0, end_time: Some(5.0), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeWindow { .. })
        ));

        let config = ModelConfig { start_time: f64::NAN, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::NonFiniteTime { .. })));

        let config = ModelConfig { confidence_level: 1.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidConfidenceLevel(_))
        ));

        let mut config = ModelConfig::default();
        config.transient.patience = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidPatience(0)));
    }

    #[test]
    fn test_print_json_round_trip() {
        let config = ModelConfig {
            discipline: DisciplineKind::FiniteCapacity,
            queue_capacity: Some(4),
            ..Default::default()
        };
        let json = config.print_json().unwrap();
        assert!(json.contains("finite_capacity"));
        let parsed: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
