use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::device::rpc::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS};
use crate::hierarchy::element_model::DisplaySize;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "droid-locator",
    version,
    about = "Resolve screen coordinates on an Android device to stable UI-object locators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// uiautomator JSON-RPC server endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Append one JSON line per resolution to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: droid-locator.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Where the hierarchy comes from: a dump file, or the live device.
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Hierarchy dump XML file (default: query the device live)
    #[arg(long)]
    pub dump: Option<String>,

    /// Display width used to clip dump bounds
    #[arg(long)]
    pub width: Option<i32>,

    /// Display height used to clip dump bounds
    #[arg(long)]
    pub height: Option<i32>,
}

#[derive(Args, Debug, Clone)]
pub struct PointArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub x: i32,

    #[arg(long, allow_hyphen_values = true)]
    pub y: i32,

    /// Drop candidates whose center is 200px or more from the point
    #[arg(long)]
    pub ignore_distant: bool,

    /// Criterion as key=value (repeatable), e.g. -c clickable=true
    #[arg(short = 'c', long = "criteria")]
    pub criteria: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a point to a locator
    Resolve {
        #[command(flatten)]
        point: PointArgs,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Show the attributes of the element at a point
    Inspect {
        #[command(flatten)]
        point: PointArgs,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// List every element matching the criteria
    Query {
        /// Criterion as key=value (repeatable)
        #[arg(short = 'c', long = "criteria")]
        criteria: Vec<String>,

        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Fetch the live hierarchy dump from the device
    Dump {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `droid-locator.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("droid-locator.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "ignoring malformed config");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Settings (merge CLI args with config file)
// ============================================================================

/// Values every subcommand needs, after CLI > config > default precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub timeout: Duration,
    pub trace_path: Option<String>,
    pub display_width: Option<i32>,
    pub display_height: Option<i32>,
}

impl Settings {
    /// Display size for a dump, with per-command flags taking precedence.
    pub fn display_for(&self, snapshot: &SnapshotArgs) -> Option<DisplaySize> {
        let width = snapshot.width.or(self.display_width)?;
        let height = snapshot.height.or(self.display_height)?;
        Some(DisplaySize::new(width, height))
    }
}

pub fn build_settings(cli: &Cli, config: &AppConfig) -> Settings {
    Settings {
        endpoint: cli
            .endpoint
            .clone()
            .unwrap_or_else(|| config.device.endpoint.clone()),
        timeout: Duration::from_millis(config.device.timeout_ms),
        trace_path: cli.trace.clone().or_else(|| config.trace.path.clone()),
        display_width: config.display.width,
        display_height: config.display.height,
    }
}
