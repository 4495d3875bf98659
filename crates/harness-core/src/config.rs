use crate::frame::MAX_FRAME_DIMENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CYCLES_PER_TICK: usize = 1024;
pub const MIN_CYCLES_PER_TICK: usize = 1;
pub const MAX_CYCLES_PER_TICK: usize = 1 << 20;

pub const DEFAULT_DISPLAY_WIDTH: usize = 160;
pub const DEFAULT_DISPLAY_HEIGHT: usize = 128;
pub const DEFAULT_REFRESH_HZ: f64 = 60.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantumError {
    #[error("cycles per tick must be an integer, got {0:?}")]
    NotANumber(String),

    #[error("cycles per tick must be within 1..=1048576, got {0}")]
    OutOfRange(i64),
}

/// Number of cycles run per `drive` request.
///
/// Only ever built through the bounded constructors, so holding one means the
/// value is safe to hand to the machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CycleQuantum(usize);

impl CycleQuantum {
    pub fn from_integer(value: i64) -> Result<Self, QuantumError> {
        match usize::try_from(value) {
            Ok(cycles) if (MIN_CYCLES_PER_TICK..=MAX_CYCLES_PER_TICK).contains(&cycles) => {
                Ok(Self(cycles))
            }
            _ => Err(QuantumError::OutOfRange(value)),
        }
    }

    /// Strict decimal parsing of a user-entered value (surrounding whitespace allowed)
    pub fn parse(text: &str) -> Result<Self, QuantumError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            return Err(QuantumError::NotANumber(text.to_string()));
        }
        let value: i64 = trimmed
            .parse()
            .map_err(|_| QuantumError::NotANumber(text.to_string()))?;
        Self::from_integer(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for CycleQuantum {
    fn default() -> Self {
        Self(DEFAULT_CYCLES_PER_TICK)
    }
}

impl FromStr for CycleQuantum {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<i64> for CycleQuantum {
    type Error = QuantumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_integer(value)
    }
}

impl From<CycleQuantum> for i64 {
    fn from(quantum: CycleQuantum) -> i64 {
        quantum.0 as i64
    }
}

impl std::fmt::Display for CycleQuantum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    /// Window pixels per machine pixel
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_DISPLAY_WIDTH,
            height: DEFAULT_DISPLAY_HEIGHT,
            scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
    pub bootloader: String,
    pub disk: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            bootloader: "resources/bootloader.bin.gz".into(),
            disk: "resources/disk.img.gz".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub display: DisplayConfig,
    pub cycles_per_tick: CycleQuantum,
    /// Refresh cadence used when no display drives the render loop
    pub refresh_hz: f64,
    pub resources: ResourceConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            cycles_per_tick: CycleQuantum::default(),
            refresh_hz: DEFAULT_REFRESH_HZ,
            resources: ResourceConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display resolution {}x{} has a zero dimension",
                self.display.width, self.display.height
            )));
        }
        if self.display.width > MAX_FRAME_DIMENSION || self.display.height > MAX_FRAME_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "display resolution {}x{} exceeds {MAX_FRAME_DIMENSION} pixels per side",
                self.display.width, self.display.height
            )));
        }
        if !(self.display.scale.is_finite() && self.display.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "display scale must be positive, got {}",
                self.display.scale
            )));
        }
        if !(self.refresh_hz.is_finite() && self.refresh_hz > 0.0 && self.refresh_hz <= 1000.0) {
            return Err(ConfigError::Invalid(format!(
                "refresh rate must be within (0, 1000] Hz, got {}",
                self.refresh_hz
            )));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_hz)
    }
}
