//! Configuration loading for the command channels.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Which transport carries commands to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Serial,
    Web,
}

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    #[default]
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Serial stop bits, written as `1` or `2` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(try_from = "u8")]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl TryFrom<u8> for StopBits {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(format!("stop-bits must be 1 or 2, got {}", other)),
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Serial link parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SerialConfig {
    /// Device path or name, e.g. `/dev/ttyACM0` or `COM6`
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout while waiting for the `>>>` prompt
    pub timeout_ms: u64,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 115_200,
            timeout_ms: 1000,
            parity: Parity::Even,
            stop_bits: StopBits::One,
        }
    }
}

/// HTTP API parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WebConfig {
    /// Base URL of the board's web server (without endpoint suffix)
    pub base_url: String,
    /// Overall request timeout. `None` waits for the server indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.50.199:8080".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Startup configuration, passed by value into the channel constructors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AppConfig {
    pub transport: TransportKind,
    pub debug: bool,
    pub serial: SerialConfig,
    pub web: WebConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if the file was successfully loaded and parsed
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }
}
