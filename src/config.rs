//! Application configuration loaded from environment variables.
//!
//! All settings are read once at startup; aggregation conventions (week
//! start, distance bands) live here so no handler hard-codes them.

use std::env;
use std::path::PathBuf;

use chrono::Weekday;

/// Default distance-band breakpoints, in the run's own unit.
const DEFAULT_DISTANCE_BANDS: [f64; 4] = [4.0, 5.0, 6.0, 7.0];

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS and cookie attributes
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory holding the JSON collection files
    pub data_dir: PathBuf,
    /// First day of the week for weekly buckets
    pub week_start: Weekday,
    /// Distance-band breakpoints (ascending) for run classification
    pub distance_bands: Vec<f64>,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            week_start: Weekday::Mon,
            distance_bands: DEFAULT_DISTANCE_BANDS.to_vec(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, values can be set via a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let week_start = match env::var("WEEK_START") {
            Ok(raw) => raw
                .parse::<Weekday>()
                .map_err(|_| ConfigError::Invalid("WEEK_START", raw))?,
            Err(_) => Weekday::Mon,
        };

        let distance_bands = match env::var("DISTANCE_BANDS") {
            Ok(raw) => parse_distance_bands(&raw)
                .ok_or(ConfigError::Invalid("DISTANCE_BANDS", raw))?,
            Err(_) => DEFAULT_DISTANCE_BANDS.to_vec(),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            week_start,
            distance_bands,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests; point `data_dir` at a temp dir before use.
    pub fn test_default() -> Self {
        Self::default()
    }
}

/// Parse a comma-separated list of ascending positive breakpoints.
fn parse_distance_bands(raw: &str) -> Option<Vec<f64>> {
    let bands: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    let ascending = bands.windows(2).all(|pair| pair[0] < pair[1]);
    if bands.is_empty() || !ascending || bands[0] <= 0.0 {
        return None;
    }
    Some(bands)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
