use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::directory::loader::{DataSource, DEFAULT_MAX_UPLOAD_SIZE};
use crate::errors::ConfigError;

pub const DEFAULT_MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub data_source: DataSource,
    pub fallback_path: Option<PathBuf>,
    pub source_timeout: Duration,
    pub max_data_upload_bytes: usize,
    pub image_policy: ImagePolicy,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImagePolicy {
    pub max_size_bytes: usize,
    pub allowed_types: Vec<String>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        ImagePolicy {
            max_size_bytes: DEFAULT_MAX_IMAGE_SIZE,
            allowed_types: SUPPORTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_source = match get("DATA_SOURCE").as_deref().unwrap_or("excel") {
            "excel" => DataSource::Excel {
                path: PathBuf::from(
                    get("EXCEL_FILE_PATH").unwrap_or_else(|| "data/EMPLOYEE_DIR.xlsx".to_string()),
                ),
            },
            "sheets" => {
                let raw = get("SHEETS_CSV_URL").ok_or(ConfigError::Missing("SHEETS_CSV_URL"))?;
                let url = Url::parse(&raw).map_err(|err| ConfigError::Invalid {
                    key: "SHEETS_CSV_URL",
                    reason: err.to_string(),
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::Invalid {
                        key: "SHEETS_CSV_URL",
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    });
                }
                DataSource::Sheets { url }
            }
            "csv" => DataSource::Csv {
                path: PathBuf::from(
                    get("CSV_FILE_PATH").ok_or(ConfigError::Missing("CSV_FILE_PATH"))?,
                ),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "DATA_SOURCE",
                    reason: format!("expected excel, sheets or csv, got '{}'", other),
                })
            }
        };

        // An explicitly empty FALLBACK_DATA_PATH disables the fallback.
        let fallback_path = match lookup("FALLBACK_DATA_PATH") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => Some(PathBuf::from("data/sample_employees.csv")),
        };

        let source_timeout = Duration::from_secs(parse_number(
            get("SOURCE_TIMEOUT_SECS"),
            "SOURCE_TIMEOUT_SECS",
            10,
        )?);

        let max_data_upload_bytes = parse_size(
            get("MAX_DATA_UPLOAD_BYTES"),
            "MAX_DATA_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_SIZE,
        )?;

        let max_size_bytes = parse_size(
            get("MAX_IMAGE_SIZE_BYTES"),
            "MAX_IMAGE_SIZE_BYTES",
            DEFAULT_MAX_IMAGE_SIZE,
        )?;

        let allowed_types = match get("ALLOWED_IMAGE_TYPES") {
            Some(raw) => parse_image_types(&raw)?,
            None => ImagePolicy::default().allowed_types,
        };

        Ok(Config {
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:8001".to_string()),
            data_source,
            fallback_path,
            source_timeout,
            max_data_upload_bytes,
            image_policy: ImagePolicy {
                max_size_bytes,
                allowed_types,
            },
            database_url: get("DATABASE_URL"),
        })
    }
}

fn parse_number(
    value: Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match value {
        Some(raw) => raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_size(
    value: Option<String>,
    key: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match value {
        Some(raw) => raw.parse::<usize>().map_err(|err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_image_types(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut types = Vec::new();
    for entry in raw.split(',').map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()) {
        if !SUPPORTED_IMAGE_TYPES.contains(&entry.as_str()) {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_IMAGE_TYPES",
                reason: format!("'{}' is not a supported image type", entry),
            });
        }
        types.push(entry);
    }
    if types.is_empty() {
        return Err(ConfigError::Invalid {
            key: "ALLOWED_IMAGE_TYPES",
            reason: "at least one image type is required".to_string(),
        });
    }
    Ok(types)
}
