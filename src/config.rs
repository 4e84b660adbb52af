use crate::domain::Currency;
use crate::filter::DateRange;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub quote_currency: Currency,
    pub exchange_label: String,
    pub date_range: Option<DateRange>,
    pub export_pair_tables: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let input_dir = env_map
            .get("INPUT_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("INPUT_DIR".to_string()))?;

        let output_dir = PathBuf::from(
            env_map
                .get("OUTPUT_DIR")
                .map(|s| s.as_str())
                .unwrap_or("Output"),
        );

        let quote_currency = env_map
            .get("QUOTE_CURRENCY")
            .map(|s| s.trim())
            .unwrap_or("USDC");
        if quote_currency.is_empty() {
            return Err(ConfigError::InvalidValue(
                "QUOTE_CURRENCY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let quote_currency = Currency::new(quote_currency);

        let exchange_label = env_map
            .get("EXCHANGE_LABEL")
            .cloned()
            .unwrap_or_else(|| "dYdX".to_string());

        let date_range = parse_date_range_from_map(&env_map)?;

        let export_pair_tables = match env_map
            .get("EXPORT_PAIR_TABLES")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
            .unwrap_or("false")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "EXPORT_PAIR_TABLES".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            input_dir,
            output_dir,
            quote_currency,
            exchange_label,
            date_range,
            export_pair_tables,
        })
    }
}

fn parse_date(env_map: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), format!("must be YYYY-MM-DD, got {}", s))
            })
        })
        .transpose()
}

/// Both bounds or neither.
fn parse_date_range_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Option<DateRange>, ConfigError> {
    match (parse_date(env_map, "DATE_FROM")?, parse_date(env_map, "DATE_TO")?) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => DateRange::new(from, to).map(Some).ok_or_else(|| {
            ConfigError::InvalidValue(
                "DATE_FROM".to_string(),
                format!("{} is after DATE_TO {}", from, to),
            )
        }),
        (Some(_), None) => Err(ConfigError::MissingEnv("DATE_TO".to_string())),
        (None, Some(_)) => Err(ConfigError::MissingEnv("DATE_FROM".to_string())),
    }
}
