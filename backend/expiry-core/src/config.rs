// src/config.rs
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

use expiry_core::ThresholdPolicy;

use crate::error::AppError;

// Monitored fields as they appear in the employee records.
pub const FIELD_CONTRACT_END: &str = "kontrak_akhir";
pub const FIELD_MCU: &str = "akhir_mcu";
pub const FIELD_HSE_PASSPORT: &str = "akhir_hsepassport";
pub const FIELD_SIM: &str = "akhir_siml";

const CONTRACT_BANDS: [(&str, u32); 3] = [("Critical", 14), ("Warning", 30), ("Notice", 45)];
const COMPLIANCE_BANDS: [(&str, u32); 3] = [("Critical", 30), ("Warning", 60), ("Notice", 90)];

fn default_field() -> String {
    FIELD_CONTRACT_END.to_string()
}

fn default_log() -> String {
    "info".to_string()
}

/// Settings read from `EXPIRY_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Default monitored field (`EXPIRY_FIELD`).
    #[serde(default = "default_field")]
    pub field: String,
    /// JSON file of extra or overriding policies (`EXPIRY_POLICY_FILE`).
    #[serde(default)]
    pub policy_file: Option<PathBuf>,
    /// Tracing filter directive (`EXPIRY_LOG`).
    #[serde(default = "default_log")]
    pub log: String,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("EXPIRY_").from_iter(vars)
    }
}

/// Policies for the four fields the HR dashboards monitor.
pub fn builtin_policies() -> Result<HashMap<String, ThresholdPolicy>, AppError> {
    let mut policies = HashMap::new();
    policies.insert(
        FIELD_CONTRACT_END.to_string(),
        ThresholdPolicy::from_pairs(&CONTRACT_BANDS)?,
    );
    for field in [FIELD_MCU, FIELD_HSE_PASSPORT, FIELD_SIM] {
        policies.insert(
            field.to_string(),
            ThresholdPolicy::from_pairs(&COMPLIANCE_BANDS)?,
        );
    }
    Ok(policies)
}

/// Built-in policies, with entries from `policy_file` added or replacing them.
///
/// The file maps field names to band lists, e.g.
/// `{"akhir_mcu": [{"name": "Critical", "max_days": 30}]}`. Each list is
/// validated while it is read.
pub fn load_policies(
    policy_file: Option<&Path>,
) -> Result<HashMap<String, ThresholdPolicy>, AppError> {
    let mut policies = builtin_policies()?;
    if let Some(path) = policy_file {
        let reader = BufReader::new(File::open(path)?);
        let overrides: HashMap<String, ThresholdPolicy> = serde_json::from_reader(reader)?;
        info!(
            "Loaded {} threshold policies from {}",
            overrides.len(),
            path.display()
        );
        policies.extend(overrides);
    }
    Ok(policies)
}
