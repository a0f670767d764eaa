pub mod cli;
pub mod toml_config;

use crate::core::engine::EngineSettings;
use crate::domain::model::AssessmentRequest;
use crate::domain::ports::ConfigProvider;
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::core::fetcher::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECONDS};
#[cfg(feature = "cli")]
use crate::domain::model::{MAX_RADIUS_METERS, MIN_RADIUS_METERS};
#[cfg(feature = "cli")]
use crate::utils::error::{Result, ScoutError};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

/// 上游 API 的連線設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl ConfigProvider for SourceSettings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

/// 解析完成、可直接執行的一次評估
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub request: AssessmentRequest,
    pub source: SourceSettings,
    pub engine: EngineSettings,
    pub output_path: String,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "site-scout")]
#[command(about = "Location intelligence scoring for retail site selection")]
pub struct CliConfig {
    #[arg(long, default_value = "Bangalore")]
    pub city: String,

    #[arg(
        long,
        default_value = "salon",
        help = "Business category to assess (counted as competitors)"
    )]
    pub category: String,

    #[arg(long, default_value = "1500", help = "Catchment radius in meters (500-3000)")]
    pub radius: u32,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the places search endpoint")]
    pub endpoint: Option<String>,

    #[arg(
        long,
        help = "Mappls REST key; falls back to the MAPPLS_KEY environment variable"
    )]
    pub api_key: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Report process stats after the run")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("city", &self.city)?;
        validation::validate_non_empty_string("category", &self.category)?;
        validation::validate_range("radius", self.radius, MIN_RADIUS_METERS, MAX_RADIUS_METERS)?;
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(endpoint) = &self.endpoint {
            validation::validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併 CLI 旗標、TOML 檔與環境變數，產出執行計畫
    pub fn into_plan(self) -> Result<RunPlan> {
        let file_config = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let cities = file_config
            .as_ref()
            .and_then(|c| c.cities.clone())
            .unwrap_or_else(toml_config::default_cities);
        let coord = cities.get(&self.city).copied().ok_or_else(|| {
            let mut known: Vec<&str> = cities.keys().map(String::as_str).collect();
            known.sort_unstable();
            ScoutError::InvalidConfigValueError {
                field: "city".to_string(),
                value: self.city.clone(),
                reason: format!("Unknown city, known cities: {}", known.join(", ")),
            }
        })?;

        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| {
                file_config
                    .as_ref()
                    .and_then(|c| c.source.as_ref())
                    .and_then(|s| s.endpoint.clone())
            })
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validation::validate_url("endpoint", &endpoint)?;

        let timeout_seconds = file_config
            .as_ref()
            .and_then(|c| c.source.as_ref())
            .and_then(|s| s.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        // 金鑰：CLI 優先，其次 MAPPLS_KEY 環境變數
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("MAPPLS_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ScoutError::MissingConfigError {
                field: "api_key (MAPPLS_KEY)".to_string(),
            })?;

        let mut engine = EngineSettings::default();
        if let Some(scoring) = file_config.as_ref().and_then(|c| c.scoring.as_ref()) {
            if let Some(weights) = scoring.weights {
                engine.weights = weights;
            }
            if let Some(demand) = scoring.demand_categories.clone() {
                engine.demand = demand;
            }
        }
        if let Some(load) = file_config.as_ref().and_then(|c| c.load.as_ref()) {
            if let Some(bundle_name) = &load.bundle_name {
                engine.bundle_name = bundle_name.clone();
            }
        }

        let request = AssessmentRequest::new(
            self.city,
            self.category,
            coord.latitude,
            coord.longitude,
            self.radius,
        )?;

        Ok(RunPlan {
            request,
            source: SourceSettings {
                endpoint,
                api_key,
                timeout_seconds,
            },
            engine,
            output_path: self.output_path,
        })
    }
}
