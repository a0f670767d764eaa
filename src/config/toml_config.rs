use crate::core::engine::DemandCategories;
use crate::core::scorer::ScoreWeights;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceSection>,
    pub cities: Option<HashMap<String, CityCoord>>,
    pub scoring: Option<ScoringSection>,
    pub load: Option<LoadSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CityCoord {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSection {
    pub weights: Option<ScoreWeights>,
    pub demand_categories: Option<DemandCategories>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    pub bundle_name: Option<String>,
}

/// 內建城市座標表
pub fn default_cities() -> HashMap<String, CityCoord> {
    HashMap::from([
        (
            "Bangalore".to_string(),
            CityCoord {
                latitude: 12.9716,
                longitude: 77.5946,
            },
        ),
        (
            "Mumbai".to_string(),
            CityCoord {
                latitude: 19.0760,
                longitude: 72.8777,
            },
        ),
        (
            "Delhi".to_string(),
            CityCoord {
                latitude: 28.6139,
                longitude: 77.2090,
            },
        ),
    ])
}

impl TomlConfig {
    /// 從 TOML 檔案載入並驗證配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(source) = &self.source {
            if let Some(endpoint) = &source.endpoint {
                validation::validate_url("source.endpoint", endpoint)?;
            }
        }

        if let Some(cities) = &self.cities {
            for (name, coord) in cities {
                validation::validate_latitude(
                    &format!("cities.{}.latitude", name),
                    coord.latitude,
                )?;
                validation::validate_longitude(
                    &format!("cities.{}.longitude", name),
                    coord.longitude,
                )?;
            }
        }

        Ok(())
    }
}
