use crate::utils::error::Result;
use crate::utils::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RADIUS_METERS: u32 = 500;
pub const MAX_RADIUS_METERS: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// 單次 API 查詢的參數，半徑必須落在 [500, 3000] 公尺內
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub category: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub radius_meters: u32,
}

impl SearchQuery {
    pub fn new(
        category: impl Into<String>,
        center_latitude: f64,
        center_longitude: f64,
        radius_meters: u32,
    ) -> Result<Self> {
        let category = category.into();
        validation::validate_non_empty_string("category", &category)?;
        validation::validate_latitude("center_latitude", center_latitude)?;
        validation::validate_longitude("center_longitude", center_longitude)?;
        validation::validate_range(
            "radius_meters",
            radius_meters,
            MIN_RADIUS_METERS,
            MAX_RADIUS_METERS,
        )?;

        Ok(Self {
            category,
            center_latitude,
            center_longitude,
            radius_meters,
        })
    }
}

/// 一次完整評估的輸入：城市、目標業態與搜尋半徑
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub city: String,
    pub category: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub radius_meters: u32,
}

impl AssessmentRequest {
    pub fn new(
        city: impl Into<String>,
        category: impl Into<String>,
        center_latitude: f64,
        center_longitude: f64,
        radius_meters: u32,
    ) -> Result<Self> {
        let city = city.into();
        let category = category.into();
        validation::validate_non_empty_string("city", &city)?;
        validation::validate_non_empty_string("category", &category)?;
        validation::validate_latitude("center_latitude", center_latitude)?;
        validation::validate_longitude("center_longitude", center_longitude)?;
        validation::validate_range(
            "radius_meters",
            radius_meters,
            MIN_RADIUS_METERS,
            MAX_RADIUS_METERS,
        )?;

        Ok(Self {
            city,
            category,
            center_latitude,
            center_longitude,
            radius_meters,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub competitors: usize,
    pub restaurants: usize,
    pub malls: usize,
    pub gyms: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Strong,
    Moderate,
    Weak,
}

impl Rating {
    const STRONG_THRESHOLD: f64 = 8.0;
    const MODERATE_THRESHOLD: f64 = 6.0;

    pub fn classify(final_score: f64) -> Self {
        if final_score >= Self::STRONG_THRESHOLD {
            Rating::Strong
        } else if final_score >= Self::MODERATE_THRESHOLD {
            Rating::Moderate
        } else {
            Rating::Weak
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Rating::Strong => "strong",
            Rating::Moderate => "moderate",
            Rating::Weak => "weak",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub competition_count: usize,
    pub demand_score: f64,
    pub accessibility_score: f64,
    pub final_score: f64,
    pub rating: Rating,
}

/// 區分「查無結果」與「查詢失敗」，下游計分時兩者都當成零筆
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Vec<PointOfInterest>),
    Empty,
    Failed(String),
}

impl FetchOutcome {
    pub fn pois(&self) -> &[PointOfInterest] {
        match self {
            FetchOutcome::Found(pois) => pois,
            _ => &[],
        }
    }

    pub fn count(&self) -> usize {
        self.pois().len()
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Found(_) => "found",
            FetchOutcome::Empty => "empty",
            FetchOutcome::Failed(_) => "failed",
        }
    }

    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            FetchOutcome::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBucket {
    pub bucket: String,
    pub query: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub pois: Vec<PointOfInterest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub city: String,
    pub category: String,
    pub radius_meters: u32,
    pub generated_at: DateTime<Utc>,
    pub counts: CategoryCounts,
    pub scores: ScoreBundle,
    pub buckets: Vec<CategoryBucket>,
}
