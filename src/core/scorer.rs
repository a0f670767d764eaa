use crate::domain::model::{CategoryCounts, Rating, ScoreBundle};
use serde::{Deserialize, Serialize};

/// 計分權重，預設值即為固定公式；TOML 配置可覆寫
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub restaurant: f64,
    pub mall: f64,
    pub gym: f64,
    pub demand: f64,
    pub accessibility: f64,
    pub competition: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            restaurant: 2.0,
            mall: 3.0,
            gym: 1.0,
            demand: 0.4,
            accessibility: 0.3,
            competition: 0.3,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 純函數：相同輸入永遠得到相同的 ScoreBundle
pub fn score(counts: &CategoryCounts, radius_meters: u32, weights: &ScoreWeights) -> ScoreBundle {
    let demand_score = counts.restaurants as f64 * weights.restaurant
        + counts.malls as f64 * weights.mall
        + counts.gyms as f64 * weights.gym;

    // radius_meters 已由 SearchQuery/配置驗證過，不會為零
    let demand_pois = (counts.restaurants + counts.malls + counts.gyms) as f64;
    let radius_km = f64::from(radius_meters) / 1000.0;
    let accessibility_score = round2(demand_pois / radius_km);

    let final_score = round2(
        demand_score * weights.demand + accessibility_score * weights.accessibility
            - counts.competitors as f64 * weights.competition,
    );

    ScoreBundle {
        competition_count: counts.competitors,
        demand_score,
        accessibility_score,
        final_score,
        rating: Rating::classify(final_score),
    }
}
