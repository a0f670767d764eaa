pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, RunPlan, SourceSettings};

pub use crate::core::engine::{AssessmentEngine, DemandCategories, EngineSettings};
pub use crate::core::fetcher::MapplsClient;
pub use crate::core::scorer::ScoreWeights;
pub use crate::domain::model::{
    AssessmentReport, AssessmentRequest, CategoryCounts, FetchOutcome, PointOfInterest, Rating,
    ScoreBundle, SearchQuery,
};
pub use crate::utils::error::{Result, ScoutError};
