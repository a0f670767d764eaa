pub mod engine;
pub mod fetcher;
pub mod scorer;

pub use crate::domain::model::{
    AssessmentReport, AssessmentRequest, CategoryBucket, CategoryCounts, FetchOutcome,
    PointOfInterest, Rating, ScoreBundle, SearchQuery,
};
pub use crate::domain::ports::{ConfigProvider, PlacesProvider, Storage};
pub use crate::utils::error::Result;
