use crate::core::scorer::{self, ScoreWeights};
use crate::domain::model::{
    AssessmentReport, AssessmentRequest, CategoryBucket, CategoryCounts, FetchOutcome, SearchQuery,
};
use crate::domain::ports::{PlacesProvider, Storage};
use crate::utils::error::{Result, ScoutError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 需求代理類別的查詢詞
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandCategories {
    pub restaurant: String,
    pub mall: String,
    pub gym: String,
}

impl Default for DemandCategories {
    fn default() -> Self {
        Self {
            restaurant: "restaurant".to_string(),
            mall: "mall".to_string(),
            gym: "gym".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub demand: DemandCategories,
    pub weights: ScoreWeights,
    pub bundle_name: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            demand: DemandCategories::default(),
            weights: ScoreWeights::default(),
            bundle_name: "assessment.zip".to_string(),
        }
    }
}

pub struct AssessmentEngine<P: PlacesProvider, S: Storage> {
    provider: P,
    storage: S,
    settings: EngineSettings,
}

impl<P: PlacesProvider, S: Storage> AssessmentEngine<P, S> {
    pub fn new(provider: P, storage: S, settings: EngineSettings) -> Self {
        Self {
            provider,
            storage,
            settings,
        }
    }

    pub async fn run(&self, request: &AssessmentRequest) -> Result<AssessmentReport> {
        tracing::info!(
            "🚀 Starting assessment: {} / '{}' within {}m",
            request.city,
            request.category,
            request.radius_meters
        );

        // 取數：目標業態算競爭者，另外三個類別當需求代理
        let competitors = self.fetch_bucket(request, &request.category).await;
        let restaurants = self
            .fetch_bucket(request, &self.settings.demand.restaurant)
            .await;
        let malls = self.fetch_bucket(request, &self.settings.demand.mall).await;
        let gyms = self.fetch_bucket(request, &self.settings.demand.gym).await;

        let counts = CategoryCounts {
            competitors: competitors.count(),
            restaurants: restaurants.count(),
            malls: malls.count(),
            gyms: gyms.count(),
        };
        tracing::info!(
            "📊 POI counts: {} competitors, {} restaurants, {} malls, {} gyms",
            counts.competitors,
            counts.restaurants,
            counts.malls,
            counts.gyms
        );

        // 計分
        let scores = scorer::score(&counts, request.radius_meters, &self.settings.weights);
        tracing::info!(
            "🧮 Scores: demand {:.2}, accessibility {:.2}, final {:.2} ({})",
            scores.demand_score,
            scores.accessibility_score,
            scores.final_score,
            scores.rating
        );

        let report = AssessmentReport {
            city: request.city.clone(),
            category: request.category.clone(),
            radius_meters: request.radius_meters,
            generated_at: Utc::now(),
            counts,
            scores,
            buckets: vec![
                Self::bucket("competitors", &request.category, competitors),
                Self::bucket("restaurants", &self.settings.demand.restaurant, restaurants),
                Self::bucket("malls", &self.settings.demand.mall, malls),
                Self::bucket("gyms", &self.settings.demand.gym, gyms),
            ],
        };

        self.write_bundle(&report).await?;
        tracing::info!("📁 Report bundle written: {}", self.settings.bundle_name);

        Ok(report)
    }

    // 失敗軟著陸：查詢失敗只記 warning，計分時當成零筆
    async fn fetch_bucket(&self, request: &AssessmentRequest, term: &str) -> FetchOutcome {
        let query = match SearchQuery::new(
            term,
            request.center_latitude,
            request.center_longitude,
            request.radius_meters,
        ) {
            Ok(query) => query,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };

        match self.provider.search(&query).await {
            Ok(pois) if pois.is_empty() => FetchOutcome::Empty,
            Ok(pois) => FetchOutcome::Found(pois),
            Err(e) => {
                tracing::warn!("⚠️ '{}' lookup failed, counting as zero: {}", term, e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    fn bucket(name: &str, term: &str, outcome: FetchOutcome) -> CategoryBucket {
        let detail = outcome.failure_detail().map(str::to_string);
        let label = outcome.label().to_string();
        let pois = match outcome {
            FetchOutcome::Found(pois) => pois,
            _ => Vec::new(),
        };

        CategoryBucket {
            bucket: name.to_string(),
            query: term.to_string(),
            outcome: label,
            detail,
            pois,
        }
    }

    fn render_pois_csv(report: &AssessmentReport) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["bucket", "name", "address", "latitude", "longitude"])?;

        for bucket in &report.buckets {
            for poi in &bucket.pois {
                writer.write_record([
                    bucket.bucket.as_str(),
                    poi.name.as_str(),
                    poi.address.as_str(),
                    poi.latitude.to_string().as_str(),
                    poi.longitude.to_string().as_str(),
                ])?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| ScoutError::ProcessingError {
                message: format!("CSV buffer flush failed: {}", e),
            })
    }

    async fn write_bundle(&self, report: &AssessmentReport) -> Result<()> {
        let json_output = serde_json::to_string_pretty(report)?;
        let csv_output = Self::render_pois_csv(report)?;

        // 打包成單一 ZIP 檔
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("assessment.json", FileOptions::default())?;
            zip.write_all(json_output.as_bytes())?;

            zip.start_file::<_, ()>("pois.csv", FileOptions::default())?;
            zip.write_all(&csv_output)?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report bundle ({} bytes) to storage", zip_data.len());
        self.storage
            .write_file(&self.settings.bundle_name, &zip_data)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PointOfInterest, Rating};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    enum Canned {
        Pois(Vec<PointOfInterest>),
        Fail(String),
    }

    struct MockProvider {
        responses: HashMap<String, Canned>,
    }

    #[async_trait::async_trait]
    impl PlacesProvider for MockProvider {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<PointOfInterest>> {
            match self.responses.get(&query.category) {
                Some(Canned::Pois(pois)) => Ok(pois.clone()),
                Some(Canned::Fail(message)) => Err(ScoutError::ProcessingError {
                    message: message.clone(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn make_pois(count: usize) -> Vec<PointOfInterest> {
        (0..count)
            .map(|i| PointOfInterest {
                name: format!("Place {}", i + 1),
                address: format!("{} Main Street", i + 1),
                latitude: 12.9 + (i as f64) * 0.001,
                longitude: 77.5 + (i as f64) * 0.001,
            })
            .collect()
    }

    fn request() -> AssessmentRequest {
        AssessmentRequest::new("Bangalore", "salon", 12.9716, 77.5946, 1000).unwrap()
    }

    #[tokio::test]
    async fn test_run_scores_reference_counts() {
        let mut responses = HashMap::new();
        responses.insert("salon".to_string(), Canned::Pois(make_pois(5)));
        responses.insert("restaurant".to_string(), Canned::Pois(make_pois(10)));
        responses.insert("mall".to_string(), Canned::Pois(make_pois(4)));
        responses.insert("gym".to_string(), Canned::Pois(make_pois(2)));

        let provider = MockProvider { responses };
        let storage = MockStorage::new();
        let engine = AssessmentEngine::new(provider, storage, EngineSettings::default());

        let report = engine.run(&request()).await.unwrap();

        assert_eq!(report.counts.competitors, 5);
        assert_eq!(report.counts.restaurants, 10);
        assert_eq!(report.counts.malls, 4);
        assert_eq!(report.counts.gyms, 2);
        assert_eq!(report.scores.demand_score, 34.0);
        assert_eq!(report.scores.accessibility_score, 16.0);
        assert_eq!(report.scores.final_score, 16.9);
        assert_eq!(report.scores.rating, Rating::Strong);
    }

    #[tokio::test]
    async fn test_failed_bucket_counts_as_zero() {
        let mut responses = HashMap::new();
        responses.insert("salon".to_string(), Canned::Pois(make_pois(3)));
        responses.insert(
            "restaurant".to_string(),
            Canned::Fail("connection refused".to_string()),
        );
        responses.insert("mall".to_string(), Canned::Pois(make_pois(1)));
        // gym: no canned response -> empty list

        let provider = MockProvider { responses };
        let storage = MockStorage::new();
        let engine = AssessmentEngine::new(provider, storage, EngineSettings::default());

        let report = engine.run(&request()).await.unwrap();

        assert_eq!(report.counts.restaurants, 0);
        assert_eq!(report.counts.gyms, 0);
        assert_eq!(report.counts.competitors, 3);

        // Failure and empty are distinguishable in the report
        let restaurants = &report.buckets[1];
        assert_eq!(restaurants.outcome, "failed");
        assert!(restaurants
            .detail
            .as_deref()
            .unwrap()
            .contains("connection refused"));

        let gyms = &report.buckets[3];
        assert_eq!(gyms.outcome, "empty");
        assert!(gyms.detail.is_none());
    }

    #[tokio::test]
    async fn test_run_writes_report_bundle() {
        let mut responses = HashMap::new();
        responses.insert("salon".to_string(), Canned::Pois(make_pois(2)));
        responses.insert("restaurant".to_string(), Canned::Pois(make_pois(1)));

        let provider = MockProvider { responses };
        let storage = MockStorage::new();
        let engine = AssessmentEngine::new(provider, storage.clone(), EngineSettings::default());

        engine.run(&request()).await.unwrap();

        let zip_data = storage.get_file("assessment.zip").await.unwrap();
        let cursor = std::io::Cursor::new(zip_data);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["assessment.json", "pois.csv"]);

        // JSON entry round-trips as a report payload
        let json_content = {
            let mut file = archive.by_name("assessment.json").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let parsed: serde_json::Value = serde_json::from_str(&json_content).unwrap();
        assert_eq!(parsed["city"], "Bangalore");
        assert_eq!(parsed["counts"]["competitors"], 2);
        assert_eq!(parsed["scores"]["rating"], "weak");

        // CSV entry carries one tagged row per POI
        let csv_content = {
            let mut file = archive.by_name("pois.csv").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        let lines: Vec<&str> = csv_content.trim().split('\n').collect();
        assert_eq!(lines[0], "bucket,name,address,latitude,longitude");
        assert_eq!(lines.len(), 4); // header + 2 competitors + 1 restaurant
        assert!(lines[1].starts_with("competitors,Place 1"));
        assert!(lines[3].starts_with("restaurants,Place 1"));
    }

    #[tokio::test]
    async fn test_custom_demand_categories_are_queried() {
        let mut responses = HashMap::new();
        responses.insert("salon".to_string(), Canned::Pois(make_pois(1)));
        responses.insert("cafe".to_string(), Canned::Pois(make_pois(4)));

        let provider = MockProvider { responses };
        let storage = MockStorage::new();
        let settings = EngineSettings {
            demand: DemandCategories {
                restaurant: "cafe".to_string(),
                mall: "shopping centre".to_string(),
                gym: "fitness".to_string(),
            },
            ..EngineSettings::default()
        };
        let engine = AssessmentEngine::new(provider, storage, settings);

        let report = engine.run(&request()).await.unwrap();

        assert_eq!(report.counts.restaurants, 4);
        assert_eq!(report.buckets[1].query, "cafe");
        assert_eq!(report.buckets[2].query, "shopping centre");
    }
}
