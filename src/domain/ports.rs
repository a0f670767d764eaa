use crate::domain::model::{PointOfInterest, SearchQuery};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn api_key(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PointOfInterest>>;
}
