use crate::api::types::SearchFilters;
use crate::error::Result;
use crate::models::Vacancy;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Common trait for job boards
/// A second board (SuperJob, LinkedIn, ...) only needs another implementation of this
#[async_trait]
pub trait JobSearchApi: Send + Sync {
    /// Search listings matching `query`, narrowed by `filters`, in the board's own order
    async fn get_vacancies(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Vacancy>>;

    /// Fetch the full record of one listing
    async fn get_vacancy(&self, id: &str) -> Result<Vacancy>;

    /// Probe the service once
    async fn check_connection(&self) -> Result<()>;

    /// Get the name of the board
    fn source_name(&self) -> &'static str;
}

/// Raw answer of a GET request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The only way API clients talk to the network
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}
