use crate::api::traits::{HttpResponse, HttpTransport, JobSearchApi};
use crate::api::types::{RawAreaNode, RawPage, RawVacancy, SearchFilters};
use crate::config::{ApiConfig, MAX_PER_PAGE};
use crate::error::{Error, Result};
use crate::models::Vacancy;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Longest slice of an error body kept in error messages
const BODY_EXCERPT: usize = 200;

/// `HttpTransport` backed by a shared reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::SearchFailed {
                status: e.status(),
                context: format!("GET {}: {}", url, e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::SearchFailed {
            status: Some(status),
            context: format!("Failed to read response body of {}: {}", url, e),
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// HeadHunter (hh.ru) search client
pub struct HeadHunterApi<T = ReqwestTransport> {
    config: ApiConfig,
    transport: T,
}

impl HeadHunterApi<ReqwestTransport> {
    /// Create a client talking to the real service
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: HttpTransport> HeadHunterApi<T> {
    /// Create a client over a custom transport
    pub fn with_transport(config: ApiConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve a region name ("Moscow", "Kazan") to its area id
    pub async fn find_area_id(&self, name: &str) -> Result<Option<String>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/areas", self.config.base_url);
        let tree: Vec<RawAreaNode> = self.fetch_json(&url, &[]).await?;
        let found = tree.iter().find_map(|node| node.find(&needle)).map(|node| node.id.clone());

        match &found {
            Some(id) => debug!("Resolved area '{}' to {}", name, id),
            None => debug!("No area matches '{}'", name),
        }
        Ok(found)
    }

    async fn resolve_area(&self, filters: &SearchFilters) -> Result<Option<String>> {
        if let Some(area) = &filters.area {
            return Ok(Some(area.clone()));
        }
        match &filters.location {
            Some(location) => match self.find_area_id(location).await? {
                Some(id) => Ok(Some(id)),
                None => Err(Error::InvalidQuery(format!("unknown location '{}'", location))),
            },
            None => Ok(None),
        }
    }

    async fn fetch_json<R: DeserializeOwned>(&self, url: &str, query: &[(String, String)]) -> Result<R> {
        debug!("Fetching URL: {}", url);
        let response = self.transport.get(url, query).await?;

        if !response.status.is_success() {
            warn!("HeadHunter returned status: {}", response.status);
            return Err(Error::SearchFailed {
                status: Some(response.status),
                context: format!("GET {}: {}", url, excerpt(&response.body)),
            });
        }

        serde_json::from_str(&response.body).map_err(|source| Error::ResponseParse {
            context: url.to_string(),
            source,
        })
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn search_params(
    query: &str,
    filters: &SearchFilters,
    area: Option<&str>,
    per_page: u32,
    page: u32,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("text".to_string(), query.to_string()),
        ("search_field".to_string(), "name".to_string()),
        ("search_field".to_string(), "description".to_string()),
        ("per_page".to_string(), per_page.to_string()),
        ("page".to_string(), page.to_string()),
    ];
    if let Some(salary) = filters.salary_from {
        params.push(("salary".to_string(), salary.to_string()));
    }
    if filters.salary_from.is_some() || filters.salary_to.is_some() {
        params.push(("only_with_salary".to_string(), "true".to_string()));
    }
    if let Some(experience) = filters.experience {
        params.push(("experience".to_string(), experience.as_str().to_string()));
    }
    if let Some(area) = area {
        params.push(("area".to_string(), area.to_string()));
    }
    params
}

/// Plain words of a HeadHunter query that every listing must contain.
///
/// Quotes, grouping, `!` and `*` are dropped, `AND` is ignored and a `NOT` removes the
/// word after it. A query with `OR` yields no words: the server already did the matching.
fn local_terms(query: &str) -> Vec<String> {
    let cleaned: String = query
        .chars()
        .map(|c| match c {
            '"' | '(' | ')' | '!' | '*' => ' ',
            c => c,
        })
        .collect();

    let mut terms = Vec::new();
    let mut words = cleaned.split_whitespace();
    while let Some(word) = words.next() {
        match word {
            "OR" => return Vec::new(),
            "AND" => {}
            "NOT" => {
                words.next();
            }
            word => terms.push(word.to_string()),
        }
    }
    terms
}

#[async_trait]
impl<T: HttpTransport> JobSearchApi for HeadHunterApi<T> {
    async fn get_vacancies(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Vacancy>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("search text must not be empty".to_string()));
        }

        let area = self.resolve_area(filters).await?;
        let per_page = filters
            .per_page
            .unwrap_or(self.config.per_page)
            .clamp(1, MAX_PER_PAGE);
        let max_pages = filters.max_pages.unwrap_or(self.config.max_pages).max(1);
        let url = format!("{}/vacancies", self.config.base_url);

        info!("Starting HeadHunter search for '{}'", query);

        let mut vacancies = Vec::new();
        let mut skipped = 0usize;
        let mut page = 0;
        loop {
            let params = search_params(query, filters, area.as_deref(), per_page, page);
            let raw: RawPage = self.fetch_json(&url, &params).await?;
            debug!(
                "Page {} of {} ({} items, {} found in total)",
                raw.page + 1,
                raw.pages,
                raw.items.len(),
                raw.found
            );

            let received = raw.items.len();
            for item in raw.items {
                match serde_json::from_value::<RawVacancy>(item)
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.into_vacancy().map_err(|e| e.to_string()))
                {
                    Ok(vacancy) => vacancies.push(vacancy),
                    Err(reason) => {
                        skipped += 1;
                        debug!("Skipping unparsable item on page {}: {}", page, reason);
                    }
                }
            }

            page += 1;
            if received == 0 || page >= raw.pages || page >= max_pages {
                break;
            }
        }

        let terms = local_terms(query);
        let fetched = vacancies.len();
        vacancies.retain(|v| v.contains_keywords(&terms) && filters.accepts(v));

        info!(
            "Fetched {} vacancies over {} page(s), kept {} after filtering ({} skipped as malformed)",
            fetched,
            page,
            vacancies.len(),
            skipped
        );
        Ok(vacancies)
    }

    async fn get_vacancy(&self, id: &str) -> Result<Vacancy> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidQuery("vacancy id must not be empty".to_string()));
        }
        let url = format!("{}/vacancies/{}", self.config.base_url, id);
        let raw: RawVacancy = self.fetch_json(&url, &[]).await?;
        raw.into_vacancy()
    }

    async fn check_connection(&self) -> Result<()> {
        let url = format!("{}/vacancies", self.config.base_url);
        let params = [("per_page".to_string(), "1".to_string())];
        let _: RawPage = self.fetch_json(&url, &params).await?;
        info!("HeadHunter API is reachable at {}", self.config.base_url);
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "HeadHunter"
    }
}
