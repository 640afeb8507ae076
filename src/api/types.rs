use crate::error::Result;
use crate::models::{Area, Experience, Snippet, Vacancy};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

/// Options narrowing a vacancy search
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Minimum acceptable salary; listings without a published lower bound are dropped
    pub salary_from: Option<u64>,
    /// Maximum salary; listings without a published upper bound are dropped
    pub salary_to: Option<u64>,
    /// Required experience bracket
    pub experience: Option<Experience>,
    /// Region id, e.g. "1" for Moscow; enforced by HeadHunter, which includes child regions
    pub area: Option<String>,
    /// Region name, resolved to an id when `area` is not given
    pub location: Option<String>,
    /// Results per page (1..=100)
    pub per_page: Option<u32>,
    /// Upper bound on pages fetched
    pub max_pages: Option<u32>,
    /// Extra words that must all appear in a listing
    pub keywords: Vec<String>,
}

impl SearchFilters {
    pub fn with_salary_from(mut self, salary_from: u64) -> Self {
        self.salary_from = Some(salary_from);
        self
    }

    pub fn with_salary_to(mut self, salary_to: u64) -> Self {
        self.salary_to = Some(salary_to);
        self
    }

    pub fn with_experience(mut self, experience: Experience) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Client-side check applied to every parsed listing. Area is left to the server.
    pub fn accepts(&self, vacancy: &Vacancy) -> bool {
        if let Some(floor) = self.salary_from {
            match vacancy.salary_from() {
                Some(from) if from >= floor => {}
                _ => return false,
            }
        }
        if let Some(ceiling) = self.salary_to {
            match vacancy.salary_to() {
                Some(to) if to <= ceiling => {}
                _ => return false,
            }
        }
        if let Some(experience) = self.experience {
            if vacancy.experience() != Some(experience) {
                return false;
            }
        }
        vacancy.contains_keywords(&self.keywords)
    }
}

/// One page of `GET /vacancies`
#[derive(Debug, Deserialize)]
pub(crate) struct RawPage {
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSalary {
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub currency: Option<String>,
    pub gross: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNamed {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Node of the `GET /areas` tree
#[derive(Debug, Deserialize)]
pub(crate) struct RawAreaNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub areas: Vec<RawAreaNode>,
}

impl RawAreaNode {
    /// Pre-order walk for the first region whose name contains `needle` (already lowercased).
    pub fn find(&self, needle: &str) -> Option<&RawAreaNode> {
        if self.name.to_lowercase().contains(needle) {
            return Some(self);
        }
        self.areas.iter().find_map(|child| child.find(needle))
    }
}

/// Listing as served by the search and detail endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct RawVacancy {
    pub id: String,
    pub name: String,
    pub alternate_url: Option<String>,
    pub salary: Option<RawSalary>,
    pub experience: Option<RawNamed>,
    pub area: Option<RawNamed>,
    pub employer: Option<RawNamed>,
    pub employment: Option<RawNamed>,
    pub description: Option<String>,
    pub snippet: Option<Snippet>,
    pub published_at: Option<String>,
}

impl RawVacancy {
    pub fn into_vacancy(self) -> Result<Vacancy> {
        let (from, to, currency, gross) = match self.salary {
            Some(s) => (s.from, s.to, s.currency, s.gross),
            None => (None, None, None, None),
        };
        if (from.is_some() || to.is_some()) && currency.is_none() {
            warn!("Vacancy {} publishes a salary without currency", self.id);
        }

        let experience = self
            .experience
            .and_then(|e| e.id)
            .and_then(|id| match id.parse::<Experience>() {
                Ok(experience) => Some(experience),
                Err(_) => {
                    debug!("Unknown experience bracket '{}' on vacancy {}", id, self.id);
                    None
                }
            });

        let area = self.area.and_then(|a| match (a.id, a.name) {
            (Some(id), name) => Some(Area {
                id,
                name: name.unwrap_or_default(),
            }),
            (None, _) => None,
        });

        let published_at = self.published_at.as_deref().and_then(parse_timestamp);
        let url = self
            .alternate_url
            .unwrap_or_else(|| format!("https://hh.ru/vacancy/{}", self.id));

        Vacancy::builder(self.id, self.name)
            .url(url)
            .salary(from, to, currency)
            .gross(gross)
            .experience(experience)
            .area(area)
            .employer(self.employer.and_then(|e| e.name))
            .employment(self.employment.and_then(|e| e.name))
            .description(self.description)
            .snippet(self.snippet)
            .published_at(published_at)
            .build()
    }
}

/// HeadHunter writes offsets without a colon (`+0300`).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| debug!("Unparsable timestamp '{}': {}", raw, e))
        .ok()
}
