pub mod selection;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Required work experience, in HeadHunter's own vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Experience {
    NoExperience,
    Between1And3,
    Between3And6,
    MoreThan6,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::NoExperience,
        Experience::Between1And3,
        Experience::Between3And6,
        Experience::MoreThan6,
    ];

    /// Identifier used in query strings and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::NoExperience => "noExperience",
            Experience::Between1And3 => "between1And3",
            Experience::Between3And6 => "between3And6",
            Experience::MoreThan6 => "moreThan6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Experience::NoExperience => "no experience",
            Experience::Between1And3 => "1-3 years",
            Experience::Between3And6 => "3-6 years",
            Experience::MoreThan6 => "6+ years",
        }
    }
}

impl FromStr for Experience {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Experience::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidQuery(format!("unknown experience bracket '{}'", s)))
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Region of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Area {
    pub id: String,
    pub name: String,
}

/// Search-result highlights
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub requirement: Option<String>,
    pub responsibility: Option<String>,
}

impl Snippet {
    pub fn is_empty(&self) -> bool {
        self.requirement.is_none() && self.responsibility.is_none()
    }
}

/// One job listing.
///
/// Fields are read-only once built; two vacancies are equal when their ids are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(deserialize_with = "non_empty")]
    id: String,
    #[serde(deserialize_with = "non_empty")]
    title: String,
    url: String,
    salary_from: Option<u64>,
    salary_to: Option<u64>,
    currency: Option<String>,
    gross: Option<bool>,
    experience: Option<Experience>,
    area: Option<Area>,
    employer: Option<String>,
    employment: Option<String>,
    description: Option<String>,
    snippet: Option<Snippet>,
    published_at: Option<DateTime<Utc>>,
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(de::Error::custom("value must not be empty"));
    }
    Ok(value)
}

impl Vacancy {
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> VacancyBuilder {
        VacancyBuilder::new(id.into(), title.into())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn salary_from(&self) -> Option<u64> {
        self.salary_from
    }

    pub fn salary_to(&self) -> Option<u64> {
        self.salary_to
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn gross(&self) -> Option<bool> {
        self.gross
    }

    pub fn experience(&self) -> Option<Experience> {
        self.experience
    }

    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    pub fn employer(&self) -> Option<&str> {
        self.employer.as_deref()
    }

    pub fn employment(&self) -> Option<&str> {
        self.employment.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn snippet(&self) -> Option<&Snippet> {
        self.snippet.as_ref()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn has_salary(&self) -> bool {
        self.salary_from.is_some() || self.salary_to.is_some()
    }

    /// Value used when ranking by pay: the lower bound, else the upper one.
    pub fn salary_floor(&self) -> Option<u64> {
        self.salary_from.or(self.salary_to)
    }

    /// True when either published bound falls inside `[min, max]`.
    pub fn salary_in_range(&self, min: u64, max: u64) -> bool {
        let within = |value: u64| min <= value && value <= max;
        self.salary_from.map_or(false, within) || self.salary_to.map_or(false, within)
    }

    /// Case-insensitive match of every keyword against title, description and snippet.
    pub fn contains_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> bool {
        let haystack = self.searchable_text();
        keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .all(|k| haystack.contains(&k))
    }

    fn searchable_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        parts.extend(self.description.as_deref());
        if let Some(snippet) = &self.snippet {
            parts.extend(snippet.requirement.as_deref());
            parts.extend(snippet.responsibility.as_deref());
        }
        parts.join("\n").to_lowercase()
    }

    pub fn salary_label(&self) -> String {
        let currency = self.currency.as_deref().unwrap_or("");
        let text = match (self.salary_from, self.salary_to) {
            (Some(from), Some(to)) => format!("from {} to {} {}", from, to, currency),
            (Some(from), None) => format!("from {} {}", from, currency),
            (None, Some(to)) => format!("up to {} {}", to, currency),
            (None, None) => return "salary not specified".to_string(),
        };
        text.trim_end().to_string()
    }
}

impl PartialEq for Vacancy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vacancy {}

impl Hash for Vacancy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(employer) = &self.employer {
            writeln!(f, "   Employer: {}", employer)?;
        }
        writeln!(f, "   Salary: {}", self.salary_label())?;
        if let Some(experience) = &self.experience {
            writeln!(f, "   Experience: {}", experience)?;
        }
        if let Some(area) = &self.area {
            writeln!(f, "   Area: {}", area.name)?;
        }
        write!(f, "   URL: {}", self.url)
    }
}

pub struct VacancyBuilder {
    vacancy: Vacancy,
}

impl VacancyBuilder {
    fn new(id: String, title: String) -> Self {
        let url = format!("https://hh.ru/vacancy/{}", id);
        Self {
            vacancy: Vacancy {
                id,
                title,
                url,
                salary_from: None,
                salary_to: None,
                currency: None,
                gross: None,
                experience: None,
                area: None,
                employer: None,
                employment: None,
                description: None,
                snippet: None,
                published_at: None,
            },
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.vacancy.url = url.into();
        self
    }

    pub fn salary(mut self, from: Option<u64>, to: Option<u64>, currency: Option<String>) -> Self {
        self.vacancy.salary_from = from;
        self.vacancy.salary_to = to;
        self.vacancy.currency = currency;
        self
    }

    pub fn gross(mut self, gross: Option<bool>) -> Self {
        self.vacancy.gross = gross;
        self
    }

    pub fn experience(mut self, experience: Option<Experience>) -> Self {
        self.vacancy.experience = experience;
        self
    }

    pub fn area(mut self, area: Option<Area>) -> Self {
        self.vacancy.area = area;
        self
    }

    pub fn employer(mut self, employer: Option<String>) -> Self {
        self.vacancy.employer = employer;
        self
    }

    pub fn employment(mut self, employment: Option<String>) -> Self {
        self.vacancy.employment = employment;
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.vacancy.description = description;
        self
    }

    pub fn snippet(mut self, snippet: Option<Snippet>) -> Self {
        self.vacancy.snippet = snippet.filter(|s| !s.is_empty());
        self
    }

    pub fn published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.vacancy.published_at = published_at;
        self
    }

    pub fn build(self) -> Result<Vacancy> {
        if self.vacancy.id.trim().is_empty() {
            return Err(Error::InvalidVacancy("id must not be empty".to_string()));
        }
        if self.vacancy.title.trim().is_empty() {
            return Err(Error::InvalidVacancy(format!(
                "title of vacancy {} must not be empty",
                self.vacancy.id
            )));
        }
        Ok(self.vacancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vacancy {
        Vacancy::builder("12345", "Python Developer")
            .salary(Some(100_000), Some(150_000), Some("RUR".to_string()))
            .gross(Some(false))
            .experience(Some(Experience::Between1And3))
            .area(Some(Area {
                id: "1".to_string(),
                name: "Moscow".to_string(),
            }))
            .employer(Some("IT Company".to_string()))
            .description(Some("Building web services".to_string()))
            .snippet(Some(Snippet {
                requirement: Some("Python, Django, REST".to_string()),
                responsibility: None,
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_blank_id_and_title() {
        assert!(matches!(
            Vacancy::builder("", "Python Developer").build(),
            Err(Error::InvalidVacancy(_))
        ));
        assert!(matches!(
            Vacancy::builder("1", "   ").build(),
            Err(Error::InvalidVacancy(_))
        ));
    }

    #[test]
    fn url_defaults_to_public_listing_page() {
        let vacancy = Vacancy::builder("777", "Rust Developer").build().unwrap();
        assert_eq!(vacancy.url(), "https://hh.ru/vacancy/777");
        assert!(!vacancy.has_salary());
        assert_eq!(vacancy.currency(), None);
    }

    #[test]
    fn equality_is_keyed_by_id() {
        let a = sample();
        let b = Vacancy::builder("12345", "Senior Python Developer").build().unwrap();
        let c = Vacancy::builder("54321", "Python Developer").build().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn salary_label_covers_all_shapes() {
        assert_eq!(sample().salary_label(), "from 100000 to 150000 RUR");

        let only_to = Vacancy::builder("1", "Dev")
            .salary(None, Some(150_000), Some("RUR".to_string()))
            .build()
            .unwrap();
        assert_eq!(only_to.salary_label(), "up to 150000 RUR");

        let only_from = Vacancy::builder("2", "Dev")
            .salary(Some(100_000), None, Some("USD".to_string()))
            .build()
            .unwrap();
        assert_eq!(only_from.salary_label(), "from 100000 USD");

        let none = Vacancy::builder("3", "Dev").build().unwrap();
        assert_eq!(none.salary_label(), "salary not specified");
    }

    #[test]
    fn salary_range_checks_either_bound() {
        let vacancy = sample();
        assert!(vacancy.salary_in_range(90_000, 110_000));
        assert!(vacancy.salary_in_range(140_000, 200_000));
        assert!(!vacancy.salary_in_range(160_000, 200_000));

        let without_salary = Vacancy::builder("9", "Dev").build().unwrap();
        assert!(!without_salary.salary_in_range(0, u64::MAX));
    }

    #[test]
    fn keywords_match_title_description_and_snippet() {
        let vacancy = sample();
        assert!(vacancy.contains_keywords(&["python"]));
        assert!(vacancy.contains_keywords(&["PYTHON", "django"]));
        assert!(vacancy.contains_keywords(&["web services"]));
        assert!(!vacancy.contains_keywords(&["python", "golang"]));
        assert!(vacancy.contains_keywords::<&str>(&[]));
    }

    #[test]
    fn experience_parses_remote_ids() {
        assert_eq!("between1And3".parse::<Experience>().unwrap(), Experience::Between1And3);
        assert_eq!("MORETHAN6".parse::<Experience>().unwrap(), Experience::MoreThan6);
        assert!("senior".parse::<Experience>().is_err());
        assert_eq!(
            serde_json::to_string(&Experience::NoExperience).unwrap(),
            "\"noExperience\""
        );
    }

    #[test]
    fn stored_record_with_empty_title_is_rejected() {
        let json = r#"{"id":"1","title":"","url":"u","salary_from":null,"salary_to":null,
            "currency":null,"gross":null,"experience":null,"area":null,"employer":null,
            "employment":null,"description":null,"snippet":null,"published_at":null}"#;
        assert!(serde_json::from_str::<Vacancy>(json).is_err());
    }

    #[test]
    fn display_lists_the_essentials() {
        let text = sample().to_string();
        assert!(text.starts_with("Python Developer"));
        assert!(text.contains("Employer: IT Company"));
        assert!(text.contains("Experience: 1-3 years"));
        assert!(text.contains("URL: https://hh.ru/vacancy/12345"));
    }
}
