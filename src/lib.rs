pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use api::{HeadHunterApi, JobSearchApi, SearchFilters};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use models::{Area, Experience, Snippet, Vacancy};
pub use storage::{BatchName, JsonVacancyStorage, SaveMode, VacancyStorage};
