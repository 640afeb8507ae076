use anyhow::Context;
use job_scout::models::selection::{self, SalaryRange};
use job_scout::{
    ApiConfig, BatchName, Experience, HeadHunterApi, JobSearchApi, JsonVacancyStorage,
    SearchFilters, VacancyStorage,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_QUERY: &str = "Python Developer";
const DEFAULT_TOP: usize = 10;

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn filters_from_env() -> anyhow::Result<SearchFilters> {
    let mut filters = SearchFilters::default();
    if let Some(salary) = env_var("JOB_SCOUT_SALARY_FROM") {
        filters.salary_from = Some(salary.parse().context("JOB_SCOUT_SALARY_FROM must be a number")?);
    }
    if let Some(experience) = env_var("JOB_SCOUT_EXPERIENCE") {
        filters.experience = Some(experience.parse::<Experience>()?);
    }
    filters.area = env_var("JOB_SCOUT_AREA");
    filters.location = env_var("JOB_SCOUT_LOCATION");
    Ok(filters)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let filters = filters_from_env()?;
    let top_n = match env_var("JOB_SCOUT_TOP") {
        Some(n) => n.parse().context("JOB_SCOUT_TOP must be a number")?,
        None => DEFAULT_TOP,
    };
    let keywords: Vec<String> = env_var("JOB_SCOUT_KEYWORDS")
        .map(|k| k.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let salary_range = env_var("JOB_SCOUT_SALARY_RANGE")
        .map(|r| r.parse::<SalaryRange>())
        .transpose()?;
    let data_dir = env_var("JOB_SCOUT_DATA_DIR").unwrap_or_else(|| "data".to_string());

    let api = HeadHunterApi::new(ApiConfig::from_env()?).context("Failed to set up the HeadHunter client")?;
    api.check_connection()
        .await
        .context("HeadHunter API is not reachable")?;

    info!("🔎 Searching {} for '{}'", api.source_name(), query);
    let vacancies = api.get_vacancies(&query, &filters).await?;
    info!("✅ Found {} vacancies", vacancies.len());

    let storage = JsonVacancyStorage::new(&data_dir, BatchName::Timestamped)?;
    storage
        .save_vacancies(&vacancies)
        .await
        .with_context(|| format!("Failed to save vacancies under {}", data_dir))?;

    let mut selected = selection::filter_by_keywords(vacancies, &keywords);
    if let Some(range) = salary_range {
        selected = selection::filter_by_salary(selected, range);
    }
    info!("Selected {} vacancies for display", selected.len());

    let best = selection::top(selection::sort_by_salary(selected), top_n);
    if best.is_empty() {
        println!("No vacancies found");
    }
    for (i, vacancy) in best.iter().enumerate() {
        println!("{}. {}", i + 1, vacancy);
        println!();
    }

    Ok(())
}
