use crate::error::Result;
use crate::models::Vacancy;
use async_trait::async_trait;

/// Persistent home for fetched vacancies
#[async_trait]
pub trait VacancyStorage: Send + Sync {
    /// Persist a batch, replacing or extending what was saved before
    async fn save_vacancies(&self, vacancies: &[Vacancy]) -> Result<()>;

    /// Everything saved last; empty when nothing was ever saved
    async fn load_vacancies(&self) -> Result<Vec<Vacancy>>;

    /// Returns false when a vacancy with the same id is already stored
    async fn add_vacancy(&self, vacancy: &Vacancy) -> Result<bool>;

    /// Returns false when no vacancy had this id
    async fn remove_vacancy(&self, id: &str) -> Result<bool>;

    async fn clear(&self) -> Result<()>;

    async fn find_vacancies(&self, keyword: &str) -> Result<Vec<Vacancy>> {
        let vacancies = self.load_vacancies().await?;
        Ok(vacancies
            .into_iter()
            .filter(|v| v.contains_keywords(&[keyword]))
            .collect())
    }
}
