pub mod json;
pub mod traits;

pub use json::{BatchName, JsonVacancyStorage, SaveMode};
pub use traits::VacancyStorage;
