pub mod headhunter;
pub mod traits;
pub mod types;

pub use headhunter::{HeadHunterApi, ReqwestTransport};
pub use traits::{HttpResponse, HttpTransport, JobSearchApi};
pub use types::SearchFilters;
