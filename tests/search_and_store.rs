use async_trait::async_trait;
use job_scout::api::{HttpResponse, HttpTransport};
use job_scout::{
    ApiConfig, BatchName, Error, Experience, HeadHunterApi, JobSearchApi, JsonVacancyStorage,
    SearchFilters, VacancyStorage,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Answers `/vacancies` by page index, in order
struct PagedTransport {
    pages: Vec<(StatusCode, String)>,
}

impl PagedTransport {
    fn new(pages: Vec<(StatusCode, Value)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl HttpTransport for PagedTransport {
    async fn get(&self, _url: &str, query: &[(String, String)]) -> job_scout::Result<HttpResponse> {
        let page = query
            .iter()
            .find(|(k, _)| k == "page")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let (status, body) = page
            .parse::<usize>()
            .ok()
            .and_then(|i| self.pages.get(i).cloned())
            .unwrap_or((StatusCode::NOT_FOUND, String::new()));
        Ok(HttpResponse { status, body })
    }
}

fn api(transport: PagedTransport) -> HeadHunterApi<PagedTransport> {
    let config = ApiConfig {
        base_url: "http://hh.test".to_string(),
        ..ApiConfig::default()
    };
    HeadHunterApi::with_transport(config, transport).unwrap()
}

fn item(id: &str, name: &str, salary_from: Option<u64>, experience: &str, area: &str) -> Value {
    let area_name = if area == "1" { "Moscow" } else { "Elsewhere" };
    json!({
        "id": id,
        "name": name,
        "alternate_url": format!("https://hh.ru/vacancy/{}", id),
        "salary": salary_from.map(|from| json!({"from": from, "to": null, "currency": "RUR", "gross": true})),
        "experience": {"id": experience, "name": experience},
        "area": {"id": area, "name": area_name},
        "employer": {"id": "9", "name": "Acme"},
        "employment": {"id": "full", "name": "Full time"},
        "snippet": {"requirement": "Django, asyncio", "responsibility": null},
        "published_at": "2024-03-01T09:00:00+0300"
    })
}

fn page(items: Vec<Value>, page: u32, pages: u32) -> Value {
    json!({"items": items, "found": 42, "page": page, "pages": pages, "per_page": 100})
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("job-scout-it-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn filtered_search_survives_save_and_reload() {
    let transport = PagedTransport::new(vec![
        (
            StatusCode::OK,
            page(
                vec![
                    item("1", "Python Developer", Some(180_000), "between1And3", "1"),
                    item("2", "Python Developer", Some(90_000), "between1And3", "1"),
                    item("3", "Python Developer", None, "between1And3", "1"),
                ],
                0,
                2,
            ),
        ),
        (
            StatusCode::OK,
            page(
                vec![
                    item("4", "Senior Python Developer", Some(300_000), "between3And6", "1"),
                    item("5", "Python Developer", Some(120_000), "between1And3", "1"),
                    item("6", "Lead Python Developer", Some(150_000), "between1And3", "1"),
                    item("7", "Java Developer", Some(250_000), "between1And3", "1"),
                ],
                1,
                2,
            ),
        ),
    ]);
    let api = api(transport);
    let filters = SearchFilters::default()
        .with_salary_from(150_000)
        .with_experience(Experience::Between1And3)
        .with_area("1");

    let found = api.get_vacancies("Python Developer", &filters).await.unwrap();

    let ids: Vec<&str> = found.iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec!["1", "6"]);
    for vacancy in &found {
        assert!(vacancy.salary_from().unwrap() >= 150_000);
        assert_eq!(vacancy.experience(), Some(Experience::Between1And3));
        assert_eq!(vacancy.area().unwrap().id, "1");
    }

    let dir = temp_dir();
    let storage = JsonVacancyStorage::new(&dir, BatchName::Label("python".into())).unwrap();
    storage.save_vacancies(&found).await.unwrap();
    let reloaded = storage.load_vacancies().await.unwrap();
    assert_eq!(
        serde_json::to_value(&reloaded).unwrap(),
        serde_json::to_value(&found).unwrap()
    );
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn country_area_returns_listings_from_its_cities() {
    let transport = PagedTransport::new(vec![(
        StatusCode::OK,
        page(
            vec![
                item("1", "Python Developer", Some(200_000), "between1And3", "1"),
                item("2", "Python Developer", Some(210_000), "between1And3", "2"),
            ],
            0,
            1,
        ),
    )]);
    let api = api(transport);
    let filters = SearchFilters::default().with_area("113");

    let found = api.get_vacancies("\"Python Developer\"", &filters).await.unwrap();

    let ids: Vec<&str> = found.iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn item_without_title_is_skipped() {
    let transport = PagedTransport::new(vec![(
        StatusCode::OK,
        page(
            vec![
                item("1", "Python Developer", Some(100_000), "noExperience", "1"),
                json!({"id": "2", "alternate_url": "https://hh.ru/vacancy/2"}),
                item("3", "Python Developer", None, "moreThan6", "2"),
            ],
            0,
            1,
        ),
    )]);
    let api = api(transport);

    let found = api
        .get_vacancies("Python Developer", &SearchFilters::default())
        .await
        .unwrap();

    let ids: Vec<&str> = found.iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn server_error_fails_the_whole_search() {
    let transport = PagedTransport::new(vec![
        (
            StatusCode::OK,
            page(vec![item("1", "Python Developer", Some(1), "noExperience", "1")], 0, 3),
        ),
        (StatusCode::INTERNAL_SERVER_ERROR, json!({"errors": []})),
    ]);
    let api = api(transport);

    let result = api.get_vacancies("Python Developer", &SearchFilters::default()).await;

    match result {
        Err(Error::SearchFailed { status, .. }) => {
            assert_eq!(status, Some(StatusCode::INTERNAL_SERVER_ERROR))
        }
        other => panic!("expected SearchFailed, got {:?}", other.map(|v| v.len())),
    }
}

#[tokio::test]
async fn paging_stops_at_the_last_remote_page() {
    let transport = PagedTransport::new(vec![
        (StatusCode::OK, page(vec![item("1", "Rust Developer", None, "noExperience", "1")], 0, 2)),
        (StatusCode::OK, page(vec![item("2", "Rust Developer", None, "noExperience", "1")], 1, 2)),
        (StatusCode::OK, page(vec![item("3", "Rust Developer", None, "noExperience", "1")], 2, 2)),
    ]);
    let api = api(transport);

    let found = api.get_vacancies("rust", &SearchFilters::default()).await.unwrap();
    let ids: Vec<&str> = found.iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}
