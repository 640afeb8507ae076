use crate::error::{Error, Result};
use crate::models::Vacancy;
use crate::storage::traits::VacancyStorage;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

const BATCH_PREFIX: &str = "vacancies_";
const EXTENSION: &str = ".json";

/// How batch files are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchName {
    /// Always the same file, `<label>.json`
    Label(String),
    /// A new `vacancies_<UTC timestamp>.json` per save; the newest one is current
    Timestamped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    #[default]
    Replace,
    /// Keep stored records, add incoming ones whose id is new
    Append,
}

/// Vacancies stored as pretty-printed JSON arrays in a directory
#[derive(Debug, Clone)]
pub struct JsonVacancyStorage {
    dir: PathBuf,
    batch: BatchName,
    mode: SaveMode,
}

impl JsonVacancyStorage {
    /// The directory is created on first save, not here.
    pub fn new(dir: impl Into<PathBuf>, batch: BatchName) -> Result<Self> {
        let batch = match batch {
            BatchName::Label(label) => BatchName::Label(normalize_label(&label)?),
            BatchName::Timestamped => BatchName::Timestamped,
        };
        Ok(Self {
            dir: dir.into(),
            batch,
            mode: SaveMode::default(),
        })
    }

    pub fn with_mode(mut self, mode: SaveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file `load_vacancies` reads, if one exists.
    pub async fn current_file(&self) -> Result<Option<PathBuf>> {
        match &self.batch {
            BatchName::Label(label) => {
                let path = self.dir.join(label);
                match tokio::fs::metadata(&path).await {
                    Ok(_) => Ok(Some(path)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(Error::storage_io(path, e)),
                }
            }
            BatchName::Timestamped => Ok(self.batch_files().await?.pop()),
        }
    }

    /// Timestamped batches in this directory, oldest first.
    pub async fn batch_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage_io(&self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::storage_io(&self.dir, e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(BATCH_PREFIX) && name.ends_with(EXTENSION) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn fresh_file(&self) -> PathBuf {
        match &self.batch {
            BatchName::Label(label) => self.dir.join(label),
            BatchName::Timestamped => self.dir.join(format!(
                "{}{}{}",
                BATCH_PREFIX,
                Utc::now().format("%Y%m%dT%H%M%S%6f"),
                EXTENSION
            )),
        }
    }

    async fn current_or_fresh_file(&self) -> Result<PathBuf> {
        Ok(match self.current_file().await? {
            Some(path) => path,
            None => self.fresh_file(),
        })
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<Vacancy>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage_io(path, e)),
        };
        serde_json::from_str(&content).map_err(|source| Error::StorageFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to a sibling temp file, sync, then rename over the target.
    async fn write_file(&self, path: &Path, vacancies: &[Vacancy]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage_io(&self.dir, e))?;

        let json = serde_json::to_vec_pretty(vacancies).map_err(|source| Error::StorageFormat {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written: std::io::Result<()> = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                debug!("Could not remove temp file {}: {}", tmp.display(), cleanup);
            }
            warn!("Failed to write {}: {}", path.display(), e);
            return Err(Error::storage_io(path, e));
        }

        debug!("Wrote {} bytes to {}", json.len(), path.display());
        Ok(())
    }
}

fn normalize_label(label: &str) -> Result<String> {
    let label = label.trim();
    if label.is_empty()
        || label.starts_with('.')
        || label.contains(|c: char| c == '/' || c == '\\')
    {
        return Err(Error::Config(format!(
            "storage label '{}' must be a plain file name",
            label
        )));
    }
    if label.ends_with(EXTENSION) {
        Ok(label.to_string())
    } else {
        Ok(format!("{}{}", label, EXTENSION))
    }
}

#[async_trait]
impl VacancyStorage for JsonVacancyStorage {
    async fn save_vacancies(&self, vacancies: &[Vacancy]) -> Result<()> {
        let records = match self.mode {
            SaveMode::Replace => vacancies.to_vec(),
            SaveMode::Append => {
                let mut records = self.load_vacancies().await?;
                let mut seen: HashSet<String> = records.iter().map(|v| v.id().to_string()).collect();
                records.extend(
                    vacancies
                        .iter()
                        .filter(|v| seen.insert(v.id().to_string()))
                        .cloned(),
                );
                records
            }
        };

        let path = self.fresh_file();
        self.write_file(&path, &records).await?;
        info!("Saved {} vacancies to {}", records.len(), path.display());
        Ok(())
    }

    async fn load_vacancies(&self) -> Result<Vec<Vacancy>> {
        match self.current_file().await? {
            Some(path) => {
                let vacancies = self.read_file(&path).await?;
                debug!("Loaded {} vacancies from {}", vacancies.len(), path.display());
                Ok(vacancies)
            }
            None => {
                debug!("Nothing saved yet in {}", self.dir.display());
                Ok(Vec::new())
            }
        }
    }

    async fn add_vacancy(&self, vacancy: &Vacancy) -> Result<bool> {
        let path = self.current_or_fresh_file().await?;
        let mut vacancies = self.read_file(&path).await?;
        if vacancies.iter().any(|v| v.id() == vacancy.id()) {
            debug!("Vacancy {} is already stored", vacancy.id());
            return Ok(false);
        }
        vacancies.push(vacancy.clone());
        self.write_file(&path, &vacancies).await?;
        Ok(true)
    }

    async fn remove_vacancy(&self, id: &str) -> Result<bool> {
        let Some(path) = self.current_file().await? else {
            return Ok(false);
        };
        let mut vacancies = self.read_file(&path).await?;
        let before = vacancies.len();
        vacancies.retain(|v| v.id() != id);
        if vacancies.len() == before {
            return Ok(false);
        }
        self.write_file(&path, &vacancies).await?;
        Ok(true)
    }

    async fn clear(&self) -> Result<()> {
        if let Some(path) = self.current_file().await? {
            self.write_file(&path, &[]).await?;
            info!("Cleared {}", path.display());
        }
        Ok(())
    }
}
