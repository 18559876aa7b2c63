use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
    sync::Arc,
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

/// One playable entry of the catalog (a row of `media_library`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub series_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub season_name: String,
    #[serde(default)]
    pub episode_number: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub episode_title: String,
    /// Empty until a link has been set
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

/// Row shape used for the episode list of a season
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EpisodeSummary {
    pub id: i64,
    #[serde(default)]
    pub episode_number: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub episode_title: String,
}

impl From<&CatalogEntry> for EpisodeSummary {
    fn from(entry: &CatalogEntry) -> Self {
        EpisodeSummary {
            id: entry.id,
            episode_number: entry.episode_number,
            episode_title: entry.episode_title.clone(),
        }
    }
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Failure to talk to the catalog store. A missing row is not an error: lookups
/// return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog query rejected ({status}): {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to save catalog file: {0}")]
    Persist(#[from] std::io::Error),
}

/// Read/update operations on the media catalog
#[async_trait::async_trait]
pub trait CatalogStorageTrait: Send + Sync {
    /// Distinct non-empty categories, ascending
    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError>;

    /// Distinct series of a category
    async fn list_series(&self, category: &str) -> Result<Vec<String>, RepositoryError>;

    /// Distinct seasons of a series
    async fn list_seasons(
        &self,
        category: &str,
        series_name: &str,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Episodes of a season, ascending by episode number
    async fn list_episodes(
        &self,
        category: &str,
        series_name: &str,
        season_name: &str,
    ) -> Result<Vec<EpisodeSummary>, RepositoryError>;

    async fn get_episode(&self, id: i64) -> Result<Option<CatalogEntry>, RepositoryError>;

    /// Set the url of an episode and return the updated row
    async fn update_episode_url(
        &self,
        id: i64,
        url: &str,
    ) -> Result<Option<CatalogEntry>, RepositoryError>;
}

/// Keeps the first occurrence of every value, in input order
pub(crate) fn distinct(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("cannot read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("catalog file {path} contains id {id} more than once")]
    DuplicateId { path: PathBuf, id: i64 },
}

/// Serializable catalog contents, as stored in a YAML file
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CatalogData {
    pub entries: Vec<CatalogEntry>,
}

/// Catalog kept in process memory, optionally backed by a YAML file that is
/// rewritten after every update
#[derive(Clone, Default)]
pub struct MemoryCatalogStorage {
    entries: Arc<Mutex<Vec<CatalogEntry>>>,
    file: Option<PathBuf>,
}

impl MemoryCatalogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            file: None,
        }
    }

    /// Load the catalog from a YAML file; updates are written back to it
    pub async fn load_yaml(path: PathBuf) -> Result<Self, CatalogLoadError> {
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| CatalogLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let data: CatalogData =
            serde_yaml::from_str(&content).map_err(|source| CatalogLoadError::Yaml {
                path: path.clone(),
                source,
            })?;

        let mut ids = HashSet::new();
        if let Some(entry) = data.entries.iter().find(|entry| !ids.insert(entry.id)) {
            return Err(CatalogLoadError::DuplicateId {
                path,
                id: entry.id,
            });
        }

        Ok(Self {
            entries: Arc::new(Mutex::new(data.entries)),
            file: Some(path),
        })
    }

    async fn save(&self, entries: &[CatalogEntry]) -> Result<(), RepositoryError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let data = CatalogData {
            entries: entries.to_vec(),
        };
        let content = serde_yaml::to_string(&data).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize catalog to YAML: {}", e),
            )
        })?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStorageTrait for MemoryCatalogStorage {
    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = self.entries.lock().await;
        let categories: BTreeSet<String> = entries
            .iter()
            .filter(|entry| !entry.category.is_empty())
            .map(|entry| entry.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn list_series(&self, category: &str) -> Result<Vec<String>, RepositoryError> {
        let entries = self.entries.lock().await;
        let series: BTreeSet<String> = entries
            .iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.series_name.clone())
            .collect();
        Ok(series.into_iter().collect())
    }

    async fn list_seasons(
        &self,
        category: &str,
        series_name: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let entries = self.entries.lock().await;
        let seasons: BTreeSet<String> = entries
            .iter()
            .filter(|entry| entry.category == category && entry.series_name == series_name)
            .map(|entry| entry.season_name.clone())
            .collect();
        Ok(seasons.into_iter().collect())
    }

    async fn list_episodes(
        &self,
        category: &str,
        series_name: &str,
        season_name: &str,
    ) -> Result<Vec<EpisodeSummary>, RepositoryError> {
        let entries = self.entries.lock().await;
        let mut episodes: Vec<EpisodeSummary> = entries
            .iter()
            .filter(|entry| {
                entry.category == category
                    && entry.series_name == series_name
                    && entry.season_name == season_name
            })
            .map(EpisodeSummary::from)
            .collect();
        episodes.sort_by_key(|episode| (episode.episode_number, episode.id));
        Ok(episodes)
    }

    async fn get_episode(&self, id: i64) -> Result<Option<CatalogEntry>, RepositoryError> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().find(|entry| entry.id == id).cloned())
    }

    async fn update_episode_url(
        &self,
        id: i64,
        url: &str,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        // Lock is held through the file write so concurrent updates are saved in order
        let mut entries = self.entries.lock().await;
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut entries[index].url, url.to_string());
        if let Err(e) = self.save(&entries).await {
            entries[index].url = previous;
            return Err(e);
        }
        Ok(Some(entries[index].clone()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn entry(
        id: i64,
        category: &str,
        series_name: &str,
        season_name: &str,
        episode_number: i64,
    ) -> CatalogEntry {
        CatalogEntry {
            id,
            category: category.to_string(),
            series_name: series_name.to_string(),
            season_name: season_name.to_string(),
            episode_number,
            episode_title: format!("Episode title {}", episode_number),
            url: String::new(),
        }
    }

    pub fn sample_catalog() -> MemoryCatalogStorage {
        MemoryCatalogStorage::from_entries(vec![
            entry(1, "Drama", "Dark", "Season 1", 2),
            entry(2, "Anime", "Naruto", "Season 1", 1),
            entry(3, "Anime", "Naruto", "Season 1", 2),
            entry(4, "", "Orphan", "Season 1", 1),
            entry(5, "Anime", "Bleach", "Season 2", 1),
            entry(6, "Anime", "Naruto", "Season 2", 1),
            entry(7, "Drama", "Dark", "Season 1", 1),
        ])
    }

    #[tokio::test]
    async fn test_list_categories_distinct_sorted_without_empty() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.list_categories().await.unwrap(),
            vec!["Anime".to_string(), "Drama".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_series_and_seasons() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.list_series("Anime").await.unwrap(),
            vec!["Bleach".to_string(), "Naruto".to_string()]
        );
        assert_eq!(
            catalog.list_seasons("Anime", "Naruto").await.unwrap(),
            vec!["Season 1".to_string(), "Season 2".to_string()]
        );
        assert!(catalog.list_series("Missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_episodes_sorted_by_number() {
        let catalog = sample_catalog();
        let episodes = catalog
            .list_episodes("Drama", "Dark", "Season 1")
            .await
            .unwrap();
        let numbers: Vec<i64> = episodes.iter().map(|e| e.episode_number).collect();
        let ids: Vec<i64> = episodes.iter().map(|e| e.id).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(ids, vec![7, 1]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let catalog = sample_catalog();
        assert!(
            catalog
                .update_episode_url(999, "https://x")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_known_id_returns_updated_row() {
        let catalog = sample_catalog();
        let updated = catalog
            .update_episode_url(3, "https://gplinks.co/new")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, 3);
        assert_eq!(updated.url, "https://gplinks.co/new");
        let stored = catalog.get_episode(3).await.unwrap().unwrap();
        assert_eq!(stored.url, "https://gplinks.co/new");
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let values = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from);
        assert_eq!(distinct(values), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_entry_null_fields_read_as_empty() {
        let json = r#"{"id": 42, "category": "Anime", "series_name": "Naruto",
            "season_name": "Season 1", "episode_number": 3, "episode_title": null, "url": null}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.url, "");
        assert_eq!(entry.episode_title, "");
    }

    #[tokio::test]
    async fn test_yaml_file_round_trip_and_write_back() {
        let path = std::env::temp_dir().join(format!(
            "catalogbot-test-{}-{}.yaml",
            std::process::id(),
            line!()
        ));
        let yaml = "entries:\n  - id: 10\n    category: Anime\n    series_name: One Piece\n    season_name: East Blue\n    episode_number: 1\n    episode_title: Romance Dawn\n    url: ''\n";
        tokio::fs::write(&path, yaml).await.unwrap();

        let catalog = MemoryCatalogStorage::load_yaml(path.clone()).await.unwrap();
        assert_eq!(catalog.list_categories().await.unwrap(), vec!["Anime"]);
        catalog
            .update_episode_url(10, "https://gplinks.co/op1")
            .await
            .unwrap();

        let reloaded = MemoryCatalogStorage::load_yaml(path.clone()).await.unwrap();
        let entry = reloaded.get_episode(10).await.unwrap().unwrap();
        assert_eq!(entry.url, "https://gplinks.co/op1");
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_back_keeps_previous_url() {
        let path = std::env::temp_dir().join(format!(
            "catalogbot-test-{}-{}.yaml",
            std::process::id(),
            line!()
        ));
        let yaml = "entries:\n  - id: 1\n    category: Anime\n    url: https://old\n";
        tokio::fs::write(&path, yaml).await.unwrap();
        let catalog = MemoryCatalogStorage::load_yaml(path.clone()).await.unwrap();

        // A directory in place of the file makes the write fail
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        let result = catalog.update_episode_url(1, "https://new").await;
        assert!(matches!(result, Err(RepositoryError::Persist(_))));
        let entry = catalog.get_episode(1).await.unwrap().unwrap();
        assert_eq!(entry.url, "https://old");
        tokio::fs::remove_dir(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_yaml_duplicate_ids_rejected() {
        let path = std::env::temp_dir().join(format!(
            "catalogbot-test-{}-{}.yaml",
            std::process::id(),
            line!()
        ));
        let yaml = "entries:\n  - id: 1\n    category: A\n  - id: 1\n    category: B\n";
        tokio::fs::write(&path, yaml).await.unwrap();
        let result = MemoryCatalogStorage::load_yaml(path.clone()).await;
        assert!(matches!(
            result,
            Err(CatalogLoadError::DuplicateId { id: 1, .. })
        ));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
