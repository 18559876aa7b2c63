use reqwest::{Client, RequestBuilder, Response, header};
use serde::{Deserialize, de::DeserializeOwned};

use super::catalog_storage::{
    CatalogEntry, CatalogStorageTrait, EpisodeSummary, RepositoryError, distinct, null_as_empty,
};

pub const CATALOG_TABLE: &str = "media_library";

type Query = Vec<(&'static str, String)>;

/// Catalog served by the PostgREST endpoint of a Supabase project
#[derive(Clone)]
pub struct PostgrestCatalogStorage {
    client: Client,
    table_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CategoryRow {
    #[serde(default, deserialize_with = "null_as_empty")]
    category: String,
}

#[derive(Deserialize)]
struct SeriesRow {
    #[serde(default, deserialize_with = "null_as_empty")]
    series_name: String,
}

#[derive(Deserialize)]
struct SeasonRow {
    #[serde(default, deserialize_with = "null_as_empty")]
    season_name: String,
}

impl PostgrestCatalogStorage {
    /// `project_url` is the project base url, e.g. `https://xyz.supabase.co`
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            table_url: table_url(project_url),
            api_key: api_key.into(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>, RepositoryError> {
        log::debug!("Catalog query: {:?}", query);
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&query)
            .send()
            .await?;
        read_rows(response).await
    }
}

fn table_url(project_url: &str) -> String {
    format!(
        "{}/rest/v1/{}",
        project_url.trim_end_matches('/'),
        CATALOG_TABLE
    )
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, RepositoryError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RepositoryError::Rejected {
            status,
            message: body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn categories_query() -> Query {
    vec![
        ("select", "category".to_string()),
        ("category", "neq.".to_string()),
        ("order", "category.asc".to_string()),
    ]
}

fn series_query(category: &str) -> Query {
    vec![
        ("select", "series_name".to_string()),
        ("category", eq(category)),
        ("order", "series_name.asc".to_string()),
    ]
}

fn seasons_query(category: &str, series_name: &str) -> Query {
    vec![
        ("select", "season_name".to_string()),
        ("category", eq(category)),
        ("series_name", eq(series_name)),
        ("order", "season_name.asc".to_string()),
    ]
}

fn episodes_query(category: &str, series_name: &str, season_name: &str) -> Query {
    vec![
        ("select", "id,episode_number,episode_title".to_string()),
        ("category", eq(category)),
        ("series_name", eq(series_name)),
        ("season_name", eq(season_name)),
        ("order", "episode_number.asc,id.asc".to_string()),
    ]
}

fn episode_query(id: i64) -> Query {
    vec![("select", "*".to_string()), ("id", eq(&id.to_string()))]
}

#[async_trait::async_trait]
impl CatalogStorageTrait for PostgrestCatalogStorage {
    async fn list_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<CategoryRow> = self.fetch_rows(categories_query()).await?;
        Ok(distinct(
            rows.into_iter()
                .map(|row| row.category)
                .filter(|category| !category.is_empty()),
        ))
    }

    async fn list_series(&self, category: &str) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<SeriesRow> = self.fetch_rows(series_query(category)).await?;
        Ok(distinct(rows.into_iter().map(|row| row.series_name)))
    }

    async fn list_seasons(
        &self,
        category: &str,
        series_name: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<SeasonRow> = self
            .fetch_rows(seasons_query(category, series_name))
            .await?;
        Ok(distinct(rows.into_iter().map(|row| row.season_name)))
    }

    async fn list_episodes(
        &self,
        category: &str,
        series_name: &str,
        season_name: &str,
    ) -> Result<Vec<EpisodeSummary>, RepositoryError> {
        self.fetch_rows(episodes_query(category, series_name, season_name))
            .await
    }

    async fn get_episode(&self, id: i64) -> Result<Option<CatalogEntry>, RepositoryError> {
        let rows: Vec<CatalogEntry> = self.fetch_rows(episode_query(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_episode_url(
        &self,
        id: i64,
        url: &str,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        log::info!("Updating url of episode {}", id);
        let response = self
            .authorized(self.client.patch(&self.table_url))
            .header("Prefer", "return=representation")
            .query(&[("id", eq(&id.to_string()))])
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        let rows: Vec<CatalogEntry> = read_rows(response).await?;
        Ok(rows.into_iter().next())
    }
}
