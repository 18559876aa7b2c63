use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::drive::normalize_drive_url;

pub const DEFAULT_GPLINKS_URL: &str = "https://api.gplinks.com";

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("link shortener is not configured")]
    NotConfigured,
    #[error("shortener request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("shortener returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("shortener returned an empty response")]
    EmptyResponse,
}

/// Turns a long url into a short redirect url
#[async_trait::async_trait]
pub trait LinkShortenerTrait: Send + Sync {
    async fn shorten(&self, long_url: &str, alias: Option<&str>)
    -> Result<String, ShortenerError>;
}

/// GPLinks client, text response format
#[derive(Clone)]
pub struct GplinksShortener {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GplinksShortener {
    /// Without a token every request fails with `ShortenerError::NotConfigured`
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: format!("{}/api", base_url.trim_end_matches('/')),
            token: token.filter(|token| !token.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

fn shorten_query<'a>(
    token: &'a str,
    long_url: &'a str,
    alias: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut query = vec![("api", token), ("url", long_url)];
    if let Some(alias) = alias {
        query.push(("alias", alias));
    }
    query.push(("format", "text"));
    query
}

/// The short url is the whole trimmed body of a successful response
fn interpret_response(status: StatusCode, body: &str) -> Result<String, ShortenerError> {
    if !status.is_success() {
        return Err(ShortenerError::Status {
            status,
            body: body.trim().to_string(),
        });
    }
    let short_url = body.trim();
    if short_url.is_empty() {
        return Err(ShortenerError::EmptyResponse);
    }
    Ok(short_url.to_string())
}

#[async_trait::async_trait]
impl LinkShortenerTrait for GplinksShortener {
    async fn shorten(&self, long_url: &str, alias: Option<&str>) -> Result<String, ShortenerError> {
        let token = self.token.as_deref().ok_or(ShortenerError::NotConfigured)?;
        let response = self
            .client
            .get(&self.api_url)
            .query(&shorten_query(token, long_url, alias))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

/// A Drive link ready to be stored: its preview url and the short url for it
#[derive(Debug, Clone, PartialEq)]
pub struct DriveLink {
    pub preview_url: String,
    pub short_url: String,
}

pub async fn prepare_drive_link(
    shortener: &dyn LinkShortenerTrait,
    raw_url: &str,
) -> Result<DriveLink, ShortenerError> {
    let preview_url = normalize_drive_url(raw_url);
    let short_url = shortener.shorten(&preview_url, None).await?;
    Ok(DriveLink {
        preview_url,
        short_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::FakeShortener;

    #[test]
    fn test_interpret_response() {
        assert_eq!(
            interpret_response(StatusCode::OK, "  https://gplinks.co/AbCd\n").unwrap(),
            "https://gplinks.co/AbCd"
        );
        assert!(matches!(
            interpret_response(StatusCode::OK, " \n"),
            Err(ShortenerError::EmptyResponse)
        ));
        assert!(matches!(
            interpret_response(StatusCode::FORBIDDEN, "bad token"),
            Err(ShortenerError::Status { status, .. }) if status == StatusCode::FORBIDDEN
        ));
    }

    #[test]
    fn test_shorten_query() {
        assert_eq!(
            shorten_query("tok", "https://x.y/a?b=c", None),
            vec![("api", "tok"), ("url", "https://x.y/a?b=c"), ("format", "text")]
        );
        assert_eq!(
            shorten_query("tok", "u", Some("ep1")),
            vec![("api", "tok"), ("url", "u"), ("alias", "ep1"), ("format", "text")]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_shortener_fails_without_request() {
        let shortener = GplinksShortener::new(DEFAULT_GPLINKS_URL, Some(String::new()));
        assert!(!shortener.is_configured());
        assert!(matches!(
            shortener.shorten("https://x", None).await,
            Err(ShortenerError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_prepare_drive_link_shortens_preview_url() {
        let shortener = FakeShortener::default();
        let link = prepare_drive_link(
            &shortener,
            "https://drive.google.com/open?id=XYZ123",
        )
        .await
        .unwrap();
        assert_eq!(
            link.preview_url,
            "https://drive.google.com/file/d/XYZ123/preview"
        );
        assert_eq!(link.short_url, "https://gplinks.co/s1");
        assert_eq!(shortener.requests(), vec![link.preview_url]);
    }
}
