use std::{sync::Arc, time::Duration};

use botkit::{
    command_trait::CommandReplyTarget, markdown::MarkdownString, markdown_format,
};
use teloxide::prelude::ResponseResult;

use crate::{
    links::{LinkShortenerTrait, is_drive_url, prepare_drive_link},
    storages::CatalogStorageTrait,
};

/// Failures listed in the summary; the rest are only counted
pub const MAX_REPORTED_FAILURES: usize = 10;

/// One `episodeId,url` line
#[derive(Debug, Clone, PartialEq)]
pub struct BulkLine {
    pub episode_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    /// 1-based line number in the message
    pub line: usize,
    pub episode_id: Option<i64>,
    pub reason: String,
}

/// Result of one bulk update message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub updated: usize,
    pub failures: Vec<BulkFailure>,
}

/// Split on the first comma; both parts trimmed
pub fn parse_bulk_line(line: &str) -> Result<BulkLine, BulkFailure> {
    let failure = |episode_id, reason: &str| BulkFailure {
        line: 0,
        episode_id,
        reason: reason.to_string(),
    };
    let Some((id, url)) = line.split_once(',') else {
        return Err(failure(None, "expected episodeId,url"));
    };
    let Ok(episode_id) = id.trim().parse::<i64>() else {
        return Err(failure(None, "episode id is not a number"));
    };
    let url = url.trim();
    if url.is_empty() {
        return Err(failure(Some(episode_id), "url is empty"));
    }
    Ok(BulkLine {
        episode_id,
        url: url.to_string(),
    })
}

/// Non-blank lines with their 1-based numbers
fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

pub fn count_bulk_lines(text: &str) -> usize {
    numbered_lines(text).count()
}

async fn apply_bulk_line(
    catalog: &Arc<dyn CatalogStorageTrait>,
    shortener: &Arc<dyn LinkShortenerTrait>,
    line: &BulkLine,
) -> Result<(), String> {
    let url = if is_drive_url(&line.url) {
        prepare_drive_link(shortener.as_ref(), &line.url)
            .await
            .map_err(|e| format!("shortener failed: {}", e))?
            .short_url
    } else {
        line.url.clone()
    };
    match catalog.update_episode_url(line.episode_id, &url).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err("episode not found".to_string()),
        Err(e) => Err(format!("database error: {}", e)),
    }
}

/// Apply every line of a bulk update message, pausing `delay` after each one.
/// Lines are independent: a failing line does not stop the rest.
pub async fn process_bulk_update(
    catalog: &Arc<dyn CatalogStorageTrait>,
    shortener: &Arc<dyn LinkShortenerTrait>,
    text: &str,
    delay: Duration,
) -> BulkReport {
    let mut report = BulkReport::default();
    for (line_number, line) in numbered_lines(text) {
        let result = match parse_bulk_line(line) {
            Ok(parsed) => apply_bulk_line(catalog, shortener, &parsed)
                .await
                .map_err(|reason| BulkFailure {
                    line: line_number,
                    episode_id: Some(parsed.episode_id),
                    reason,
                }),
            Err(failure) => Err(BulkFailure {
                line: line_number,
                ..failure
            }),
        };
        match result {
            Ok(()) => report.updated += 1,
            Err(failure) => {
                log::warn!(
                    "Bulk update line {} failed: {}",
                    failure.line,
                    failure.reason
                );
                report.failures.push(failure);
            }
        }
        tokio::time::sleep(delay).await;
    }
    report
}

pub fn format_bulk_report(report: &BulkReport) -> MarkdownString {
    let mut text = markdown_format!(
        "📊 *Bulk Update Complete*\n\n✅ Success: {}\n❌ Errors: {}",
        report.updated,
        report.failures.len()
    );
    if report.failures.is_empty() {
        return text;
    }
    let lines = report
        .failures
        .iter()
        .take(MAX_REPORTED_FAILURES)
        .map(|failure| match failure.episode_id {
            Some(id) => markdown_format!(
                "• Line {} \\(episode {}\\): {}",
                failure.line,
                id,
                &failure.reason
            ),
            None => markdown_format!("• Line {}: {}", failure.line, &failure.reason),
        });
    text = text + markdown_format!("\n\n{}", MarkdownString::join(lines, &markdown_format!("\n")));
    let hidden = report.failures.len().saturating_sub(MAX_REPORTED_FAILURES);
    if hidden > 0 {
        text = text + markdown_format!("\n… and {} more", hidden);
    }
    text
}

/// Bulk update of one message, with progress and summary replies
pub async fn run_bulk_update(
    target: &CommandReplyTarget,
    catalog: &Arc<dyn CatalogStorageTrait>,
    shortener: &Arc<dyn LinkShortenerTrait>,
    text: &str,
    delay: Duration,
) -> ResponseResult<()> {
    let total = count_bulk_lines(text);
    if total == 0 {
        return Ok(());
    }
    log::info!("Bulk update of {} lines in chat {}", total, target.chat_id);
    target
        .send_markdown_message(markdown_format!("🔄 Processing {} episodes\\.\\.\\.", total))
        .await?;
    let report = process_bulk_update(catalog, shortener, text, delay).await;
    target
        .send_markdown_message(format_bulk_report(&report))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::ChatId;

    use crate::{
        links::FakeShortener,
        storages::{MemoryCatalogStorage, SessionStorage, SessionStorageTrait, entry},
    };

    fn catalog() -> Arc<dyn CatalogStorageTrait> {
        Arc::new(MemoryCatalogStorage::from_entries(vec![
            entry(1, "Anime", "Naruto", "Season 1", 1),
            entry(2, "Anime", "Naruto", "Season 1", 2),
        ]))
    }

    #[test]
    fn test_parse_bulk_line() {
        assert_eq!(
            parse_bulk_line(" 42 , https://x.y/a,b ").unwrap(),
            BulkLine {
                episode_id: 42,
                url: "https://x.y/a,b".to_string()
            }
        );
        assert!(parse_bulk_line("42 https://x.y").is_err());
        assert!(parse_bulk_line("abc,https://x.y").is_err());
        assert_eq!(parse_bulk_line("7, ").unwrap_err().episode_id, Some(7));
    }

    #[tokio::test]
    async fn test_one_success_and_one_error() {
        let catalog = catalog();
        let shortener: Arc<dyn LinkShortenerTrait> = Arc::new(FakeShortener::default());
        let text = "1,https://drive.google.com/file/d/ABC/view\n\n999,https://x.y/z";

        let report = process_bulk_update(&catalog, &shortener, text, Duration::ZERO).await;

        assert_eq!(report.updated, 1);
        assert_eq!(
            report.failures,
            vec![BulkFailure {
                line: 3,
                episode_id: Some(999),
                reason: "episode not found".to_string()
            }]
        );
        let updated = catalog.get_episode(1).await.unwrap().unwrap();
        assert_eq!(updated.url, "https://gplinks.co/s1");
    }

    #[tokio::test]
    async fn test_bulk_session_until_done() {
        let sessions = SessionStorage::new();
        let chat_id = ChatId(100);
        let catalog: Arc<dyn CatalogStorageTrait> = Arc::new(MemoryCatalogStorage::from_entries(
            vec![entry(5, "Anime", "Naruto", "Season 1", 5)],
        ));
        let shortener: Arc<dyn LinkShortenerTrait> = Arc::new(FakeShortener::default());

        sessions.set_bulk_update(chat_id, true).await;
        let text = "5,https://drive.google.com/file/d/ABC/view\nbad-line";
        let report = process_bulk_update(&catalog, &shortener, text, Duration::ZERO).await;

        assert_eq!(report.updated, 1);
        assert_eq!(
            report.failures,
            vec![BulkFailure {
                line: 2,
                episode_id: None,
                reason: "expected episodeId,url".to_string()
            }]
        );
        assert_eq!(
            catalog.get_episode(5).await.unwrap().unwrap().url,
            "https://gplinks.co/s1"
        );
        assert!(sessions.is_bulk_update(chat_id).await);

        assert!(sessions.set_bulk_update(chat_id, false).await);
        assert!(!sessions.is_bulk_update(chat_id).await);
    }

    #[tokio::test]
    async fn test_non_drive_urls_are_stored_as_given() {
        let catalog = catalog();
        let shortener = Arc::new(FakeShortener::default());
        let dyn_shortener: Arc<dyn LinkShortenerTrait> = shortener.clone();

        let report = process_bulk_update(
            &catalog,
            &dyn_shortener,
            "2,https://gplinks.co/ready",
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.updated, 1);
        assert!(shortener.requests().is_empty());
        let stored = catalog.get_episode(2).await.unwrap().unwrap();
        assert_eq!(stored.url, "https://gplinks.co/ready");
    }

    #[tokio::test]
    async fn test_shortener_failure_leaves_row_untouched() {
        let catalog = catalog();
        let shortener: Arc<dyn LinkShortenerTrait> = Arc::new(FakeShortener::failing());

        let report = process_bulk_update(
            &catalog,
            &shortener,
            "1,https://drive.google.com/open?id=QQ",
            Duration::ZERO,
        )
        .await;

        assert_eq!(report.updated, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.starts_with("shortener failed"));
        assert_eq!(catalog.get_episode(1).await.unwrap().unwrap().url, "");
    }

    #[test]
    fn test_report_lists_at_most_ten_failures() {
        let report = BulkReport {
            updated: 2,
            failures: (1..=12)
                .map(|line| BulkFailure {
                    line,
                    episode_id: None,
                    reason: "expected episodeId,url".to_string(),
                })
                .collect(),
        };
        let text = format_bulk_report(&report);
        assert!(
            text.as_str()
                .starts_with("📊 *Bulk Update Complete*\n\n✅ Success: 2\n❌ Errors: 12")
        );
        assert!(text.as_str().contains("• Line 10: expected episodeId,url"));
        assert!(!text.as_str().contains("• Line 11:"));
        assert!(text.as_str().ends_with("… and 2 more"));
    }

    #[test]
    fn test_count_skips_blank_lines() {
        assert_eq!(count_bulk_lines("1,a\n   \n2,b\n"), 2);
        assert_eq!(count_bulk_lines("\n\n"), 0);
    }
}
