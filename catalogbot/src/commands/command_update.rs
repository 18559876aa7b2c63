use std::sync::Arc;

use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown::MarkdownString,
    markdown_format,
};
use teloxide::prelude::ResponseResult;

use crate::storages::{CatalogEntry, CatalogStorageTrait, RepositoryError};

/// Set the url of an episode, verbatim
#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandUpdate {
    pub episode_id: Option<i64>,
    pub url: Option<String>,
}

impl CommandTrait for CommandUpdate {
    type A = i64;
    type B = String;
    type C = EmptyArg;

    type Context = Arc<dyn CatalogStorageTrait>;

    const NAME: &'static str = "update";
    const PLACEHOLDERS: &[&'static str] = &["<episode_id>", "<url>"];

    fn from_arguments(a: Option<Self::A>, b: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandUpdate {
            episode_id: a,
            url: b,
        }
    }

    fn param1(&self) -> Option<&Self::A> {
        self.episode_id.as_ref()
    }

    fn param2(&self) -> Option<&Self::B> {
        self.url.as_ref()
    }

    async fn run2(
        &self,
        target: &CommandReplyTarget,
        catalog: Self::Context,
        episode_id: &i64,
        url: &String,
    ) -> ResponseResult<()> {
        log::info!("Updating episode {} from chat {}", episode_id, target.chat_id);
        let result = catalog.update_episode_url(*episode_id, url).await;
        target
            .send_markdown_link_message(update_reply(*episode_id, url, result))
            .await?;
        Ok(())
    }
}

fn update_reply(
    episode_id: i64,
    url: &str,
    result: Result<Option<CatalogEntry>, RepositoryError>,
) -> MarkdownString {
    match result {
        Ok(Some(entry)) => markdown_format!(
            "✅ *Episode Updated Successfully\\!*\n\n📺 {}\n🎬 Episode {}: {}\n\n🔗 New URL: {}",
            &entry.series_name,
            entry.episode_number,
            &entry.episode_title,
            url
        ),
        Ok(None) => markdown_format!("❌ Episode ID `{}` not found in database\\.", episode_id),
        Err(e) => {
            log::error!("Failed to update episode {}: {}", episode_id, e);
            markdown_format!("❌ Error updating episode URL in database: {}", e.to_string())
        }
    }
}

impl From<CommandUpdate> for crate::commands::Command {
    fn from(cmd: CommandUpdate) -> Self {
        crate::commands::Command::Update(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storages::sample_catalog;

    #[test]
    fn test_parse_update_arguments() {
        let (cmd,) =
            CommandUpdate::parse_arguments("42 https://gplinks.co/abc".to_string()).unwrap();
        assert_eq!(cmd.episode_id, Some(42));
        assert_eq!(cmd.url.as_deref(), Some("https://gplinks.co/abc"));
        assert!(CommandUpdate::parse_arguments("x https://a".to_string()).is_err());
        assert_eq!(
            CommandUpdate::default().to_command_string(true),
            "/update <episode_id> <url>"
        );
    }

    #[tokio::test]
    async fn test_update_reply_for_found_and_missing_rows() {
        let catalog = sample_catalog();
        let found = catalog
            .update_episode_url(3, "https://gplinks.co/n2")
            .await;
        let text = update_reply(3, "https://gplinks.co/n2", found);
        assert_eq!(
            text.as_str(),
            "✅ *Episode Updated Successfully\\!*\n\n📺 Naruto\n🎬 Episode 2: Episode title 2\n\n🔗 New URL: https://gplinks\\.co/n2"
        );

        let missing = catalog.update_episode_url(404, "https://x").await;
        assert_eq!(
            update_reply(404, "https://x", missing).as_str(),
            "❌ Episode ID `404` not found in database\\."
        );
    }
}
