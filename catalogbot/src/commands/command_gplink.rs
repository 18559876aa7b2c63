use std::sync::Arc;

use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown_format, markdown_string,
};
use teloxide::prelude::ResponseResult;

use crate::links::LinkShortenerTrait;

/// Shorten any url, optionally with a custom alias
#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandGplink {
    pub url: Option<String>,
    pub alias: Option<String>,
}

impl CommandGplink {
    async fn shorten(
        &self,
        target: &CommandReplyTarget,
        shortener: Arc<dyn LinkShortenerTrait>,
        url: &str,
        alias: Option<&str>,
    ) -> ResponseResult<()> {
        target
            .send_markdown_message(markdown_string!("🔄 Generating GPLink\\.\\.\\."))
            .await?;
        match shortener.shorten(url, alias).await {
            Ok(short_url) => {
                target
                    .send_markdown_link_message(markdown_format!(
                        "✅ *GPLink Generated\\!*\n\n🔗 {}",
                        short_url
                    ))
                    .await?;
            }
            Err(e) => {
                log::error!("Failed to shorten {}: {}", url, e);
                target
                    .send_markdown_message(markdown_string!(
                        "❌ Failed to generate GPLink\\. Check your URL and API token\\."
                    ))
                    .await?;
            }
        }
        Ok(())
    }
}

impl CommandTrait for CommandGplink {
    type A = String;
    type B = String;
    type C = EmptyArg;

    type Context = Arc<dyn LinkShortenerTrait>;

    const NAME: &'static str = "gplink";
    const PLACEHOLDERS: &[&'static str] = &["<url>", "[alias]"];

    fn from_arguments(a: Option<Self::A>, b: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandGplink { url: a, alias: b }
    }

    fn param1(&self) -> Option<&Self::A> {
        self.url.as_ref()
    }

    fn param2(&self) -> Option<&Self::B> {
        self.alias.as_ref()
    }

    async fn run1(
        &self,
        target: &CommandReplyTarget,
        shortener: Self::Context,
        url: &String,
    ) -> ResponseResult<()> {
        self.shorten(target, shortener, url, None).await
    }

    async fn run2(
        &self,
        target: &CommandReplyTarget,
        shortener: Self::Context,
        url: &String,
        alias: &String,
    ) -> ResponseResult<()> {
        self.shorten(target, shortener, url, Some(alias)).await
    }
}

impl From<CommandGplink> for crate::commands::Command {
    fn from(cmd: CommandGplink) -> Self {
        crate::commands::Command::Gplink(cmd)
    }
}
