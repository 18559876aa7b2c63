pub mod command_bulk_update;
pub mod command_done;
pub mod command_gplink;
pub mod command_help;
pub mod command_live;
pub mod command_start;
pub mod command_update;

use std::sync::Arc;

use botkit::command_trait::{CommandReplyTarget, CommandTrait};
use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    commands::{
        command_bulk_update::CommandBulkUpdate, command_done::CommandDone,
        command_gplink::CommandGplink, command_help::CommandHelp, command_live::CommandLive,
        command_start::CommandStart, command_update::CommandUpdate,
    },
    links::LinkShortenerTrait,
    storages::StorageTrait,
};

/// Bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(
        description = "browse the catalog",
        parse_with = CommandStart::parse_arguments
    )]
    Start(CommandStart),
    #[command(
        description = "display this help",
        parse_with = CommandHelp::parse_arguments
    )]
    Help(CommandHelp),
    #[command(
        description = "check that the bot is running",
        parse_with = CommandLive::parse_arguments
    )]
    Live(CommandLive),
    #[command(
        description = "set the link of an episode: /update <episode_id> <url>",
        parse_with = CommandUpdate::parse_arguments
    )]
    Update(CommandUpdate),
    #[command(
        description = "shorten a link: /gplink <url> [alias]",
        parse_with = CommandGplink::parse_arguments
    )]
    Gplink(CommandGplink),
    #[command(
        description = "update many episodes, one episode_id,url per line",
        parse_with = CommandBulkUpdate::parse_arguments
    )]
    BulkUpdate(CommandBulkUpdate),
    #[command(
        description = "leave bulk update mode",
        parse_with = CommandDone::parse_arguments
    )]
    Done(CommandDone),
}

impl Command {
    /// Commands that change the catalog or operator state
    pub fn is_operator_command(&self) -> bool {
        matches!(
            self,
            Command::Update(_) | Command::Gplink(_) | Command::BulkUpdate(_) | Command::Done(_)
        )
    }
}

impl From<Command> for String {
    fn from(val: Command) -> Self {
        match val {
            Command::Start(start) => start.to_command_string(true),
            Command::Help(help) => help.to_command_string(true),
            Command::Live(live) => live.to_command_string(true),
            Command::Update(update) => update.to_command_string(true),
            Command::Gplink(gplink) => gplink.to_command_string(true),
            Command::BulkUpdate(bulk_update) => bulk_update.to_command_string(true),
            Command::Done(done) => done.to_command_string(true),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}

/// Execute a single command
pub async fn execute_command(
    target: &CommandReplyTarget,
    storage: Arc<dyn StorageTrait>,
    shortener: Arc<dyn LinkShortenerTrait>,
    cmd: Command,
) -> ResponseResult<()> {
    log::info!("Executing {} in chat {}", cmd, target.chat_id);
    match cmd {
        Command::Start(start) => {
            start.run(target, storage.as_catalog_storage()).await?;
        }
        Command::Help(help) => {
            help.run(target, ()).await?;
        }
        Command::Live(live) => {
            live.run(target, ()).await?;
        }
        Command::Update(update) => {
            update.run(target, storage.as_catalog_storage()).await?;
        }
        Command::Gplink(gplink) => {
            gplink.run(target, shortener).await?;
        }
        Command::BulkUpdate(bulk_update) => {
            bulk_update
                .run(target, storage.as_session_storage())
                .await?;
        }
        Command::Done(done) => {
            done.run(target, storage.as_session_storage()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/start", "catalogbot").unwrap(),
            Command::Start(CommandStart)
        );
        assert_eq!(
            Command::parse("/bulkupdate", "catalogbot").unwrap(),
            Command::BulkUpdate(CommandBulkUpdate)
        );
        assert_eq!(
            Command::parse("/update@catalogbot 42 https://x.y", "catalogbot").unwrap(),
            Command::Update(CommandUpdate {
                episode_id: Some(42),
                url: Some("https://x.y".to_string()),
            })
        );
        assert!(Command::parse("/unknown", "catalogbot").is_err());
        assert!(Command::parse("/done now", "catalogbot").is_err());
    }

    #[test]
    fn test_operator_commands() {
        assert!(!Command::Start(CommandStart).is_operator_command());
        assert!(!Command::Live(CommandLive).is_operator_command());
        assert!(Command::Done(CommandDone).is_operator_command());
        assert!(Command::Update(CommandUpdate::default()).is_operator_command());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Command::Update(CommandUpdate::default()).to_string(),
            "/update <episode_id> <url>"
        );
    }
}
