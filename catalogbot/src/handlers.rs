use std::sync::Arc;

use botkit::{
    command_trait::CommandReplyTarget,
    markdown::{MarkdownString, MarkdownStringMessage},
    markdown_format, markdown_string,
    storage::unpack_callback_data,
};
use teloxide::{
    prelude::*,
    types::CallbackQuery,
    utils::command::{BotCommands, ParseError},
};

use crate::{
    bulk::run_bulk_update,
    commands::{Command, execute_command},
    config::Settings,
    links::{
        DriveLink, LinkShortenerTrait, extract_drive_url, mentions_drive_url, prepare_drive_link,
    },
    menus::{catalog_menu::show_screen, navigation::NavigationPath},
    storages::StorageTrait,
};

/// What to do with an incoming message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageRoute {
    Command(Command),
    UnknownCommand,
    InvalidCommand(String),
    /// Whole text of a message sent in bulk update mode
    BulkUpdate(String),
    ForwardedDriveLink(String),
    DriveLink(String),
    /// Holds `https://drive.google.com` but no usable url after it
    InvalidDriveLink,
    Ignore,
}

/// Classify a message. Commands win, then bulk update mode (it takes every other
/// text), then forwarded Drive links, then Drive links in plain text.
pub fn route_message(
    text: Option<&str>,
    caption: Option<&str>,
    forwarded: bool,
    bulk_mode: bool,
    bot_name: &str,
) -> MessageRoute {
    if let Some(text) = text.filter(|text| text.starts_with('/')) {
        return match Command::parse(text, bot_name) {
            Ok(cmd) => MessageRoute::Command(cmd),
            Err(ParseError::WrongBotName(_)) => MessageRoute::Ignore,
            Err(ParseError::UnknownCommand(_)) => MessageRoute::UnknownCommand,
            Err(e) => MessageRoute::InvalidCommand(e.to_string()),
        };
    }
    if let Some(text) = text.filter(|_| bulk_mode) {
        return MessageRoute::BulkUpdate(text.to_string());
    }
    if forwarded {
        let drive_url = [text, caption]
            .into_iter()
            .flatten()
            .find_map(extract_drive_url);
        if let Some(url) = drive_url {
            return MessageRoute::ForwardedDriveLink(url.to_string());
        }
        return MessageRoute::Ignore;
    }
    match text {
        Some(text) if mentions_drive_url(text) => match extract_drive_url(text) {
            Some(url) => MessageRoute::DriveLink(url.to_string()),
            None => MessageRoute::InvalidDriveLink,
        },
        _ => MessageRoute::Ignore,
    }
}

pub fn drive_link_reply(link: &DriveLink, forwarded: bool) -> MarkdownString {
    let title = if forwarded {
        markdown_string!("✅ *GPLink Generated from Forwarded Message\\!*")
    } else {
        markdown_string!("✅ *GPLink Generated Successfully\\!*")
    };
    title
        + markdown_format!(
            "\n\n📎 Google Drive: {}\n\n🔗 GPLink: {}\n\n_Use_ `/update <episode_id> {}` _to add it to the catalog_",
            &link.preview_url,
            &link.short_url,
            &link.short_url
        )
}

async fn reply_with_drive_link(
    target: &CommandReplyTarget,
    shortener: &Arc<dyn LinkShortenerTrait>,
    raw_url: &str,
    forwarded: bool,
) -> ResponseResult<()> {
    let progress = if forwarded {
        markdown_string!("🔄 Processing forwarded message with Google Drive link\\.\\.\\.")
    } else {
        markdown_string!("🔄 Generating GPLink\\.\\.\\.")
    };
    target.send_markdown_message(progress).await?;
    match prepare_drive_link(shortener.as_ref(), raw_url).await {
        Ok(link) => {
            log::info!("Shortened {} to {}", link.preview_url, link.short_url);
            target
                .send_markdown_link_message(drive_link_reply(&link, forwarded))
                .await?;
        }
        Err(e) => {
            log::error!("Failed to shorten Drive link {}: {}", raw_url, e);
            target
                .send_markdown_message(markdown_string!(
                    "❌ Failed to generate GPLink\\. Please check your API token\\."
                ))
                .await?;
        }
    }
    Ok(())
}

/// Handle text messages: commands, bulk updates and Drive links
pub async fn handle_text_message(
    bot: Bot,
    msg: Message,
    storage: Arc<dyn StorageTrait>,
    shortener: Arc<dyn LinkShortenerTrait>,
    settings: Arc<Settings>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let bulk_mode = storage
        .clone()
        .as_session_storage()
        .is_bulk_update(chat_id)
        .await;
    let route = route_message(
        msg.text(),
        msg.caption(),
        msg.forward_origin().is_some(),
        bulk_mode,
        &settings.bot_name,
    );
    let is_operator = settings.is_operator(msg.from.as_ref().map(|user| user.id.0));
    let target = CommandReplyTarget {
        bot: bot.clone(),
        chat_id,
        msg_id: None,
        callback_data_storage: storage.clone().as_callback_data_storage(),
    };

    match route {
        MessageRoute::Command(cmd) if cmd.is_operator_command() && !is_operator => {
            log::warn!("Operator command {} refused in chat {}", cmd, chat_id);
            target
                .send_markdown_message(markdown_string!(
                    "⛔ This command is available to operators only\\."
                ))
                .await?;
        }
        MessageRoute::Command(cmd) => {
            if let Err(e) = execute_command(&target, storage, shortener, cmd).await {
                log::error!("Failed to execute command: {}", e);
                bot.send_markdown_message(chat_id, markdown_format!("❌ Error: {}", e.to_string()))
                    .await?;
            }
        }
        MessageRoute::UnknownCommand => {
            target
                .send_markdown_message(markdown_string!(
                    "❓ Unknown command\\. Use /help to see available commands\\."
                ))
                .await?;
        }
        MessageRoute::InvalidCommand(err) => {
            log::warn!("Invalid command in chat {}: {}", chat_id, err);
            target
                .send_markdown_message(markdown_format!("❌ {}", err))
                .await?;
        }
        MessageRoute::BulkUpdate(text) if is_operator => {
            let catalog = storage.as_catalog_storage();
            run_bulk_update(&target, &catalog, &shortener, &text, settings.bulk_delay).await?;
        }
        MessageRoute::ForwardedDriveLink(url) if is_operator => {
            reply_with_drive_link(&target, &shortener, &url, true).await?;
        }
        MessageRoute::DriveLink(url) if is_operator => {
            reply_with_drive_link(&target, &shortener, &url, false).await?;
        }
        MessageRoute::InvalidDriveLink if is_operator => {
            target
                .send_markdown_message(markdown_string!(
                    "❌ No valid Google Drive URL found\\."
                ))
                .await?;
        }
        _ => {}
    }

    Ok(())
}

/// Handle callback queries from the catalog menu
pub async fn handle_callback_query(
    bot: Bot,
    q: CallbackQuery,
    storage: Arc<dyn StorageTrait>,
) -> ResponseResult<()> {
    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message else {
        return Ok(());
    };
    let Some(msg) = message.regular_message() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let Some(data) = &q.data else {
        return Ok(());
    };
    log::info!("Received callback data: {}", data);

    let target = CommandReplyTarget {
        bot: bot.clone(),
        chat_id,
        msg_id: Some(msg.id),
        callback_data_storage: storage.clone().as_callback_data_storage(),
    };
    let path = unpack_callback_data(&target.callback_data_storage, data)
        .await
        .and_then(|token| NavigationPath::decode(&token));
    let Some(path) = path else {
        log::warn!("Outdated callback data {} in chat {}", data, chat_id);
        target
            .send_markdown_message(markdown_string!(
                "⚠️ This menu is outdated\\. Send /start to open a new one\\."
            ))
            .await?;
        return Ok(());
    };

    if let Err(e) = show_screen(&target, &storage.as_catalog_storage(), &path).await {
        log::error!("Failed to show {} in chat {}: {}", path, chat_id, e);
        bot.send_markdown_message(chat_id, markdown_format!("❌ Error: {}", e.to_string()))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{command_done::CommandDone, command_start::CommandStart};

    const BOT: &str = "catalogbot";

    #[test]
    fn test_commands_come_first() {
        assert_eq!(
            route_message(Some("/start"), None, false, false, BOT),
            MessageRoute::Command(Command::Start(CommandStart))
        );
        assert_eq!(
            route_message(Some("/done"), None, false, true, BOT),
            MessageRoute::Command(Command::Done(CommandDone))
        );
        assert_eq!(
            route_message(Some("/nope"), None, false, true, BOT),
            MessageRoute::UnknownCommand
        );
        assert_eq!(
            route_message(Some("/start@otherbot"), None, false, false, BOT),
            MessageRoute::Ignore
        );
        assert!(matches!(
            route_message(Some("/update abc x"), None, false, false, BOT),
            MessageRoute::InvalidCommand(_)
        ));
    }

    #[test]
    fn test_bulk_mode_takes_plain_text() {
        let text = "1,https://drive.google.com/file/d/ABC/view";
        assert_eq!(
            route_message(Some(text), None, false, true, BOT),
            MessageRoute::BulkUpdate(text.to_string())
        );
        assert_eq!(
            route_message(Some(text), None, false, false, BOT),
            MessageRoute::DriveLink("https://drive.google.com/file/d/ABC/view".to_string())
        );
    }

    #[test]
    fn test_forwarded_caption_with_drive_link() {
        assert_eq!(
            route_message(
                None,
                Some("Episode 5 https://drive.google.com/file/d/XYZ/view"),
                true,
                false,
                BOT
            ),
            MessageRoute::ForwardedDriveLink("https://drive.google.com/file/d/XYZ/view".to_string())
        );
        assert_eq!(
            route_message(Some("just chatting"), None, true, false, BOT),
            MessageRoute::Ignore
        );
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            route_message(Some("hello"), None, false, false, BOT),
            MessageRoute::Ignore
        );
        assert_eq!(
            route_message(Some("drive.google.com/file/d/x"), None, false, false, BOT),
            MessageRoute::Ignore
        );
        assert_eq!(
            route_message(Some("here: https://drive.google.com"), None, false, false, BOT),
            MessageRoute::InvalidDriveLink
        );
        assert_eq!(route_message(None, None, false, true, BOT), MessageRoute::Ignore);
    }

    #[test]
    fn test_drive_link_reply() {
        let link = DriveLink {
            preview_url: "https://drive.google.com/file/d/ABC/preview".to_string(),
            short_url: "https://gplinks.co/xyz".to_string(),
        };
        let text = drive_link_reply(&link, false);
        assert!(
            text.as_str()
                .starts_with("✅ *GPLink Generated Successfully\\!*\n\n📎 Google Drive: https://drive\\.google\\.com/file/d/ABC/preview")
        );
        assert!(
            text.as_str()
                .contains("`/update <episode_id> https://gplinks\\.co/xyz`")
        );
        assert!(
            drive_link_reply(&link, true)
                .as_str()
                .starts_with("✅ *GPLink Generated from Forwarded Message\\!*")
        );
    }
}
