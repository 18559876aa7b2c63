use std::sync::Arc;

use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown_string,
};
use teloxide::prelude::ResponseResult;

use crate::storages::SessionStorageTrait;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandBulkUpdate;

impl CommandTrait for CommandBulkUpdate {
    type A = EmptyArg;
    type B = EmptyArg;
    type C = EmptyArg;

    type Context = Arc<dyn SessionStorageTrait>;

    const NAME: &'static str = "bulkupdate";
    const PLACEHOLDERS: &[&'static str] = &[];

    fn from_arguments(_: Option<Self::A>, _: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandBulkUpdate
    }

    async fn run0(
        &self,
        target: &CommandReplyTarget,
        sessions: Self::Context,
    ) -> ResponseResult<()> {
        sessions.set_bulk_update(target.chat_id, true).await;
        log::info!("Bulk update mode on in chat {}", target.chat_id);
        target
            .send_markdown_message(markdown_string!(
                "📋 *Bulk Update Mode Activated*\n\n\
                Send episode updates in this format \\(one per line\\):\n\
                ```\nEPISODE_ID,GOOGLE_DRIVE_URL\nEPISODE_ID,GOOGLE_DRIVE_URL\n```\n\n\
                Google Drive links are shortened automatically, other links are saved as they are\\.\n\n\
                Send /done when finished\\."
            ))
            .await?;
        Ok(())
    }
}

impl From<CommandBulkUpdate> for crate::commands::Command {
    fn from(cmd: CommandBulkUpdate) -> Self {
        crate::commands::Command::BulkUpdate(cmd)
    }
}
