use std::sync::Arc;

use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown_string,
};
use teloxide::prelude::ResponseResult;

use crate::storages::SessionStorageTrait;

/// Leave bulk update mode
#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandDone;

impl CommandTrait for CommandDone {
    type A = EmptyArg;
    type B = EmptyArg;
    type C = EmptyArg;

    type Context = Arc<dyn SessionStorageTrait>;

    const NAME: &'static str = "done";
    const PLACEHOLDERS: &[&'static str] = &[];

    fn from_arguments(_: Option<Self::A>, _: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandDone
    }

    async fn run0(
        &self,
        target: &CommandReplyTarget,
        sessions: Self::Context,
    ) -> ResponseResult<()> {
        if sessions.set_bulk_update(target.chat_id, false).await {
            log::info!("Bulk update mode off in chat {}", target.chat_id);
        }
        target
            .send_markdown_message(markdown_string!("✅ Bulk update mode deactivated\\."))
            .await?;
        Ok(())
    }
}

impl From<CommandDone> for crate::commands::Command {
    fn from(cmd: CommandDone) -> Self {
        crate::commands::Command::Done(cmd)
    }
}
