use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown_format,
};
use teloxide::{prelude::ResponseResult, utils::command::BotCommands};

use super::Command;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandHelp;

impl CommandTrait for CommandHelp {
    type A = EmptyArg;
    type B = EmptyArg;
    type C = EmptyArg;

    type Context = ();

    const NAME: &'static str = "help";
    const PLACEHOLDERS: &[&'static str] = &[];

    fn from_arguments(_: Option<Self::A>, _: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandHelp
    }

    async fn run0(&self, target: &CommandReplyTarget, _context: Self::Context) -> ResponseResult<()> {
        target
            .send_markdown_message(markdown_format!(
                "Browse the catalog with /start and pick an episode to get its link\\.\n\n{}",
                Command::descriptions().to_string()
            ))
            .await?;
        Ok(())
    }
}

impl From<CommandHelp> for crate::commands::Command {
    fn from(cmd: CommandHelp) -> Self {
        crate::commands::Command::Help(cmd)
    }
}
