use botkit::{
    command_trait::{CommandReplyTarget, CommandTrait, EmptyArg},
    markdown_format,
};
use teloxide::prelude::ResponseResult;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandLive;

impl CommandTrait for CommandLive {
    type A = EmptyArg;
    type B = EmptyArg;
    type C = EmptyArg;

    type Context = ();

    const NAME: &'static str = "live";
    const PLACEHOLDERS: &[&'static str] = &[];

    fn from_arguments(_: Option<Self::A>, _: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandLive
    }

    async fn run0(&self, target: &CommandReplyTarget, _context: Self::Context) -> ResponseResult<()> {
        target
            .send_markdown_message(markdown_format!(
                "✅ Alive \\(catalogbot v{}\\)",
                env!("CARGO_PKG_VERSION")
            ))
            .await?;
        Ok(())
    }
}

impl From<CommandLive> for crate::commands::Command {
    fn from(cmd: CommandLive) -> Self {
        crate::commands::Command::Live(cmd)
    }
}
