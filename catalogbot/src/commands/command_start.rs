use std::sync::Arc;

use botkit::command_trait::{CommandReplyTarget, CommandTrait, EmptyArg};
use teloxide::prelude::ResponseResult;

use crate::{
    menus::{catalog_menu::show_screen, navigation::NavigationPath},
    storages::CatalogStorageTrait,
};

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CommandStart;

impl CommandTrait for CommandStart {
    type A = EmptyArg;
    type B = EmptyArg;
    type C = EmptyArg;

    type Context = Arc<dyn CatalogStorageTrait>;

    const NAME: &'static str = "start";
    const PLACEHOLDERS: &[&'static str] = &[];

    fn from_arguments(_: Option<Self::A>, _: Option<Self::B>, _: Option<Self::C>) -> Self {
        CommandStart
    }

    async fn run0(
        &self,
        target: &CommandReplyTarget,
        catalog: Self::Context,
    ) -> ResponseResult<()> {
        show_screen(target, &catalog, &NavigationPath::Root).await
    }
}

impl From<CommandStart> for crate::commands::Command {
    fn from(cmd: CommandStart) -> Self {
        crate::commands::Command::Start(cmd)
    }
}
