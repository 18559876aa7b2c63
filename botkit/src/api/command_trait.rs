use std::{fmt::Display, str::FromStr, sync::Arc};

use teloxide::{
    Bot,
    payloads::{EditMessageReplyMarkupSetters, SendMessageSetters},
    prelude::{Requester, ResponseResult},
    types::{ChatId, LinkPreviewOptions, Message, MessageId},
    utils::command::ParseError,
};

use crate::{
    api::{
        markdown::string::{MarkdownString, MarkdownStringMessage},
        storage::callback_data_storage::{ButtonData, CallbackDataStorageTrait, pack_callback_data},
    },
    markdown_format,
};

/// Conversion of a single whitespace-separated command argument
pub trait ParseCommandArg: Sized {
    /// Returns `Ok(None)` for an absent (empty) argument
    fn parse_command_arg(s: &str) -> Result<Option<Self>, ParseError>;

    /// Text form of the argument, as it would be typed after the command
    fn to_command_arg(&self) -> String;
}

impl<T> ParseCommandArg for T
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn parse_command_arg(s: &str) -> Result<Option<Self>, ParseError> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<T>()
            .map(Some)
            .map_err(|e| ParseError::Custom(Box::new(e)))
    }

    fn to_command_arg(&self) -> String {
        self.to_string()
    }
}

/// Placeholder for an unused argument slot: rejects any value
#[derive(Default, Debug, Clone, PartialEq)]
pub struct EmptyArg;

impl ParseCommandArg for EmptyArg {
    fn parse_command_arg(s: &str) -> Result<Option<Self>, ParseError> {
        if s.is_empty() {
            Ok(None)
        } else {
            Err(ParseError::TooManyArguments {
                expected: 0,
                found: 1,
                message: format!("Unexpected argument `{}`", s),
            })
        }
    }

    fn to_command_arg(&self) -> String {
        String::new()
    }
}

/// Splits command arguments on spaces; `\ ` keeps a space inside an argument
/// and `\\` is a literal backslash. Only the first line is considered.
fn split(arg: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = arg.lines().next().unwrap_or("").chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('\\') => {
                    current.push('\\');
                    chars.next();
                }
                Some(' ') => {
                    current.push(' ');
                    chars.next();
                }
                _ => current.push('\\'),
            },
            ' ' | '\t' => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

fn escape_arg(arg: &str) -> String {
    arg.replace('\\', "\\\\").replace(' ', "\\ ")
}

fn get<A: ParseCommandArg>(args: &[String], pos: usize) -> Result<Option<A>, ParseError> {
    let arg = args.get(pos).map(|s| s.as_str()).unwrap_or("");
    A::parse_command_arg(arg)
}

/// Where a command replies: the chat, and the message to edit when the command
/// was triggered from an inline button.
#[derive(Clone)]
pub struct CommandReplyTarget {
    pub bot: Bot,
    pub chat_id: ChatId,
    pub msg_id: Option<MessageId>,
    pub callback_data_storage: Arc<dyn CallbackDataStorageTrait>,
}

impl CommandReplyTarget {
    /// Edit the originating message if there is one, otherwise send a new message
    pub async fn markdown_message(&self, text: MarkdownString) -> ResponseResult<Message> {
        self.bot
            .markdown_message(self.chat_id, self.msg_id, text)
            .await
    }

    /// Always send a new message
    pub async fn send_markdown_message(&self, text: MarkdownString) -> ResponseResult<Message> {
        self.bot.send_markdown_message(self.chat_id, text).await
    }

    /// Send a new message without a link preview card
    pub async fn send_markdown_link_message(
        &self,
        text: MarkdownString,
    ) -> ResponseResult<Message> {
        self.bot
            .send_markdown_message(self.chat_id, text)
            .link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            })
            .await
    }

    /// Show `text` with an inline keyboard.
    ///
    /// The message id is needed to pack callback data, so the text goes out first
    /// and the keyboard is attached with a second request.
    pub async fn markdown_menu_message<R, B>(
        &self,
        text: MarkdownString,
        rows: impl IntoIterator<Item = R>,
    ) -> ResponseResult<Message>
    where
        R: IntoIterator<Item = B>,
        B: Into<ButtonData>,
    {
        let msg = self.markdown_message(text).await?;
        let keyboard =
            pack_callback_data(&self.callback_data_storage, self.chat_id, msg.id.0, rows).await;
        self.bot
            .edit_message_reply_markup(self.chat_id, msg.id)
            .reply_markup(keyboard)
            .await
    }
}

/// A bot command with up to three positional arguments.
///
/// `run` dispatches on how many leading arguments are present, so a command can
/// show a usage hint (or a menu) when called bare and act when called complete.
#[allow(async_fn_in_trait)]
pub trait CommandTrait: Sized + Clone + Default {
    type A: ParseCommandArg;
    type B: ParseCommandArg;
    type C: ParseCommandArg;

    type Context;

    const NAME: &'static str;
    const PLACEHOLDERS: &[&'static str];

    fn from_arguments(a: Option<Self::A>, b: Option<Self::B>, c: Option<Self::C>) -> Self;

    fn param1(&self) -> Option<&Self::A> {
        None
    }
    fn param2(&self) -> Option<&Self::B> {
        None
    }
    fn param3(&self) -> Option<&Self::C> {
        None
    }

    /// Signature compatible with `#[command(parse_with = ...)]` of `BotCommands`
    fn parse_arguments(args: String) -> Result<(Self,), ParseError> {
        let args = split(&args);
        if args.len() > 3 {
            return Err(ParseError::TooManyArguments {
                expected: Self::PLACEHOLDERS.len(),
                found: args.len(),
                message: format!("/{} takes at most {} arguments", Self::NAME, 3),
            });
        }
        let a = get::<Self::A>(&args, 0)?;
        let b = get::<Self::B>(&args, 1)?;
        let c = get::<Self::C>(&args, 2)?;
        Ok((Self::from_arguments(a, b, c),))
    }

    /// Render the command back to text. Missing arguments are shown as
    /// placeholders when `with_placeholders` is set, otherwise the text stops there.
    fn to_command_string(&self, with_placeholders: bool) -> String {
        let values = [
            self.param1().map(|a| a.to_command_arg()),
            self.param2().map(|b| b.to_command_arg()),
            self.param3().map(|c| c.to_command_arg()),
        ];
        let mut parts = vec![format!("/{}", Self::NAME)];
        for (idx, value) in values.into_iter().enumerate() {
            match value {
                Some(value) => parts.push(escape_arg(&value)),
                None if with_placeholders => {
                    if let Some(placeholder) = Self::PLACEHOLDERS.get(idx) {
                        parts.push(placeholder.to_string());
                    }
                }
                None => break,
            }
        }
        parts.join(" ")
    }

    async fn run(&self, target: &CommandReplyTarget, context: Self::Context) -> ResponseResult<()> {
        match (self.param1(), self.param2(), self.param3()) {
            (None, _, _) => self.run0(target, context).await,
            (Some(a), None, _) => self.run1(target, context, a).await,
            (Some(a), Some(b), None) => self.run2(target, context, a, b).await,
            (Some(a), Some(b), Some(c)) => self.run3(target, context, a, b, c).await,
        }
    }

    async fn run0(&self, target: &CommandReplyTarget, _context: Self::Context) -> ResponseResult<()> {
        send_usage::<Self>(target).await
    }

    async fn run1(
        &self,
        target: &CommandReplyTarget,
        _context: Self::Context,
        _a: &Self::A,
    ) -> ResponseResult<()> {
        send_usage::<Self>(target).await
    }

    async fn run2(
        &self,
        target: &CommandReplyTarget,
        _context: Self::Context,
        _a: &Self::A,
        _b: &Self::B,
    ) -> ResponseResult<()> {
        send_usage::<Self>(target).await
    }

    async fn run3(
        &self,
        target: &CommandReplyTarget,
        _context: Self::Context,
        _a: &Self::A,
        _b: &Self::B,
        _c: &Self::C,
    ) -> ResponseResult<()> {
        send_usage::<Self>(target).await
    }
}

async fn send_usage<T: CommandTrait>(target: &CommandReplyTarget) -> ResponseResult<()> {
    target
        .send_markdown_message(markdown_format!(
            "ℹ️ Usage: `{}`",
            T::default().to_command_string(true)
        ))
        .await?;
    Ok(())
}
