use std::{fmt, ops::Add};

use teloxide::{
    Bot,
    payloads::{EditMessageTextSetters, SendMessage, SendMessageSetters},
    prelude::{Requester, ResponseResult},
    requests::JsonRequest,
    types::{Message, MessageId, ParseMode, Recipient},
};

/// Maximum message length allowed by Telegram Bot API
/// See: https://core.telegram.org/bots/api#sendmessage
pub const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// A wrapper around String that holds text already safe for Telegram MarkdownV2.
///
/// Ways to get one:
/// 1. `markdown_string!` / `markdown_format!` macros - literal templates are validated at compile time
/// 2. `escape` constructor - escapes every reserved character of the input
/// 3. `From`/`Into` - escapes the input
/// 4. `link` - builds an inline link with escaped label and url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownString(String);

impl MarkdownString {
    /// Creates a MarkdownString by escaping all markdown special characters in the input.
    ///
    /// # Example
    /// ```rust
    /// use botkit::markdown::MarkdownString;
    ///
    /// let markdown = MarkdownString::escape("Season 1 (2024)!");
    /// assert_eq!(markdown.as_str(), "Season 1 \\(2024\\)\\!");
    /// ```
    pub fn escape<T: Into<String>>(input: T) -> Self {
        let input_string = input.into();
        MarkdownString(teloxide::utils::markdown::escape(&input_string))
    }

    /// Creates an empty MarkdownString.
    pub fn new() -> Self {
        MarkdownString(String::new())
    }

    /// Builds an inline link `[label](url)`.
    ///
    /// The label is converted like any other argument (escaped unless it already is
    /// a MarkdownString); the url is escaped with the rules for link destinations.
    pub fn link(label: impl Into<MarkdownString>, url: &str) -> Self {
        let label: MarkdownString = label.into();
        MarkdownString(format!(
            "[{}]({})",
            label.0,
            teloxide::utils::markdown::escape_link_url(url)
        ))
    }

    /// Constructor used by the macros after validation.
    /// Should only be called with text that is already valid MarkdownV2.
    #[doc(hidden)]
    pub fn from_validated_string(s: impl Into<String>) -> Self {
        MarkdownString(s.into())
    }

    /// Replaces `{}` placeholders of the template with the arguments, in order.
    /// Extra placeholders are left untouched, extra arguments are ignored.
    #[doc(hidden)]
    pub fn substitute(template: &MarkdownString, args: Vec<MarkdownString>) -> MarkdownString {
        let mut result = String::with_capacity(template.0.len());
        let mut args = args.into_iter();
        let mut pieces = template.0.split("{}").peekable();
        while let Some(piece) = pieces.next() {
            result.push_str(piece);
            if pieces.peek().is_some() {
                match args.next() {
                    Some(arg) => result.push_str(&arg.0),
                    None => result.push_str("{}"),
                }
            }
        }
        MarkdownString(result)
    }

    /// Joins several MarkdownStrings with a separator that is itself MarkdownString.
    pub fn join(items: impl IntoIterator<Item = MarkdownString>, separator: &MarkdownString) -> Self {
        let parts: Vec<String> = items.into_iter().map(|m| m.0).collect();
        MarkdownString(parts.join(&separator.0))
    }

    /// Returns the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the MarkdownString and returns the inner String
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MarkdownString {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarkdownString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MarkdownString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<MarkdownString> for String {
    fn from(markdown: MarkdownString) -> String {
        markdown.0
    }
}

impl From<&MarkdownString> for MarkdownString {
    fn from(markdown: &MarkdownString) -> Self {
        markdown.clone()
    }
}

impl From<String> for MarkdownString {
    fn from(s: String) -> Self {
        MarkdownString::escape(s)
    }
}

impl From<&String> for MarkdownString {
    fn from(s: &String) -> Self {
        MarkdownString::escape(s.as_str())
    }
}

impl From<&str> for MarkdownString {
    fn from(s: &str) -> Self {
        MarkdownString::escape(s)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for MarkdownString {
                fn from(n: $ty) -> Self {
                    MarkdownString::escape(n.to_string())
                }
            }

            impl From<&$ty> for MarkdownString {
                fn from(n: &$ty) -> Self {
                    MarkdownString::escape(n.to_string())
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, usize);

impl Add for MarkdownString {
    type Output = MarkdownString;

    fn add(self, other: MarkdownString) -> MarkdownString {
        MarkdownString(self.0 + &other.0)
    }
}

impl Add<&MarkdownString> for MarkdownString {
    type Output = MarkdownString;

    fn add(self, other: &MarkdownString) -> MarkdownString {
        MarkdownString(self.0 + &other.0)
    }
}

/// Cuts a message down to Telegram's maximum length and appends an escaped "...".
///
/// The cut prefers the last line break and never leaves a dangling escape backslash.
fn truncate_if_needed(text: MarkdownString) -> MarkdownString {
    if text.0.len() <= TELEGRAM_MAX_MESSAGE_LENGTH {
        return text;
    }

    let marker = "\\.\\.\\.";
    let max_content_len = TELEGRAM_MAX_MESSAGE_LENGTH - marker.len();

    let mut cut = max_content_len;
    while !text.0.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut content = &text.0[..cut];
    if let Some(pos) = content.rfind('\n') {
        content = &content[..pos + 1];
    }
    let trailing_backslashes = content.chars().rev().take_while(|c| *c == '\\').count();
    if trailing_backslashes % 2 == 1 {
        content = &content[..content.len() - 1];
    }

    MarkdownString(format!("{}{}", content, marker))
}

/// Trait for sending markdown messages with Bot
///
/// Every method sets the parse mode to MarkdownV2 and truncates text that exceeds
/// Telegram's 4096 character limit.
#[allow(async_fn_in_trait)]
pub trait MarkdownStringMessage: Requester {
    /// Send a new message, or edit `message_id` in place when given
    async fn markdown_message<C>(
        &self,
        chat_id: C,
        message_id: Option<MessageId>,
        text: MarkdownString,
    ) -> ResponseResult<Message>
    where
        C: Into<Recipient>;

    fn send_markdown_message<C>(&self, chat_id: C, text: MarkdownString) -> JsonRequest<SendMessage>
    where
        C: Into<Recipient>;

    fn edit_markdown_message_text<C>(
        &self,
        chat_id: C,
        message_id: MessageId,
        text: MarkdownString,
    ) -> <Self as Requester>::EditMessageText
    where
        C: Into<Recipient>;
}

impl MarkdownStringMessage for Bot {
    fn send_markdown_message<C>(&self, chat_id: C, text: MarkdownString) -> JsonRequest<SendMessage>
    where
        C: Into<Recipient>,
    {
        self.send_message(chat_id, truncate_if_needed(text))
            .parse_mode(ParseMode::MarkdownV2)
    }

    fn edit_markdown_message_text<C>(
        &self,
        chat_id: C,
        message_id: MessageId,
        text: MarkdownString,
    ) -> <Self as Requester>::EditMessageText
    where
        C: Into<Recipient>,
    {
        self.edit_message_text(chat_id, message_id, truncate_if_needed(text))
            .parse_mode(ParseMode::MarkdownV2)
    }

    async fn markdown_message<C>(
        &self,
        chat_id: C,
        message_id: Option<MessageId>,
        text: MarkdownString,
    ) -> ResponseResult<Message>
    where
        C: Into<Recipient>,
    {
        match message_id {
            Some(message_id) => {
                self.edit_markdown_message_text(chat_id, message_id, text)
                    .await
            }
            None => self.send_markdown_message(chat_id, text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{markdown_format, markdown_string};

    #[test]
    fn test_escape_constructor() {
        let markdown = MarkdownString::escape("Hello world");
        assert_eq!(markdown.as_str(), "Hello world");

        let markdown = MarkdownString::escape("Hello! *bold* _italic_ `code`");
        assert_eq!(
            markdown.as_str(),
            "Hello\\! \\*bold\\* \\_italic\\_ \\`code\\`"
        );

        let markdown = MarkdownString::escape("!.-+=>#{}[]()~|");
        assert_eq!(
            markdown.as_str(),
            "\\!\\.\\-\\+\\=\\>\\#\\{\\}\\[\\]\\(\\)\\~\\|"
        );
    }

    #[test]
    fn test_markdown_string_macro() {
        let markdown = markdown_string!("📂 *Select a Category:*");
        assert_eq!(markdown.as_str(), "📂 *Select a Category:*");
    }

    #[test]
    fn test_markdown_format_escapes_arguments() {
        let series = "Attack on Titan (Dub)";
        let markdown = markdown_format!("📀 *{}* \\- Select a Season:", series);
        assert_eq!(
            markdown.as_str(),
            "📀 *Attack on Titan \\(Dub\\)* \\- Select a Season:"
        );
    }

    #[test]
    fn test_markdown_format_keeps_markdown_arguments() {
        let link = MarkdownString::link("Watch Here", "https://gplinks.co/abc");
        let markdown = markdown_format!("🎬 Episode {}\n\n🔗 {}", 3, link);
        assert_eq!(
            markdown.as_str(),
            "🎬 Episode 3\n\n🔗 [Watch Here](https://gplinks.co/abc)"
        );
    }

    #[test]
    fn test_markdown_format_with_expression_template() {
        let template = MarkdownString::from_validated_string("*{}* and {}");
        let markdown = markdown_format!(template, "a_b", 42);
        assert_eq!(markdown.as_str(), "*a\\_b* and 42");
    }

    #[test]
    fn test_markdown_format_missing_and_extra_arguments() {
        let template = MarkdownString::from_validated_string("{} {}");
        assert_eq!(markdown_format!(template.clone(), "x").as_str(), "x {}");
        assert_eq!(markdown_format!(template, "x", "y", "z").as_str(), "x y");
    }

    #[test]
    fn test_link_escapes_url() {
        let markdown = MarkdownString::link("Go!", "https://example.com/a_(b)");
        assert_eq!(markdown.as_str(), "[Go\\!](https://example.com/a_(b\\))");
    }

    #[test]
    fn test_join_and_add() {
        let lines = vec![
            MarkdownString::escape("line 1."),
            MarkdownString::escape("line 2!"),
        ];
        let joined = MarkdownString::join(lines, &markdown_string!("\n"));
        assert_eq!(joined.as_str(), "line 1\\.\nline 2\\!");

        let combined = markdown_string!("*Header*\n") + joined;
        assert_eq!(combined.as_str(), "*Header*\nline 1\\.\nline 2\\!");
    }

    #[test]
    fn test_from_conversions_escape() {
        let from_str: MarkdownString = "a.b".into();
        let from_string: MarkdownString = String::from("c!").into();
        let from_number: MarkdownString = (-5i64).into();
        assert_eq!(from_str.as_str(), "a\\.b");
        assert_eq!(from_string.as_str(), "c\\!");
        assert_eq!(from_number.as_str(), "\\-5");
    }

    #[test]
    fn test_truncate_short_message_untouched() {
        let short = MarkdownString::escape("Hello, world!");
        assert_eq!(truncate_if_needed(short.clone()), short);
    }

    #[test]
    fn test_truncate_long_single_line() {
        let long = MarkdownString::escape("a".repeat(TELEGRAM_MAX_MESSAGE_LENGTH + 100));
        let result = truncate_if_needed(long);
        assert_eq!(result.as_str().len(), TELEGRAM_MAX_MESSAGE_LENGTH);
        assert!(result.as_str().ends_with("\\.\\.\\."));
    }

    #[test]
    fn test_truncate_prefers_line_break_and_drops_dangling_escape() {
        let line = format!("{}\n", "b".repeat(100));
        let long = MarkdownString::from_validated_string(line.repeat(50));
        let result = truncate_if_needed(long);
        assert!(result.as_str().len() <= TELEGRAM_MAX_MESSAGE_LENGTH);
        assert!(result.as_str().ends_with("\n\\.\\.\\."));

        let escaped =
            MarkdownString::from_validated_string(format!("a{}", "\\.".repeat(3000)));
        let result = truncate_if_needed(escaped);
        let text = result.as_str();
        let body = &text[..text.len() - "\\.\\.\\.".len()];
        let trailing = body.chars().rev().take_while(|c| *c == '\\').count();
        assert_eq!(trailing % 2, 0);
    }
}
