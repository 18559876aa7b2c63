use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup};
use tokio::sync::Mutex;

/// Telegram rejects callback data longer than this many bytes
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

const REFERENCE_PREFIX: &str = "cb:";

/// One inline keyboard button: label and callback data
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonData {
    pub label: String,
    pub data: String,
}

impl ButtonData {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

impl From<(String, String)> for ButtonData {
    fn from((label, data): (String, String)) -> Self {
        ButtonData { label, data }
    }
}

impl From<(&str, &str)> for ButtonData {
    fn from((label, data): (&str, &str)) -> Self {
        ButtonData::new(label, data)
    }
}

/// Whether data can travel in a button as is
fn fits_callback_data(data: &str) -> bool {
    data.len() <= MAX_CALLBACK_DATA_LEN && data.is_ascii() && !data.starts_with(REFERENCE_PREFIX)
}

/// Maps short references to full callback data, so buttons can carry data that
/// Telegram would reject (over 64 bytes, or non-ASCII names cut mid-character).
#[async_trait::async_trait]
pub trait CallbackDataStorageTrait: Send + Sync {
    /// Store callback data of the button at `button_pos` and return its reference
    async fn store_callback_data(
        &self,
        chat_id: ChatId,
        message_id: i32,
        button_pos: usize,
        data: String,
    ) -> String;

    /// Resolve a reference produced by `store_callback_data`
    async fn get_callback_data(&self, reference: &str) -> Option<String>;

    /// Forget every reference of one message
    async fn clear_message_callbacks(&self, chat_id: ChatId, message_id: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CallbackDataKey {
    chat_id: ChatId,
    message_id: i32,
    button_pos: usize,
}

/// Format: "cb:{chat_id}:{message_id}:{button_pos}"
impl fmt::Display for CallbackDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}:{}",
            REFERENCE_PREFIX, self.chat_id.0, self.message_id, self.button_pos
        )
    }
}

impl FromStr for CallbackDataKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(REFERENCE_PREFIX).ok_or(())?;
        let mut parts = rest.split(':');
        let chat_id = parts.next().ok_or(())?.parse::<i64>().map_err(|_| ())?;
        let message_id = parts.next().ok_or(())?.parse::<i32>().map_err(|_| ())?;
        let button_pos = parts.next().ok_or(())?.parse::<usize>().map_err(|_| ())?;
        if parts.next().is_some() {
            return Err(());
        }
        Ok(CallbackDataKey {
            chat_id: ChatId(chat_id),
            message_id,
            button_pos,
        })
    }
}

/// In-memory callback data storage. Entries live until the message gets a new
/// keyboard or the process restarts.
#[derive(Clone, Default)]
pub struct CallbackDataStorage {
    data: Arc<Mutex<HashMap<CallbackDataKey, String>>>,
}

impl CallbackDataStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CallbackDataStorageTrait for CallbackDataStorage {
    async fn store_callback_data(
        &self,
        chat_id: ChatId,
        message_id: i32,
        button_pos: usize,
        data: String,
    ) -> String {
        let key = CallbackDataKey {
            chat_id,
            message_id,
            button_pos,
        };
        self.data.lock().await.insert(key, data);
        key.to_string()
    }

    async fn get_callback_data(&self, reference: &str) -> Option<String> {
        let key = CallbackDataKey::from_str(reference).ok()?;
        self.data.lock().await.get(&key).cloned()
    }

    async fn clear_message_callbacks(&self, chat_id: ChatId, message_id: i32) {
        self.data
            .lock()
            .await
            .retain(|key, _| key.chat_id != chat_id || key.message_id != message_id);
    }
}

/// Build an inline keyboard for a message, replacing callback data that does not
/// fit into a button with a stored reference.
///
/// References of the previous keyboard of the same message are dropped first.
pub async fn pack_callback_data<R, B>(
    storage: &Arc<dyn CallbackDataStorageTrait>,
    chat_id: ChatId,
    message_id: i32,
    rows: impl IntoIterator<Item = R>,
) -> InlineKeyboardMarkup
where
    R: IntoIterator<Item = B>,
    B: Into<ButtonData>,
{
    storage.clear_message_callbacks(chat_id, message_id).await;

    let mut keyboard = Vec::new();
    let mut button_pos = 0;
    for row in rows {
        let mut buttons = Vec::new();
        for item in row {
            let ButtonData { label, data } = item.into();
            let data = if fits_callback_data(&data) {
                data
            } else {
                storage
                    .store_callback_data(chat_id, message_id, button_pos, data)
                    .await
            };
            buttons.push(InlineKeyboardButton::callback(label, data));
            button_pos += 1;
        }
        keyboard.push(buttons);
    }

    InlineKeyboardMarkup::new(keyboard)
}

/// Resolve callback data of a pressed button.
///
/// Returns `None` for a reference that is no longer stored (the keyboard was replaced
/// or the bot restarted); data that is not a reference is returned as is.
pub async fn unpack_callback_data(
    storage: &Arc<dyn CallbackDataStorageTrait>,
    callback_data: &str,
) -> Option<String> {
    if callback_data.starts_with(REFERENCE_PREFIX) {
        storage.get_callback_data(callback_data).await
    } else {
        Some(callback_data.to_string())
    }
}
