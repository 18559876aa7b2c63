//! Botkit - Telegram helpers shared by the catalog bot

// Private API modules
pub(crate) mod api;

// Public markdown module with re-exports
pub mod markdown {
    pub use crate::api::markdown::{
        string::{MarkdownString, MarkdownStringMessage, TELEGRAM_MAX_MESSAGE_LENGTH},
        validate::validate_markdownv2_format,
    };
}

// Public command_trait module with re-exports
pub mod command_trait {
    pub use crate::api::command_trait::{
        CommandReplyTarget, CommandTrait, EmptyArg, ParseCommandArg,
    };
}

// Public storage module with re-exports
pub mod storage {
    pub use crate::api::storage::callback_data_storage::{
        ButtonData, CallbackDataStorage, CallbackDataStorageTrait, pack_callback_data,
        unpack_callback_data,
    };
}
