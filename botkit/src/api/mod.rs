pub mod command_trait;
pub mod markdown;
pub mod storage;
