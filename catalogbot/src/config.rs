use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::links::DEFAULT_GPLINKS_URL;

pub const DEFAULT_BULK_DELAY_MS: u64 = 500;

/// What the bot offers besides browsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BotMode {
    /// Catalog browser plus operator tools
    Full,
    /// Catalog browser only
    Browse,
}

/// A Telegram bot for browsing a media catalog
#[derive(Parser, Debug)]
#[command(name = "catalogbot")]
#[command(about = "A Telegram bot for browsing a media catalog", long_about = None)]
pub struct Args {
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Supabase project url
    #[arg(long, env = "SUPABASE_URL", required_unless_present = "catalog_yaml")]
    pub supabase_url: Option<String>,

    #[arg(
        long,
        env = "SUPABASE_KEY",
        hide_env_values = true,
        required_unless_present = "catalog_yaml"
    )]
    pub supabase_key: Option<String>,

    /// Serve the catalog from a YAML file instead of Supabase (takes precedence)
    #[arg(long, env = "CATALOG_YAML")]
    pub catalog_yaml: Option<PathBuf>,

    #[arg(long, env = "GPLINKS_API_TOKEN", hide_env_values = true)]
    pub gplinks_token: Option<String>,

    #[arg(long, env = "GPLINKS_API_URL", default_value = DEFAULT_GPLINKS_URL)]
    pub gplinks_url: String,

    #[arg(long, env = "BOT_MODE", value_enum, default_value_t = BotMode::Full)]
    pub mode: BotMode,

    /// Telegram user ids allowed to change the catalog; anyone when empty
    #[arg(long, env = "OPERATOR_IDS", value_delimiter = ',')]
    pub operator_ids: Vec<u64>,

    /// Pause after every line of a bulk update
    #[arg(long, env = "BULK_DELAY_MS", default_value_t = DEFAULT_BULK_DELAY_MS)]
    pub bulk_delay_ms: u64,
}

impl Args {
    pub fn settings(&self, bot_name: String) -> Settings {
        Settings {
            mode: self.mode,
            operator_ids: self.operator_ids.clone(),
            bulk_delay: Duration::from_millis(self.bulk_delay_ms),
            bot_name,
        }
    }
}

/// Runtime settings shared with the handlers
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: BotMode,
    pub operator_ids: Vec<u64>,
    pub bulk_delay: Duration,
    /// Username the bot answers commands for
    pub bot_name: String,
}

impl Settings {
    /// Whether the user may run catalog-changing commands
    pub fn is_operator(&self, user_id: Option<u64>) -> bool {
        if self.mode == BotMode::Browse {
            return false;
        }
        if self.operator_ids.is_empty() {
            return true;
        }
        user_id.is_some_and(|id| self.operator_ids.contains(&id))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: BotMode::Full,
            operator_ids: Vec::new(),
            bulk_delay: Duration::from_millis(DEFAULT_BULK_DELAY_MS),
            bot_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_rules() {
        let open = Settings::default();
        assert!(open.is_operator(Some(1)));
        assert!(open.is_operator(None));

        let restricted = Settings {
            operator_ids: vec![10, 20],
            ..Settings::default()
        };
        assert!(restricted.is_operator(Some(20)));
        assert!(!restricted.is_operator(Some(30)));
        assert!(!restricted.is_operator(None));

        let browse = Settings {
            mode: BotMode::Browse,
            ..Settings::default()
        };
        assert!(!browse.is_operator(Some(1)));
    }

    #[test]
    fn test_args_from_command_line() {
        let args = Args::try_parse_from([
            "catalogbot",
            "--bot-token",
            "123:abc",
            "--catalog-yaml",
            "catalog.yaml",
            "--operator-ids",
            "1,2",
            "--mode",
            "browse",
        ])
        .unwrap();
        assert_eq!(args.catalog_yaml, Some(PathBuf::from("catalog.yaml")));
        assert_eq!(args.operator_ids, vec![1, 2]);
        assert_eq!(args.mode, BotMode::Browse);
        assert_eq!(args.bulk_delay_ms, DEFAULT_BULK_DELAY_MS);
        assert_eq!(args.gplinks_url, DEFAULT_GPLINKS_URL);
    }

    #[test]
    fn test_supabase_required_without_yaml() {
        let result = Args::try_parse_from(["catalogbot", "--bot-token", "123:abc"]);
        assert!(result.is_err());
    }
}
