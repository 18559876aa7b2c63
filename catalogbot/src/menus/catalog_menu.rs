use std::sync::Arc;

use botkit::{
    command_trait::CommandReplyTarget, markdown::MarkdownString, markdown_format,
    markdown_string, storage::ButtonData,
};
use teloxide::{ApiError, RequestError, prelude::ResponseResult};

use crate::{
    menus::{common::create_buttons_rows, navigation::NavigationPath},
    storages::{CatalogEntry, CatalogStorageTrait, EpisodeSummary, RepositoryError},
};

/// Rendered menu: message text and keyboard rows
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: MarkdownString,
    pub rows: Vec<Vec<ButtonData>>,
}

impl Screen {
    fn new(text: MarkdownString, rows: Vec<Vec<ButtonData>>) -> Self {
        Self { text, rows }
    }

    fn failure(what: &str, error: RepositoryError, back: Option<NavigationPath>) -> Self {
        log::error!("Failed to fetch {}: {}", what, error);
        Self::new(
            markdown_format!("❌ Error fetching {}\\.", what),
            create_buttons_rows(Vec::new(), back),
        )
    }
}

fn episode_label(episode: &EpisodeSummary) -> String {
    if episode.episode_title.is_empty() {
        format!("Episode {}", episode.episode_number)
    } else {
        format!(
            "Episode {}: {}",
            episode.episode_number, episode.episode_title
        )
    }
}

fn episode_text(entry: &CatalogEntry) -> MarkdownString {
    let link = if entry.url.is_empty() {
        markdown_string!("_Link not available yet_")
    } else {
        MarkdownString::link("Watch Here", &entry.url)
    };
    let title = if entry.episode_title.is_empty() {
        MarkdownString::new()
    } else {
        markdown_format!(": {}", &entry.episode_title)
    };
    markdown_format!(
        "📺 *{}*\n📀 {}\n🎬 Episode {}{}\n\n🔗 {}",
        &entry.series_name,
        &entry.season_name,
        entry.episode_number,
        title,
        link
    )
}

/// Fetch what the screen at `path` shows. Repository failures become an error
/// screen; they are logged here.
pub async fn build_screen(catalog: &Arc<dyn CatalogStorageTrait>, path: &NavigationPath) -> Screen {
    let back = path.parent();
    match path {
        NavigationPath::Root => match catalog.list_categories().await {
            Ok(categories) if categories.is_empty() => Screen::new(
                markdown_string!("📂 No categories found\\."),
                Vec::new(),
            ),
            Ok(categories) => Screen::new(
                markdown_string!("📂 *Select a Category:*"),
                create_buttons_rows(
                    categories
                        .into_iter()
                        .map(|name| (name.clone(), NavigationPath::category(name))),
                    None,
                ),
            ),
            Err(e) => Screen::failure("categories", e, None),
        },
        NavigationPath::Category { category } => match catalog.list_series(category).await {
            Ok(series) if series.is_empty() => Screen::new(
                markdown_format!("📺 No series found in *{}*\\.", category),
                create_buttons_rows(Vec::new(), back),
            ),
            Ok(series) => Screen::new(
                markdown_format!("📺 *{}* \\- Select a Series:", category),
                create_buttons_rows(
                    series.into_iter().map(|name| {
                        (name.clone(), NavigationPath::series(category, name))
                    }),
                    back,
                ),
            ),
            Err(e) => Screen::failure("series", e, back),
        },
        NavigationPath::Series {
            category,
            series_name,
        } => match catalog.list_seasons(category, series_name).await {
            Ok(seasons) if seasons.is_empty() => Screen::new(
                markdown_format!("📀 No seasons found for *{}*\\.", series_name),
                create_buttons_rows(Vec::new(), back),
            ),
            Ok(seasons) => Screen::new(
                markdown_format!("📀 *{}* \\- Select a Season:", series_name),
                create_buttons_rows(
                    seasons.into_iter().map(|name| {
                        (
                            name.clone(),
                            NavigationPath::season(category, series_name, name),
                        )
                    }),
                    back,
                ),
            ),
            Err(e) => Screen::failure("seasons", e, back),
        },
        NavigationPath::Season {
            category,
            series_name,
            season_name,
        } => match catalog
            .list_episodes(category, series_name, season_name)
            .await
        {
            Ok(episodes) if episodes.is_empty() => Screen::new(
                markdown_format!("🎬 No episodes found in *{}*\\.", season_name),
                create_buttons_rows(Vec::new(), back),
            ),
            Ok(episodes) => Screen::new(
                markdown_format!("🎬 *{} \\- {}*\nSelect an Episode:", series_name, season_name),
                create_buttons_rows(
                    episodes.iter().map(|episode| {
                        (
                            episode_label(episode),
                            NavigationPath::Episode { id: episode.id },
                        )
                    }),
                    back,
                ),
            ),
            Err(e) => Screen::failure("episodes", e, back),
        },
        NavigationPath::Episode { id } => match catalog.get_episode(*id).await {
            Ok(Some(entry)) => {
                let season = NavigationPath::season(
                    &entry.category,
                    &entry.series_name,
                    &entry.season_name,
                );
                Screen::new(
                    episode_text(&entry),
                    create_buttons_rows(Vec::new(), Some(season)),
                )
            }
            Ok(None) => Screen::new(
                markdown_string!("❌ Episode not found\\."),
                create_buttons_rows(Vec::new(), Some(NavigationPath::Root)),
            ),
            Err(e) => Screen::failure("episode URL", e, Some(NavigationPath::Root)),
        },
    }
}

/// Show the screen at `path`, editing the target message when there is one
pub async fn show_screen(
    target: &CommandReplyTarget,
    catalog: &Arc<dyn CatalogStorageTrait>,
    path: &NavigationPath,
) -> ResponseResult<()> {
    let screen = build_screen(catalog, path).await;
    let result = if screen.rows.is_empty() {
        target.markdown_message(screen.text).await
    } else {
        target.markdown_menu_message(screen.text, screen.rows).await
    };
    ignore_not_modified(result)
}

/// Pressing the same button twice edits the menu to what it already shows
fn ignore_not_modified<T>(result: ResponseResult<T>) -> ResponseResult<()> {
    match result {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::MessageNotModified)) => {
            log::debug!("Menu is already up to date");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
