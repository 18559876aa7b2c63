use botkit::storage::ButtonData;

use crate::menus::navigation::NavigationPath;

pub const BACK_LABEL: &str = "↩️ Back";

/// One button per row, followed by a Back button when there is somewhere to go back to
pub fn create_buttons_rows(
    items: impl IntoIterator<Item = (String, NavigationPath)>,
    back: Option<NavigationPath>,
) -> Vec<Vec<ButtonData>> {
    let mut rows: Vec<Vec<ButtonData>> = items
        .into_iter()
        .map(|(label, path)| vec![ButtonData::new(label, path.encode())])
        .collect();
    if let Some(back) = back {
        rows.push(vec![ButtonData::new(BACK_LABEL, back.encode())]);
    }
    rows
}
