use std::sync::LazyLock;

use regex::Regex;

const DRIVE_HOST: &str = "drive.google.com";
const DRIVE_URL_PREFIX: &str = "https://drive.google.com";

/// Share url shapes, tried in order; the first capture group is the file id
static DRIVE_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"drive\.google\.com/file/d/([A-Za-z0-9_-]+)").expect("file/d regex"),
        Regex::new(r"drive\.google\.com/open\?id=([A-Za-z0-9_-]+)").expect("open?id regex"),
        Regex::new(r"drive\.google\.com/uc\?id=([A-Za-z0-9_-]+)").expect("uc?id regex"),
    ]
});

static DRIVE_URL_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://drive\.google\.com\S+").expect("drive url regex"));

/// Canonical preview url of a Drive share link, or the input when it is not one
pub fn normalize_drive_url(url: &str) -> String {
    DRIVE_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| format!("https://{}/file/d/{}/preview", DRIVE_HOST, id.as_str()))
        .unwrap_or_else(|| url.to_string())
}

/// First Drive url in free text
pub fn extract_drive_url(text: &str) -> Option<&str> {
    DRIVE_URL_IN_TEXT.find(text).map(|m| m.as_str())
}

pub fn is_drive_url(text: &str) -> bool {
    text.contains(DRIVE_HOST)
}

/// Whether the text holds something starting like a Drive https url
pub fn mentions_drive_url(text: &str) -> bool {
    text.contains(DRIVE_URL_PREFIX)
}
