mod drive;
mod shortener;

pub use drive::{extract_drive_url, is_drive_url, mentions_drive_url};
pub use shortener::{
    DEFAULT_GPLINKS_URL, DriveLink, GplinksShortener, LinkShortenerTrait, ShortenerError,
    prepare_drive_link,
};

#[cfg(test)]
pub(crate) use fake::FakeShortener;
